//! Serialized form of a whole index.
//!
//! The layout matches the JSON index format of elasticlunr 0.9.5, so
//! snapshots can be exchanged with indexes built by that library.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::lexical::store::DocumentStoreSnapshot;
use crate::lexical::trie::InvertedIndexSnapshot;

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "0.9.5";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub version: String,
    pub fields: Vec<String>,
    #[serde(rename = "ref")]
    pub ref_field: String,
    #[serde(rename = "documentStore")]
    pub document_store: DocumentStoreSnapshot,
    pub index: BTreeMap<String, InvertedIndexSnapshot>,
    pub pipeline: Vec<String>,
}

// Tries nest one JSON object per token character, so reading and writing
// lift serde_json's depth limit and grow the stack on demand.
impl IndexSnapshot {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let snapshot = Self::deserialize_unbounded(&mut deserializer)?;
        deserializer.end()?;
        Ok(snapshot)
    }

    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        let mut deserializer = serde_json::Deserializer::from_reader(reader);
        let snapshot = Self::deserialize_unbounded(&mut deserializer)?;
        deserializer.end()?;
        Ok(snapshot)
    }

    fn deserialize_unbounded<'de, R: serde_json::de::Read<'de>>(
        deserializer: &mut serde_json::Deserializer<R>,
    ) -> serde_json::Result<Self> {
        deserializer.disable_recursion_limit();
        Self::deserialize(serde_stacker::Deserializer::new(deserializer))
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        let mut serializer = serde_json::Serializer::new(writer);
        self.serialize(serde_stacker::Serializer::new(&mut serializer))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buffer = Vec::new();
        self.to_writer(&mut buffer)?;
        String::from_utf8(buffer).map_err(serde::ser::Error::custom)
    }
}
