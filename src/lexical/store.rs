//! Document store: stored documents and per-field token counts.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::data::Document;

/// Keeps a copy of every indexed document (when storage is enabled) and the
/// post-pipeline token count of each of its fields.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    save: bool,
    docs: AHashMap<String, Option<Document>>,
    doc_info: AHashMap<String, AHashMap<String, usize>>,
    length: usize,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DocumentStore {
    /// Create a store. With `save == false` only references are kept.
    pub fn new(save: bool) -> Self {
        DocumentStore {
            save,
            docs: AHashMap::new(),
            doc_info: AHashMap::new(),
            length: 0,
        }
    }

    /// Whether full documents are kept.
    pub fn is_doc_stored(&self) -> bool {
        self.save
    }

    /// Store `doc` under `doc_ref`, overwriting any previous copy.
    pub fn add_doc(&mut self, doc_ref: &str, doc: &Document) {
        let stored = self.save.then(|| doc.clone());
        if self.docs.insert(doc_ref.to_string(), stored).is_none() {
            self.length += 1;
        }
    }

    /// The stored document, if present and storage is enabled.
    pub fn get_doc(&self, doc_ref: &str) -> Option<&Document> {
        self.docs.get(doc_ref).and_then(Option::as_ref)
    }

    pub fn has_doc(&self, doc_ref: &str) -> bool {
        self.docs.contains_key(doc_ref)
    }

    /// Delete a document and its field lengths. No-op when absent.
    pub fn remove_doc(&mut self, doc_ref: &str) {
        if self.docs.remove(doc_ref).is_some() {
            self.doc_info.remove(doc_ref);
            self.length -= 1;
        }
    }

    /// Record the token count of `field` for a stored document.
    pub fn add_field_length(&mut self, doc_ref: &str, field: &str, length: usize) {
        if !self.has_doc(doc_ref) {
            return;
        }
        self.doc_info
            .entry(doc_ref.to_string())
            .or_default()
            .insert(field.to_string(), length);
    }

    pub fn update_field_length(&mut self, doc_ref: &str, field: &str, length: usize) {
        self.add_field_length(doc_ref, field, length);
    }

    /// Token count of `field`, 0 when unknown.
    pub fn get_field_length(&self, doc_ref: &str, field: &str) -> usize {
        self.doc_info
            .get(doc_ref)
            .and_then(|info| info.get(field).copied())
            .unwrap_or(0)
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Stored references, unordered.
    pub fn refs(&self) -> impl Iterator<Item = &str> {
        self.docs.keys().map(String::as_str)
    }

    pub fn to_snapshot(&self) -> DocumentStoreSnapshot {
        DocumentStoreSnapshot {
            docs: self
                .docs
                .iter()
                .map(|(doc_ref, doc)| (doc_ref.clone(), doc.clone()))
                .collect(),
            doc_info: self
                .doc_info
                .iter()
                .map(|(doc_ref, info)| {
                    let lengths = info.iter().map(|(f, n)| (f.clone(), *n)).collect();
                    (doc_ref.clone(), lengths)
                })
                .collect(),
            length: self.length,
            save: self.save,
        }
    }

    /// Restore a store. The document count is taken from the stored
    /// references rather than the recorded `length`.
    pub fn from_snapshot(snapshot: DocumentStoreSnapshot) -> Self {
        let docs: AHashMap<String, Option<Document>> = snapshot.docs.into_iter().collect();
        DocumentStore {
            save: snapshot.save,
            length: docs.len(),
            docs,
            doc_info: snapshot
                .doc_info
                .into_iter()
                .map(|(doc_ref, info)| (doc_ref, info.into_iter().collect()))
                .collect(),
        }
    }
}

/// Serialized document store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStoreSnapshot {
    pub docs: BTreeMap<String, Option<Document>>,
    #[serde(rename = "docInfo")]
    pub doc_info: BTreeMap<String, BTreeMap<String, usize>>,
    pub length: usize,
    pub save: bool,
}
