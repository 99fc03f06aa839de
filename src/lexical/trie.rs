//! Per-field inverted index stored as a character trie.
//!
//! Nodes live in an arena and reference their children by index. A node
//! exists for every prefix of every token ever indexed; nodes are never
//! reclaimed, so a token whose documents were all removed stays behind as a
//! zero-`df` prefix marker. Prefix expansion depends on that.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Posting list of one token: document reference → term-frequency weight.
pub type Postings = BTreeMap<String, f64>;

/// A posting to add under a token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub doc_ref: String,
    pub tf: f64,
}

impl TokenInfo {
    pub fn new(doc_ref: impl Into<String>, tf: f64) -> Self {
        TokenInfo {
            doc_ref: doc_ref.into(),
            tf,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: BTreeMap<char, usize>,
    docs: Postings,
    /// Always `docs.len()`; kept explicitly because it is part of the
    /// serialized format.
    df: usize,
}

const ROOT: usize = 0;

/// Trie-based inverted index for a single field.
#[derive(Debug, Clone)]
pub struct InvertedIndex {
    nodes: Vec<TrieNode>,
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex {
            nodes: vec![TrieNode::default()],
        }
    }

    /// Add a posting for `token`, creating the path as needed.
    ///
    /// An existing posting for the same document has its tf overwritten and
    /// leaves `df` unchanged.
    pub fn add_token(&mut self, token: &str, info: TokenInfo) {
        let mut node = ROOT;
        for ch in token.chars() {
            node = match self.nodes[node].children.get(&ch) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(ch, child);
                    child
                }
            };
        }

        let target = &mut self.nodes[node];
        if target.docs.insert(info.doc_ref, info.tf).is_none() {
            target.df += 1;
        }
    }

    /// Remove the posting of `doc_ref` under `token`. Missing paths and
    /// missing documents are ignored.
    pub fn remove_token(&mut self, token: &str, doc_ref: &str) {
        if token.is_empty() {
            return;
        }
        if let Some(node) = self.find(token) {
            let target = &mut self.nodes[node];
            if target.docs.remove(doc_ref).is_some() {
                target.df -= 1;
            }
        }
    }

    /// Whether a node exists for `token`, including dangling prefixes.
    pub fn has_token(&self, token: &str) -> bool {
        !token.is_empty() && self.find(token).is_some()
    }

    /// Postings of `token`; empty when the token is unknown.
    pub fn get_docs(&self, token: &str) -> Postings {
        self.postings(token).cloned().unwrap_or_default()
    }

    /// Borrowed postings of `token`, if a node exists for it.
    pub fn postings(&self, token: &str) -> Option<&Postings> {
        self.find(token).map(|node| &self.nodes[node].docs)
    }

    pub fn get_term_frequency(&self, token: &str, doc_ref: &str) -> f64 {
        self.postings(token)
            .and_then(|docs| docs.get(doc_ref).copied())
            .unwrap_or(0.0)
    }

    pub fn get_doc_freq(&self, token: &str) -> usize {
        self.find(token).map(|node| self.nodes[node].df).unwrap_or(0)
    }

    /// Every indexed token starting with `prefix`, the prefix itself first
    /// when it is indexed, then in lexicographic order.
    pub fn expand_token(&self, prefix: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        if prefix.is_empty() {
            return tokens;
        }
        let Some(start) = self.find(prefix) else {
            return tokens;
        };

        // Explicit stack instead of recursion; children are pushed in reverse
        // so they pop in ascending order.
        let mut stack = vec![(start, prefix.to_string())];
        while let Some((node, token)) = stack.pop() {
            let current = &self.nodes[node];
            for (&ch, &child) in current.children.iter().rev() {
                let mut next = token.clone();
                next.push(ch);
                stack.push((child, next));
            }
            if current.df > 0 {
                tokens.push(token);
            }
        }

        tokens
    }

    /// Number of trie nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn find(&self, token: &str) -> Option<usize> {
        let mut node = ROOT;
        for ch in token.chars() {
            node = *self.nodes[node].children.get(&ch)?;
        }
        Some(node)
    }

    /// Serializable form of the trie.
    ///
    /// Snapshot nodes are laid out in pre-order with children in ascending
    /// key order, so equal tries give equal snapshots whatever order their
    /// nodes were created in.
    pub fn to_snapshot(&self) -> InvertedIndexSnapshot {
        let mut nodes: Vec<SnapshotNode> = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, Option<(usize, char)>)> = vec![(ROOT, None)];

        while let Some((node, parent)) = stack.pop() {
            let slot = nodes.len();
            let current = &self.nodes[node];
            nodes.push(SnapshotNode {
                docs: current
                    .docs
                    .iter()
                    .map(|(doc_ref, &tf)| (doc_ref.clone(), TermFrequency { tf }))
                    .collect(),
                df: current.df,
                children: BTreeMap::new(),
            });
            if let Some((parent, ch)) = parent {
                nodes[parent].children.insert(ch.to_string(), slot);
            }
            for (&ch, &child) in current.children.iter().rev() {
                stack.push((child, Some((slot, ch))));
            }
        }

        InvertedIndexSnapshot { nodes }
    }

    /// Rebuild a trie from its serialized form.
    ///
    /// Child keys of more than one character are expanded into a chain of
    /// nodes. `df` is recomputed from the postings.
    pub fn from_snapshot(snapshot: &InvertedIndexSnapshot) -> Self {
        let mut index = InvertedIndex::new();
        let mut stack = vec![(ROOT, SNAPSHOT_ROOT)];

        while let Some((node, source)) = stack.pop() {
            let source = &snapshot.nodes[source];
            index.nodes[node].docs = source
                .docs
                .iter()
                .map(|(doc_ref, tf)| (doc_ref.clone(), tf.tf))
                .collect();
            index.nodes[node].df = index.nodes[node].docs.len();

            for (key, &child_source) in &source.children {
                let mut child = node;
                for ch in key.chars() {
                    child = index.child_or_insert(child, ch);
                }
                stack.push((child, child_source));
            }
        }

        index
    }

    fn child_or_insert(&mut self, node: usize, ch: char) -> usize {
        if let Some(&child) = self.nodes[node].children.get(&ch) {
            return child;
        }
        let child = self.nodes.len();
        self.nodes.push(TrieNode::default());
        self.nodes[node].children.insert(ch, child);
        child
    }
}

const SNAPSHOT_ROOT: usize = 0;

/// Serialized trie: `{"root": node}`, where every node is an object holding
/// `docs`, `df` and one nested node per child key.
///
/// Nodes are kept in a flat arena and walked with explicit stacks, so a
/// snapshot holding a very long token never recurses once per character in
/// memory. The nested JSON form still does; [`IndexSnapshot`] handles that.
///
/// [`IndexSnapshot`]: crate::lexical::snapshot::IndexSnapshot
#[derive(Debug, Clone)]
pub struct InvertedIndexSnapshot {
    nodes: Vec<SnapshotNode>,
}

/// One serialized trie node. `children` maps a child key to the child's
/// position in the snapshot arena.
#[derive(Debug, Clone, Default)]
pub struct SnapshotNode {
    pub docs: BTreeMap<String, TermFrequency>,
    pub df: usize,
    children: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermFrequency {
    pub tf: f64,
}

impl Default for InvertedIndexSnapshot {
    fn default() -> Self {
        InvertedIndexSnapshot {
            nodes: vec![SnapshotNode::default()],
        }
    }
}

impl InvertedIndexSnapshot {
    pub fn root(&self) -> &SnapshotNode {
        &self.nodes[SNAPSHOT_ROOT]
    }

    /// The child of `node` stored under `key`.
    pub fn child(&self, node: &SnapshotNode, key: &str) -> Option<&SnapshotNode> {
        node.children.get(key).map(|&child| &self.nodes[child])
    }

    /// Child keys of `node` in ascending order.
    pub fn child_keys<'a>(&self, node: &'a SnapshotNode) -> impl Iterator<Item = &'a str> {
        node.children.keys().map(String::as_str)
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl PartialEq for InvertedIndexSnapshot {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(SNAPSHOT_ROOT, SNAPSHOT_ROOT)];
        while let Some((left, right)) = stack.pop() {
            let (left, right) = (&self.nodes[left], &other.nodes[right]);
            if left.df != right.df
                || left.docs != right.docs
                || left.children.len() != right.children.len()
            {
                return false;
            }
            for ((left_key, &left_child), (right_key, &right_child)) in
                left.children.iter().zip(&right.children)
            {
                if left_key != right_key {
                    return false;
                }
                stack.push((left_child, right_child));
            }
        }
        true
    }
}

impl Serialize for InvertedIndexSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("InvertedIndexSnapshot", 1)?;
        state.serialize_field(
            "root",
            &NodeRef {
                snapshot: self,
                node: SNAPSHOT_ROOT,
            },
        )?;
        state.end()
    }
}

struct NodeRef<'a> {
    snapshot: &'a InvertedIndexSnapshot,
    node: usize,
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = &self.snapshot.nodes[self.node];
        let mut map = serializer.serialize_map(Some(node.children.len() + 2))?;
        map.serialize_entry("docs", &node.docs)?;
        map.serialize_entry("df", &node.df)?;
        for (key, &child) in &node.children {
            map.serialize_entry(
                key,
                &NodeRef {
                    snapshot: self.snapshot,
                    node: child,
                },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for InvertedIndexSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SnapshotVisitor)
    }
}

struct SnapshotVisitor;

impl<'de> Visitor<'de> for SnapshotVisitor {
    type Value = InvertedIndexSnapshot;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an inverted index object with a root node")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut nodes = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            if key != "root" {
                map.next_value::<IgnoredAny>()?;
                continue;
            }
            if !nodes.is_empty() {
                return Err(de::Error::duplicate_field("root"));
            }
            map.next_value_seed(NodeSeed { nodes: &mut nodes })?;
        }
        if nodes.is_empty() {
            return Err(de::Error::missing_field("root"));
        }
        Ok(InvertedIndexSnapshot { nodes })
    }
}

/// Appends one node and its subtree to the arena, yielding the node's slot.
struct NodeSeed<'a> {
    nodes: &'a mut Vec<SnapshotNode>,
}

impl<'de> DeserializeSeed<'de> for NodeSeed<'_> {
    type Value = usize;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<usize, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for NodeSeed<'_> {
    type Value = usize;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a trie node object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<usize, A::Error> {
        let nodes = self.nodes;
        let slot = nodes.len();
        nodes.push(SnapshotNode::default());

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "docs" => nodes[slot].docs = map.next_value()?,
                "df" => nodes[slot].df = map.next_value()?,
                _ => {
                    let child = map.next_value_seed(NodeSeed { nodes: &mut *nodes })?;
                    nodes[slot].children.insert(key, child);
                }
            }
        }
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(tokens: &[(&str, &str, f64)]) -> InvertedIndex {
        let mut index = InvertedIndex::new();
        for (token, doc_ref, tf) in tokens {
            index.add_token(token, TokenInfo::new(*doc_ref, *tf));
        }
        index
    }

    #[test]
    fn test_add_and_lookup() {
        let index = index_with(&[("foo", "1", 1.0), ("foo", "2", 2.0), ("fob", "1", 1.0)]);

        assert_eq!(index.get_doc_freq("foo"), 2);
        assert_eq!(index.get_term_frequency("foo", "2"), 2.0);
        assert_eq!(index.get_term_frequency("foo", "3"), 0.0);
        assert_eq!(index.get_docs("foo").len(), 2);

        assert!(index.has_token("fo"));
        assert_eq!(index.get_doc_freq("fo"), 0);
        assert!(index.get_docs("fo").is_empty());

        assert!(!index.has_token("bar"));
        assert!(!index.has_token(""));
        assert_eq!(index.get_doc_freq("bar"), 0);
        assert_eq!(index.get_term_frequency("bar", "1"), 0.0);
    }

    #[test]
    fn test_re_adding_overwrites_tf() {
        let mut index = index_with(&[("foo", "1", 1.0)]);
        index.add_token("foo", TokenInfo::new("1", 3.0));

        assert_eq!(index.get_doc_freq("foo"), 1);
        assert_eq!(index.get_term_frequency("foo", "1"), 3.0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut index = index_with(&[("zephyr", "1", 1.0), ("zebra", "2", 1.0)]);

        index.remove_token("zephyr", "1");
        index.remove_token("zephyr", "1");
        index.remove_token("missing", "1");
        index.remove_token("zebra", "9");

        assert_eq!(index.get_doc_freq("zephyr"), 0);
        assert!(index.get_docs("zephyr").is_empty());
        assert!(index.has_token("zephyr"));
        assert_eq!(index.get_doc_freq("zebra"), 1);
    }

    #[test]
    fn test_expand_token() {
        let index = index_with(&[
            ("quick", "1", 1.0),
            ("quiet", "2", 1.0),
            ("qui", "3", 1.0),
            ("fox", "1", 1.0),
        ]);

        assert_eq!(index.expand_token("qui"), vec!["qui", "quick", "quiet"]);
        assert_eq!(index.expand_token("quic"), vec!["quick"]);
        assert_eq!(index.expand_token("quick"), vec!["quick"]);
        assert!(index.expand_token("z").is_empty());
        assert!(index.expand_token("").is_empty());
    }

    #[test]
    fn test_expand_skips_emptied_tokens() {
        let mut index = index_with(&[("quick", "1", 1.0), ("quiet", "2", 1.0)]);
        index.remove_token("quiet", "2");
        assert_eq!(index.expand_token("qu"), vec!["quick"]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let index = index_with(&[("ab", "1", 1.5), ("ac", "2", 1.0), ("é", "3", 1.0)]);
        let snapshot = index.to_snapshot();

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["root"]["a"]["b"]["docs"]["1"]["tf"], 1.5);
        assert_eq!(json["root"]["a"]["df"], 0);

        let restored = InvertedIndex::from_snapshot(&serde_json::from_value(json).unwrap());
        assert_eq!(restored.get_term_frequency("ab", "1"), 1.5);
        assert_eq!(restored.get_doc_freq("ac"), 1);
        assert_eq!(restored.get_doc_freq("é"), 1);
        assert_eq!(restored.node_count(), index.node_count());
        assert_eq!(restored.to_snapshot(), snapshot);
    }

    #[test]
    fn test_snapshot_is_independent_of_insertion_order() {
        let forward = index_with(&[("ab", "1", 1.0), ("b", "2", 1.0), ("ac", "3", 1.0)]);
        let backward = index_with(&[("ac", "3", 1.0), ("b", "2", 1.0), ("ab", "1", 1.0)]);
        assert_eq!(forward.to_snapshot(), backward.to_snapshot());

        let other = index_with(&[("ab", "1", 1.0), ("b", "2", 2.0), ("ac", "3", 1.0)]);
        assert_ne!(forward.to_snapshot(), other.to_snapshot());
    }

    #[test]
    fn test_snapshot_of_very_long_token() {
        let token = "z".repeat(200_000);
        let index = index_with(&[(token.as_str(), "1", 1.0)]);

        let snapshot = index.to_snapshot();
        assert_eq!(snapshot.node_count(), 200_001);
        let restored = InvertedIndex::from_snapshot(&snapshot);
        assert_eq!(restored.get_doc_freq(&token), 1);
        assert_eq!(restored.to_snapshot(), snapshot);
    }
}
