//! Lexical (keyword-based) indexing and search.
//!
//! # Module Structure
//!
//! - `trie`: per-field inverted index stored as a character trie
//! - `store`: stored documents and field lengths
//! - `config`: per-query boost, boolean mode and prefix expansion
//! - `event`: add/remove/update notifications
//! - `index`: the index itself and TF-IDF scoring
//! - `snapshot`: serialized form of an index

pub mod config;
pub mod event;
pub mod index;
pub mod snapshot;
pub mod store;
pub mod trie;

// Re-exports
pub use config::{BoolMode, Configuration, FieldConfig, FieldOptions, SearchOptions};
pub use event::{EventKind, IndexEvent, ListenerId};
pub use index::{Index, Query, SearchResult};
pub use snapshot::{IndexSnapshot, SNAPSHOT_VERSION};
pub use store::DocumentStore;
pub use trie::InvertedIndex;
