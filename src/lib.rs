//! # Petal
//!
//! A small embedded full-text search library for Rust.
//!
//! ## Features
//!
//! - Per-field inverted indexes stored as character tries
//! - TF-IDF scoring with field-length normalization
//! - Per-query field boosts, AND/OR combination and prefix expansion
//! - Configurable analysis pipeline (trimmer, stop words, Porter stemmer)
//! - JSON snapshots compatible with elasticlunr indexes
//!
//! ```
//! use petal::{Document, Engine, IndexConfig, SearchRequest};
//!
//! let config = IndexConfig::builder().add_field("title").build();
//! let engine = Engine::new(config).unwrap();
//! engine
//!     .put_document(Document::new().add_text("id", "1").add_text("title", "Quick brown fox"))
//!     .unwrap();
//!
//! let hits = engine.search(SearchRequest::new("foxes"));
//! assert_eq!(hits[0].doc_ref, "1");
//! ```
pub mod analysis;
mod data;
mod engine;
mod error;
pub mod lexical;
pub mod util;

// Re-exports for the public API
pub use data::{DataValue, Document};
pub use engine::Engine;
pub use engine::config::{IndexConfig, IndexConfigBuilder};
pub use engine::search::{SearchRequest, SearchRequestBuilder};
pub use error::{PetalError, Result};
pub use lexical::{
    BoolMode, EventKind, FieldOptions, Index, IndexSnapshot, Query, SearchOptions, SearchResult,
};
pub use util::sorted_set::SortedSet;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
