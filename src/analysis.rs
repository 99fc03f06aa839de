//! Text analysis: splitting field values into tokens and normalizing them.
//!
//! A [`tokenizer::Tokenizer`] produces lowercase tokens; a
//! [`pipeline::Pipeline`] of named filters then trims, drops and stems them.
//! Filters are looked up by name in a [`registry::FilterRegistry`] when a
//! pipeline is restored from a snapshot.

pub mod pipeline;
pub mod registry;
pub mod stemmer;
pub mod stop;
pub mod tokenizer;
pub mod trimmer;

pub use pipeline::{FnFilter, Pipeline, TokenFilter};
pub use registry::FilterRegistry;
pub use stemmer::PorterStemmer;
pub use stop::StopWordFilter;
pub use tokenizer::Tokenizer;
pub use trimmer::Trimmer;
