pub mod config;
pub mod search;

use log::debug;
use parking_lot::RwLock;

use crate::analysis::pipeline::Pipeline;
use crate::data::Document;
use crate::error::Result;
use crate::lexical::index::{Index, SearchResult};
use crate::lexical::snapshot::IndexSnapshot;

use self::config::IndexConfig;
use self::search::SearchRequest;

/// Thread-safe facade over an [`Index`].
///
/// Mutations take the write lock and searches the read lock, so any number
/// of searches run concurrently while writes are serialized.
pub struct Engine {
    config: IndexConfig,
    index: RwLock<Index>,
}

impl Engine {
    /// Create an empty engine.
    ///
    /// Fails when the separator is not a valid regex or the pipeline names a
    /// filter that is not built in.
    pub fn new(config: IndexConfig) -> Result<Self> {
        let mut index = Index::new();
        for field in &config.fields {
            index.add_field(field.as_str());
        }
        index
            .set_ref(config.ref_field.as_str())
            .save_document(config.store_documents);
        Self::apply_analysis(&mut index, &config)?;
        let pipeline = Pipeline::load(config.pipeline.as_slice(), index.registry().clone())?;
        *index.pipeline_mut() = pipeline;

        Ok(Self {
            config,
            index: RwLock::new(index),
        })
    }

    /// Apply the analysis settings that are not part of a snapshot.
    fn apply_analysis(index: &mut Index, config: &IndexConfig) -> Result<()> {
        if let Some(separator) = &config.separator {
            index.tokenizer_mut().set_separator(separator)?;
        }
        if let Some(words) = &config.stop_words {
            index.stop_words().clear();
            index.stop_words().add(words.iter().cloned());
        }
        Ok(())
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Index a document. Its reference is read from the configured
    /// reference field.
    pub fn put_document(&self, doc: Document) -> Result<()> {
        self.index.write().add_doc(&doc)
    }

    /// Replace a previously indexed document with the same reference.
    pub fn update_document(&self, doc: Document) -> Result<()> {
        self.index.write().update_doc(&doc)
    }

    /// Delete the document stored under `doc_ref`. Returns whether it was
    /// indexed. Requires document storage.
    pub fn delete_document(&self, doc_ref: &str) -> bool {
        self.index.write().remove_doc_by_ref(doc_ref)
    }

    pub fn search(&self, request: SearchRequest) -> Vec<SearchResult> {
        let results = self
            .index
            .read()
            .search(&request.query, request.options.as_ref());
        let total = results.len();

        let page: Vec<SearchResult> = results
            .into_iter()
            .skip(request.offset)
            .take(request.limit.unwrap_or(usize::MAX))
            .collect();
        debug!(
            "returning {} of {total} hits (offset {})",
            page.len(),
            request.offset
        );
        page
    }

    pub fn doc_count(&self) -> usize {
        self.index.read().doc_count()
    }

    pub fn snapshot(&self) -> IndexSnapshot {
        self.index.read().to_snapshot()
    }

    /// Replace the whole index with `snapshot`.
    ///
    /// Fields, reference field and pipeline come from the snapshot; the
    /// separator and stop words come from this engine's configuration.
    pub fn restore(&self, snapshot: IndexSnapshot) -> Result<()> {
        let mut index = Index::load(snapshot)?;
        Self::apply_analysis(&mut index, &self.config)?;
        *self.index.write() = index;
        Ok(())
    }

    /// Run `f` with shared access to the index.
    pub fn with_index<R>(&self, f: impl FnOnce(&Index) -> R) -> R {
        f(&*self.index.read())
    }

    /// Run `f` with exclusive access to the index.
    pub fn with_index_mut<R>(&self, f: impl FnOnce(&mut Index) -> R) -> R {
        f(&mut *self.index.write())
    }
}
