//! The searchable index: documents in, ranked results out.
//!
//! An [`Index`] keeps one [`InvertedIndex`] per registered field plus a
//! [`DocumentStore`]. Field values go through the [`Tokenizer`] and the
//! [`Pipeline`] both when documents are added and when queries run.
//!
//! # Scoring
//!
//! For a query token `t` matching token `c` in document `d`:
//!
//! ```text
//! tf(c, d) * idf(c) * 1 / sqrt(len(d)) * sim(c, t)
//! ```
//!
//! where `tf` is the square root of the occurrence count, `idf` is
//! `1 + ln(N / (df + 1))` and `sim` is 1 for exact matches and
//! `0.15 * (1 - (len(c) - len(t)) / len(c))` for prefix expansions. Per
//! field, the token scores are combined with the field's [`BoolMode`], scaled
//! by the share of query tokens matched exactly and by the field boost. Field
//! scores are summed.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, warn};
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::pipeline::Pipeline;
use crate::analysis::registry::FilterRegistry;
use crate::analysis::stemmer::PorterStemmer;
use crate::analysis::stop::StopWordFilter;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::trimmer::Trimmer;
use crate::data::{DataValue, Document};
use crate::error::{PetalError, Result};
use crate::lexical::config::{BoolMode, Configuration, FieldConfig, SearchOptions};
use crate::lexical::event::{EventEmitter, EventKind, IndexEvent, ListenerId};
use crate::lexical::snapshot::{IndexSnapshot, SNAPSHOT_VERSION};
use crate::lexical::store::DocumentStore;
use crate::lexical::trie::{InvertedIndex, TokenInfo};

/// Reference field used until [`Index::set_ref`] is called.
pub const DEFAULT_REF_FIELD: &str = "id";

/// Filter names of the pipeline a new index starts with.
pub const DEFAULT_PIPELINE: &[&str] = &[Trimmer::NAME, StopWordFilter::NAME, PorterStemmer::NAME];

/// Query key whose text applies to every field without text of its own.
pub const ANY_FIELD: &str = "any";

/// Similarity weight of a prefix expansion relative to an exact match.
const EXPANSION_WEIGHT: f64 = 0.15;

/// Accumulated scores keyed by document reference.
type Scores = BTreeMap<String, f64>;

/// Query input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Query {
    /// Text matched against every field.
    Any(String),
    /// Text per field. An `"any"` entry applies to the fields not listed.
    Fields(BTreeMap<String, String>),
}

impl Query {
    pub fn any(text: impl Into<String>) -> Self {
        Query::Any(text.into())
    }

    /// Query a single field.
    pub fn field(name: impl Into<String>, text: impl Into<String>) -> Self {
        Query::Fields(BTreeMap::from([(name.into(), text.into())]))
    }

    /// Add text for another field. An [`Query::Any`] text is kept as the
    /// `"any"` entry.
    pub fn and_field(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut fields = match self {
            Query::Any(text) => BTreeMap::from([(ANY_FIELD.to_string(), text)]),
            Query::Fields(fields) => fields,
        };
        fields.insert(name.into(), text.into());
        Query::Fields(fields)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Query::Any(text) => text.is_empty(),
            Query::Fields(fields) => fields.is_empty(),
        }
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::Any(text.to_string())
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::Any(text)
    }
}

/// A ranked hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    #[serde(rename = "ref")]
    pub doc_ref: String,
    pub score: f64,
    /// The stored document, when the index keeps documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<Document>,
}

/// In-memory full-text index over a fixed set of fields.
#[derive(Debug)]
pub struct Index {
    fields: Vec<String>,
    ref_field: String,
    index: AHashMap<String, InvertedIndex>,
    document_store: DocumentStore,
    pipeline: Pipeline,
    tokenizer: Tokenizer,
    stop_words: Arc<StopWordFilter>,
    registry: Arc<FilterRegistry>,
    events: EventEmitter,
    idf_cache: Mutex<AHashMap<(String, String), f64>>,
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

impl Index {
    /// Create an index with no fields, the `"id"` reference field, document
    /// storage enabled and the trimmer, stop-word and stemmer pipeline.
    pub fn new() -> Self {
        let stop_words = Arc::new(StopWordFilter::new());
        let registry = Arc::new(FilterRegistry::with_defaults(stop_words.clone()));
        let mut pipeline = Pipeline::new(registry.clone());
        for name in DEFAULT_PIPELINE {
            if let Some(filter) = registry.get(name) {
                pipeline.add(filter);
            }
        }
        Self::with_parts(pipeline, stop_words, registry)
    }

    fn with_parts(
        pipeline: Pipeline,
        stop_words: Arc<StopWordFilter>,
        registry: Arc<FilterRegistry>,
    ) -> Self {
        Index {
            fields: Vec::new(),
            ref_field: DEFAULT_REF_FIELD.to_string(),
            index: AHashMap::new(),
            document_store: DocumentStore::new(true),
            pipeline,
            tokenizer: Tokenizer::new(),
            stop_words,
            registry,
            events: EventEmitter::new(),
            idf_cache: Mutex::new(AHashMap::new()),
        }
    }

    /// Register a field to index. Fields should be added before documents.
    pub fn add_field(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if self.index.contains_key(&name) {
            warn!("field '{name}' is already indexed");
            return self;
        }
        self.index.insert(name.clone(), InvertedIndex::new());
        self.fields.push(name);
        self
    }

    /// Set the field holding each document's unique reference.
    pub fn set_ref(&mut self, field: impl Into<String>) -> &mut Self {
        self.ref_field = field.into();
        self
    }

    /// Replace the document store with an empty one that keeps full
    /// documents only when `save` is true.
    pub fn save_document(&mut self, save: bool) -> &mut Self {
        self.document_store = DocumentStore::new(save);
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn ref_field(&self) -> &str {
        &self.ref_field
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn tokenizer_mut(&mut self) -> &mut Tokenizer {
        &mut self.tokenizer
    }

    /// The stop-word set used by this index's `stopWordFilter` step.
    pub fn stop_words(&self) -> &StopWordFilter {
        &self.stop_words
    }

    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    pub fn document_store(&self) -> &DocumentStore {
        &self.document_store
    }

    /// The inverted index of `field`.
    pub fn field_index(&self, field: &str) -> Option<&InvertedIndex> {
        self.index.get(field)
    }

    pub fn doc_count(&self) -> usize {
        self.document_store.len()
    }

    /// Listen for the given mutation kinds.
    pub fn on<F>(&mut self, kinds: &[EventKind], listener: F) -> ListenerId
    where
        F: Fn(&IndexEvent<'_>) + Send + Sync + 'static,
    {
        self.events.add_listener(kinds, listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.remove_listener(id)
    }

    /// Run an extension against this index.
    pub fn use_plugin<F, R>(&mut self, plugin: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        plugin(self)
    }

    /// Tokenize a value and run it through the pipeline.
    pub fn analyze(&self, value: &DataValue) -> Vec<String> {
        self.pipeline.run(&self.tokenizer.tokenize(value))
    }

    fn analyze_str(&self, text: &str) -> Vec<String> {
        self.pipeline.run(&self.tokenizer.tokenize_str(text))
    }

    /// The reference of `doc`, or an error when the reference field is
    /// missing, null or empty.
    pub fn doc_ref(&self, doc: &Document) -> Result<String> {
        let doc_ref = doc
            .get(&self.ref_field)
            .filter(|value| !value.is_null())
            .map(ToString::to_string)
            .unwrap_or_default();
        if doc_ref.is_empty() {
            return Err(PetalError::invalid_argument(format!(
                "document has no value for reference field '{}'",
                self.ref_field
            )));
        }
        Ok(doc_ref)
    }

    /// Index `doc`.
    ///
    /// Adding a reference that is already indexed overwrites the stored copy
    /// but leaves the old tokens in place; use [`Index::update_doc`] to
    /// replace a document.
    pub fn add_doc(&mut self, doc: &Document) -> Result<()> {
        let doc_ref = self.doc_ref(doc)?;
        self.index_doc(&doc_ref, doc);
        debug!("added document '{doc_ref}'");
        self.events.emit(&IndexEvent {
            kind: EventKind::Add,
            doc_ref: &doc_ref,
            document: doc,
        });
        Ok(())
    }

    fn index_doc(&mut self, doc_ref: &str, doc: &Document) {
        self.document_store.add_doc(doc_ref, doc);

        for field in &self.fields {
            let tokens = self.analyze(doc.get(field).unwrap_or(&DataValue::Null));
            self.document_store
                .add_field_length(doc_ref, field, tokens.len());

            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for token in &tokens {
                *counts.entry(token.as_str()).or_insert(0) += 1;
            }

            if let Some(trie) = self.index.get_mut(field) {
                for (token, count) in counts {
                    trie.add_token(token, TokenInfo::new(doc_ref, (count as f64).sqrt()));
                }
            }
        }

        self.idf_cache.get_mut().clear();
    }

    /// Remove `doc` from the index. Returns whether it was indexed.
    pub fn remove_doc(&mut self, doc: &Document) -> bool {
        let Ok(doc_ref) = self.doc_ref(doc) else {
            return false;
        };
        if !self.unindex_doc(&doc_ref, doc) {
            return false;
        }
        debug!("removed document '{doc_ref}'");
        self.events.emit(&IndexEvent {
            kind: EventKind::Remove,
            doc_ref: &doc_ref,
            document: doc,
        });
        true
    }

    /// Remove the document stored under `doc_ref`. Returns whether it was
    /// indexed.
    ///
    /// The tokens to remove are recomputed from the stored copy, so this
    /// does nothing when document storage is disabled.
    pub fn remove_doc_by_ref(&mut self, doc_ref: &str) -> bool {
        if !self.document_store.is_doc_stored() {
            debug!("cannot remove '{doc_ref}' by reference: documents are not stored");
            return false;
        }
        match self.document_store.get_doc(doc_ref).cloned() {
            Some(doc) => self.remove_doc(&doc),
            None => false,
        }
    }

    fn unindex_doc(&mut self, doc_ref: &str, doc: &Document) -> bool {
        if !self.document_store.has_doc(doc_ref) {
            return false;
        }
        self.document_store.remove_doc(doc_ref);

        for field in &self.fields {
            let tokens = self.analyze(doc.get(field).unwrap_or(&DataValue::Null));
            if let Some(trie) = self.index.get_mut(field) {
                for token in &tokens {
                    trie.remove_token(token, doc_ref);
                }
            }
        }

        self.idf_cache.get_mut().clear();
        true
    }

    /// Replace the indexed version of `doc` with its current content.
    ///
    /// Listeners see a single [`EventKind::Update`]. Without document
    /// storage the previous tokens cannot be recomputed and stay indexed.
    pub fn update_doc(&mut self, doc: &Document) -> Result<()> {
        let doc_ref = self.doc_ref(doc)?;
        if self.document_store.is_doc_stored() {
            if let Some(previous) = self.document_store.get_doc(&doc_ref).cloned() {
                self.unindex_doc(&doc_ref, &previous);
            }
        } else {
            debug!("updating '{doc_ref}' without stored documents, previous tokens are kept");
        }
        self.index_doc(&doc_ref, doc);
        debug!("updated document '{doc_ref}'");
        self.events.emit(&IndexEvent {
            kind: EventKind::Update,
            doc_ref: &doc_ref,
            document: doc,
        });
        Ok(())
    }

    /// Inverse document frequency of `token` in `field`.
    pub fn idf(&self, token: &str, field: &str) -> f64 {
        let key = (field.to_string(), token.to_string());
        if let Some(&idf) = self.idf_cache.lock().get(&key) {
            return idf;
        }

        let df = self
            .index
            .get(field)
            .map(|trie| trie.get_doc_freq(token))
            .unwrap_or(0);
        let idf = 1.0 + (self.document_store.len() as f64 / (df as f64 + 1.0)).ln();
        self.idf_cache.lock().insert(key, idf);
        idf
    }

    /// Search with per-query options. `None` searches every field with the
    /// default settings.
    pub fn search(&self, query: &Query, options: Option<&SearchOptions>) -> Vec<SearchResult> {
        if query.is_empty() {
            return Vec::new();
        }
        let config = Configuration::new(options, self.fields.as_slice());
        self.search_with_config(query, &config)
    }

    /// Search with options given as JSON. Malformed options fall back to the
    /// default settings.
    pub fn search_json(&self, query: &Query, options: &str) -> Vec<SearchResult> {
        if query.is_empty() {
            return Vec::new();
        }
        let config = Configuration::from_json(options, self.fields.as_slice());
        self.search_with_config(query, &config)
    }

    fn search_with_config(&self, query: &Query, config: &Configuration) -> Vec<SearchResult> {
        let query_tokens: AHashMap<&str, Vec<String>> = match query {
            Query::Any(text) => AHashMap::from_iter([(ANY_FIELD, self.analyze_str(text))]),
            Query::Fields(fields) => fields
                .iter()
                .map(|(field, text)| (field.as_str(), self.analyze_str(text)))
                .collect(),
        };

        let field_queries: Vec<(&str, &FieldConfig, &Vec<String>)> = config
            .iter()
            .filter_map(|(field, field_config)| {
                let tokens = query_tokens
                    .get(field)
                    .or_else(|| query_tokens.get(ANY_FIELD))?;
                Some((field, field_config, tokens))
            })
            .collect();

        // Fields are scored independently; summing in field order keeps the
        // totals reproducible.
        let field_scores: Vec<Scores> = field_queries
            .par_iter()
            .map(|(field, field_config, tokens)| self.field_search(tokens, field, field_config))
            .collect();

        let mut totals = Scores::new();
        for scores in field_scores {
            for (doc_ref, score) in scores {
                *totals.entry(doc_ref).or_insert(0.0) += score;
            }
        }

        let mut results: Vec<SearchResult> = totals
            .into_iter()
            .filter(|(_, score)| *score != 0.0)
            .map(|(doc_ref, score)| SearchResult {
                doc: self.document_store.get_doc(&doc_ref).cloned(),
                doc_ref,
                score,
            })
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!("query matched {} documents", results.len());
        results
    }

    /// Score the analyzed `tokens` against one field, boost applied.
    pub fn field_search(&self, tokens: &[String], field: &str, config: &FieldConfig) -> Scores {
        if config.boost == 0.0 {
            return Scores::new();
        }
        let Some(trie) = self.index.get(field) else {
            return Scores::new();
        };

        let mut scores: Option<Scores> = None;
        // Number of exact query-token matches per document.
        let mut matched: AHashMap<String, usize> = AHashMap::new();

        for token in tokens {
            let candidates = if config.expand {
                trie.expand_token(token)
            } else {
                vec![token.clone()]
            };

            let mut token_scores = Scores::new();
            for candidate in &candidates {
                let Some(postings) = trie.postings(candidate) else {
                    continue;
                };
                let idf = self.idf(candidate, field);
                let exact = candidate == token;
                let similarity = if exact {
                    1.0
                } else {
                    let candidate_len = candidate.chars().count() as f64;
                    let token_len = token.chars().count() as f64;
                    EXPANSION_WEIGHT * (1.0 - (candidate_len - token_len) / candidate_len)
                };
                let restrict = match config.bool {
                    BoolMode::And => scores.as_ref(),
                    BoolMode::Or => None,
                };

                for (doc_ref, &tf) in postings {
                    if restrict.is_some_and(|prior| !prior.contains_key(doc_ref)) {
                        continue;
                    }
                    if exact {
                        *matched.entry(doc_ref.clone()).or_insert(0) += 1;
                    }
                    let field_length = self.document_store.get_field_length(doc_ref, field);
                    let norm = if field_length == 0 {
                        1.0
                    } else {
                        1.0 / (field_length as f64).sqrt()
                    };
                    *token_scores.entry(doc_ref.clone()).or_insert(0.0) +=
                        tf * idf * norm * similarity;
                }
            }

            scores = Some(merge_scores(scores, token_scores, config.bool));
        }

        let mut scores = scores.unwrap_or_default();
        for (doc_ref, score) in scores.iter_mut() {
            if let Some(&count) = matched.get(doc_ref) {
                *score = *score * count as f64 / tokens.len() as f64;
            }
            *score *= config.boost;
        }
        scores
    }

    pub fn to_snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            version: SNAPSHOT_VERSION.to_string(),
            fields: self.fields.clone(),
            ref_field: self.ref_field.clone(),
            document_store: self.document_store.to_snapshot(),
            index: self
                .fields
                .iter()
                .filter_map(|field| {
                    let trie = self.index.get(field)?;
                    Some((field.clone(), trie.to_snapshot()))
                })
                .collect(),
            pipeline: self.pipeline.to_names(),
        }
    }

    /// Restore an index with the built-in filters.
    pub fn load(snapshot: IndexSnapshot) -> Result<Self> {
        let stop_words = Arc::new(StopWordFilter::new());
        let registry = Arc::new(FilterRegistry::with_defaults(stop_words));
        Self::load_with_registry(snapshot, registry)
    }

    /// Restore an index, resolving pipeline steps against `registry`.
    ///
    /// A version other than the current one is accepted with a warning. A
    /// pipeline step missing from the registry fails the load.
    pub fn load_with_registry(
        snapshot: IndexSnapshot,
        registry: Arc<FilterRegistry>,
    ) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            warn!(
                "version mismatch: current {SNAPSHOT_VERSION} importing {}",
                snapshot.version
            );
        }

        let pipeline = Pipeline::load(snapshot.pipeline.as_slice(), registry.clone())?;
        let stop_words = registry.stop_words().cloned().unwrap_or_default();
        let mut index = Self::with_parts(pipeline, stop_words, registry);
        index.ref_field = snapshot.ref_field;
        index.document_store = DocumentStore::from_snapshot(snapshot.document_store);

        let mut tries = snapshot.index;
        for field in snapshot.fields {
            let trie = match tries.remove(&field) {
                Some(trie) => InvertedIndex::from_snapshot(&trie),
                None => {
                    warn!("snapshot has no index for field '{field}', starting empty");
                    InvertedIndex::new()
                }
            };
            index.index.insert(field.clone(), trie);
            index.fields.push(field);
        }
        for field in tries.keys() {
            warn!("ignoring index of unregistered field '{field}'");
        }

        Ok(index)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(self.to_snapshot().to_json()?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::load(IndexSnapshot::from_json(json)?)
    }

    /// Write the snapshot of this index to `path` as JSON.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_snapshot().to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read an index written by [`Index::write_json`].
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Self::load(IndexSnapshot::from_reader(reader)?)
    }
}

/// Combine the scores of one query token into the field's running result.
fn merge_scores(accumulated: Option<Scores>, scores: Scores, mode: BoolMode) -> Scores {
    let Some(mut accumulated) = accumulated else {
        return scores;
    };
    match mode {
        BoolMode::And => scores
            .into_iter()
            .filter_map(|(doc_ref, score)| {
                let prior = accumulated.get(&doc_ref)?;
                Some((doc_ref, prior + score))
            })
            .collect(),
        BoolMode::Or => {
            for (doc_ref, score) in scores {
                *accumulated.entry(doc_ref).or_insert(0.0) += score;
            }
            accumulated
        }
    }
}
