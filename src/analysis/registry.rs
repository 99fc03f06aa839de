//! Name to filter lookup table used to serialize and restore pipelines.

use std::sync::Arc;

use ahash::AHashMap;
use log::warn;

use crate::analysis::pipeline::TokenFilter;
use crate::analysis::stemmer::PorterStemmer;
use crate::analysis::stop::StopWordFilter;
use crate::analysis::trimmer::Trimmer;

/// Registry of token filters keyed by name.
///
/// A pipeline is serialized as the names of its steps; loading resolves each
/// name against a registry, so every filter that must survive a round trip
/// has to be registered here.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: AHashMap<String, Arc<dyn TokenFilter>>,
    stop_words: Option<Arc<StopWordFilter>>,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        FilterRegistry {
            filters: AHashMap::new(),
            stop_words: None,
        }
    }

    /// Registry with the built-in `trimmer`, `stopWordFilter` and `stemmer`.
    ///
    /// `stop_words` is the stop-word filter instance the registry hands out,
    /// so the owner can keep mutating the same set.
    pub fn with_defaults(stop_words: Arc<StopWordFilter>) -> Self {
        let mut registry = FilterRegistry::new();
        registry.register(Arc::new(Trimmer));
        registry.register(stop_words.clone());
        registry.register(Arc::new(PorterStemmer));
        registry.stop_words = Some(stop_words);
        registry
    }

    /// The stop-word filter registered by [`FilterRegistry::with_defaults`].
    pub fn stop_words(&self) -> Option<&Arc<StopWordFilter>> {
        self.stop_words.as_ref()
    }

    /// Register a filter under its own name, replacing any previous entry.
    pub fn register(&mut self, filter: Arc<dyn TokenFilter>) {
        let name = filter.name().to_string();
        if self.filters.contains_key(&name) {
            warn!("overwriting existing registered filter: {name}");
        }
        self.filters.insert(name, filter);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TokenFilter>> {
        self.filters.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Whether a filter with this filter's name is registered.
    pub fn is_registered(&self, filter: &dyn TokenFilter) -> bool {
        self.contains(filter.name())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.filters.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
