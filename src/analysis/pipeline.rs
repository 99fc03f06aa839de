//! Token filter pipeline.
//!
//! A pipeline is an ordered list of named [`TokenFilter`]s. The same pipeline
//! runs over document tokens at index time and over query tokens at search
//! time, so both sides are normalized identically.

use std::fmt;
use std::sync::Arc;

use log::warn;

use crate::analysis::registry::FilterRegistry;
use crate::error::{PetalError, Result};

/// A single token transformation step.
pub trait TokenFilter: Send + Sync + fmt::Debug {
    /// Name under which the filter is registered and serialized.
    fn name(&self) -> &str;

    /// Transform `token`, found at `index` in `tokens`.
    ///
    /// Returning `None` drops the token and skips the remaining filters.
    fn filter(&self, token: &str, index: usize, tokens: &[String]) -> Option<String>;
}

/// Adapter turning a closure into a [`TokenFilter`].
pub struct FnFilter<F> {
    name: String,
    func: F,
}

impl<F> FnFilter<F>
where
    F: Fn(&str, usize, &[String]) -> Option<String> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        FnFilter {
            name: name.into(),
            func,
        }
    }
}

impl<F> fmt::Debug for FnFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFilter").field("name", &self.name).finish()
    }
}

impl<F> TokenFilter for FnFilter<F>
where
    F: Fn(&str, usize, &[String]) -> Option<String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn filter(&self, token: &str, index: usize, tokens: &[String]) -> Option<String> {
        (self.func)(token, index, tokens)
    }
}

/// Ordered sequence of token filters.
#[derive(Clone)]
pub struct Pipeline {
    filters: Vec<Arc<dyn TokenFilter>>,
    registry: Arc<FilterRegistry>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("filters", &self.names())
            .finish()
    }
}

impl Pipeline {
    /// Create an empty pipeline whose steps are checked against `registry`.
    pub fn new(registry: Arc<FilterRegistry>) -> Self {
        Pipeline {
            filters: Vec::new(),
            registry,
        }
    }

    /// Rebuild a pipeline from serialized filter names.
    pub fn load<S: AsRef<str>>(names: &[S], registry: Arc<FilterRegistry>) -> Result<Self> {
        let mut pipeline = Pipeline::new(registry);
        for name in names {
            let name = name.as_ref();
            let filter = pipeline.registry.get(name).ok_or_else(|| {
                PetalError::not_found(format!("cannot load unregistered filter '{name}'"))
            })?;
            pipeline.filters.push(filter);
        }
        Ok(pipeline)
    }

    /// Append a filter.
    pub fn add(&mut self, filter: Arc<dyn TokenFilter>) {
        self.warn_if_unregistered(filter.as_ref());
        self.filters.push(filter);
    }

    /// Insert `filter` right after the step named `existing`.
    pub fn after(&mut self, existing: &str, filter: Arc<dyn TokenFilter>) -> Result<()> {
        self.warn_if_unregistered(filter.as_ref());
        let pos = self.position(existing)?;
        self.filters.insert(pos + 1, filter);
        Ok(())
    }

    /// Insert `filter` right before the step named `existing`.
    pub fn before(&mut self, existing: &str, filter: Arc<dyn TokenFilter>) -> Result<()> {
        self.warn_if_unregistered(filter.as_ref());
        let pos = self.position(existing)?;
        self.filters.insert(pos, filter);
        Ok(())
    }

    /// Remove the step named `name`. Returns whether a step was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.filters.iter().position(|f| f.name() == name) {
            Some(pos) => {
                self.filters.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.filters.clear();
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn filters(&self) -> &[Arc<dyn TokenFilter>] {
        &self.filters
    }

    /// Names of the steps, in order.
    pub fn names(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.name().to_string()).collect()
    }

    /// Serialized form: the step names, warning about unregistered steps.
    pub fn to_names(&self) -> Vec<String> {
        self.filters
            .iter()
            .map(|f| {
                self.warn_if_unregistered(f.as_ref());
                f.name().to_string()
            })
            .collect()
    }

    /// Run every token through the filters in order.
    pub fn run(&self, tokens: &[String]) -> Vec<String> {
        let mut output = Vec::with_capacity(tokens.len());

        'tokens: for (index, token) in tokens.iter().enumerate() {
            let mut current = token.clone();
            for filter in &self.filters {
                match filter.filter(&current, index, tokens) {
                    Some(next) => current = next,
                    None => continue 'tokens,
                }
            }
            output.push(current);
        }

        output
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.filters
            .iter()
            .position(|f| f.name() == name)
            .ok_or_else(|| PetalError::not_found(format!("cannot find pipeline step '{name}'")))
    }

    fn warn_if_unregistered(&self, filter: &dyn TokenFilter) {
        if !self.registry.is_registered(filter) {
            warn!(
                "filter '{}' is not registered with the pipeline, the index cannot be serialized faithfully",
                filter.name()
            );
        }
    }
}
