//! Separator-based tokenizer.

use regex::Regex;

use crate::data::DataValue;
use crate::error::{PetalError, Result};

/// Separator used when none is configured: runs of whitespace or hyphens.
pub const DEFAULT_SEPARATOR: &str = r"[\s\-]+";

lazy_static::lazy_static! {
    static ref DEFAULT_SEPARATOR_RE: Regex = Regex::new(DEFAULT_SEPARATOR).unwrap();
}

/// Splits field values into lowercase tokens.
///
/// The separator belongs to the index that owns the tokenizer. Documents and
/// queries must go through the same tokenizer or matching silently breaks.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    separator: Regex,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Create a tokenizer with the default separator.
    pub fn new() -> Self {
        Tokenizer {
            separator: DEFAULT_SEPARATOR_RE.clone(),
        }
    }

    /// Create a tokenizer splitting on the given regex.
    pub fn with_separator(pattern: &str) -> Result<Self> {
        let mut tokenizer = Tokenizer::new();
        tokenizer.set_separator(pattern)?;
        Ok(tokenizer)
    }

    /// The current separator pattern.
    pub fn separator(&self) -> &str {
        self.separator.as_str()
    }

    pub fn set_separator(&mut self, pattern: &str) -> Result<()> {
        self.separator = Regex::new(pattern).map_err(|e| {
            PetalError::invalid_config(format!("invalid separator pattern '{pattern}': {e}"))
        })?;
        Ok(())
    }

    pub fn reset_separator(&mut self) {
        self.separator = DEFAULT_SEPARATOR_RE.clone();
    }

    /// Tokenize a single field value.
    ///
    /// Null yields nothing. Scalars are stringified, trimmed and lowercased
    /// before splitting. List elements are stringified and lowercased one by
    /// one (null elements are skipped) and split individually. Empty pieces
    /// are kept; the stop-word filter removes them.
    pub fn tokenize(&self, value: &DataValue) -> Vec<String> {
        match value {
            DataValue::Null => Vec::new(),
            DataValue::List(items) => items
                .iter()
                .filter(|item| !item.is_null())
                .flat_map(|item| self.split(&item.to_string().to_lowercase()))
                .collect(),
            other => self.tokenize_str(&other.to_string()),
        }
    }

    /// Tokenize a plain string.
    pub fn tokenize_str(&self, text: &str) -> Vec<String> {
        self.split(&text.trim().to_lowercase())
    }

    fn split(&self, text: &str) -> Vec<String> {
        self.separator.split(text).map(str::to_string).collect()
    }
}
