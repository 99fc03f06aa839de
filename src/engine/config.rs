use serde::{Deserialize, Serialize};

use crate::lexical::index::{DEFAULT_PIPELINE, DEFAULT_REF_FIELD};

/// Configuration for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Indexed fields, in scoring order.
    pub fields: Vec<String>,
    /// Field holding each document's unique reference.
    #[serde(default = "default_ref_field")]
    pub ref_field: String,
    /// Keep full documents so results can return them and documents can be
    /// removed by reference.
    #[serde(default = "default_store_documents")]
    pub store_documents: bool,
    /// Tokenizer separator regex. The built-in separator splits on
    /// whitespace and hyphens.
    #[serde(default)]
    pub separator: Option<String>,
    /// Replaces the built-in stop-word list.
    #[serde(default)]
    pub stop_words: Option<Vec<String>>,
    /// Names of the pipeline filters, in order.
    #[serde(default = "default_pipeline")]
    pub pipeline: Vec<String>,
}

fn default_ref_field() -> String {
    DEFAULT_REF_FIELD.to_string()
}

fn default_store_documents() -> bool {
    true
}

fn default_pipeline() -> Vec<String> {
    DEFAULT_PIPELINE.iter().map(|name| name.to_string()).collect()
}

impl IndexConfig {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            ref_field: default_ref_field(),
            store_documents: default_store_documents(),
            separator: None,
            stop_words: None,
            pipeline: default_pipeline(),
        }
    }

    pub fn builder() -> IndexConfigBuilder {
        IndexConfigBuilder::default()
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub struct IndexConfigBuilder {
    config: IndexConfig,
}

impl Default for IndexConfigBuilder {
    fn default() -> Self {
        Self {
            config: IndexConfig::new(),
        }
    }
}

impl IndexConfigBuilder {
    pub fn add_field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.config.fields.contains(&name) {
            self.config.fields.push(name);
        }
        self
    }

    pub fn ref_field(mut self, name: impl Into<String>) -> Self {
        self.config.ref_field = name.into();
        self
    }

    pub fn store_documents(mut self, store: bool) -> Self {
        self.config.store_documents = store;
        self
    }

    pub fn separator(mut self, pattern: impl Into<String>) -> Self {
        self.config.separator = Some(pattern.into());
        self
    }

    pub fn stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.stop_words = Some(words.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the pipeline with the named filters.
    pub fn pipeline<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.pipeline = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> IndexConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let config: IndexConfig = serde_json::from_str(r#"{"fields": ["title"]}"#).unwrap();
        assert_eq!(config.ref_field, "id");
        assert!(config.store_documents);
        assert_eq!(config.pipeline, vec!["trimmer", "stopWordFilter", "stemmer"]);
        assert_eq!(config, IndexConfig::builder().add_field("title").build());
    }

    #[test]
    fn test_builder() {
        let config = IndexConfig::builder()
            .add_field("title")
            .add_field("body")
            .add_field("title")
            .ref_field("slug")
            .store_documents(false)
            .separator(r"[\s,]+")
            .stop_words(["foo"])
            .pipeline(["trimmer"])
            .build();

        assert_eq!(config.fields, vec!["title", "body"]);
        assert_eq!(config.ref_field, "slug");
        assert!(!config.store_documents);
        assert_eq!(config.separator.as_deref(), Some(r"[\s,]+"));
        assert_eq!(config.stop_words, Some(vec!["foo".to_string()]));
        assert_eq!(config.pipeline, vec!["trimmer"]);
    }
}
