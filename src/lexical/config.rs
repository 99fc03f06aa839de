//! Per-query search configuration.
//!
//! A query can tune, per field, the boost applied to the field's score, how
//! the field's query tokens are combined, and whether tokens are expanded as
//! prefixes. Options are usually given as JSON:
//!
//! ```json
//! { "bool": "AND", "expand": true,
//!   "fields": { "title": { "boost": 2 }, "body": { "boost": 1, "bool": "OR" } } }
//! ```

use log::warn;
use serde::{Deserialize, Serialize};

/// How the query tokens of one field are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoolMode {
    /// A document must match every token.
    #[serde(rename = "AND", alias = "and")]
    And,
    /// A document must match at least one token.
    #[default]
    #[serde(rename = "OR", alias = "or")]
    Or,
}

/// Caller-supplied options for a single field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bool: Option<BoolMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<bool>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }

    pub fn bool(mut self, mode: BoolMode) -> Self {
        self.bool = Some(mode);
        self
    }

    pub fn expand(mut self, expand: bool) -> Self {
        self.expand = Some(expand);
        self
    }
}

/// Caller-supplied options for a whole query.
///
/// When `fields` is present, only the listed fields are searched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawSearchOptions")]
pub struct SearchOptions {
    pub bool: Option<BoolMode>,
    pub expand: Option<bool>,
    pub fields: Option<Vec<(String, FieldOptions)>>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn bool(mut self, mode: BoolMode) -> Self {
        self.bool = Some(mode);
        self
    }

    pub fn expand(mut self, expand: bool) -> Self {
        self.expand = Some(expand);
        self
    }

    /// Restrict the search to `name` with the given options.
    pub fn field(mut self, name: impl Into<String>, options: FieldOptions) -> Self {
        self.fields
            .get_or_insert_with(Vec::new)
            .push((name.into(), options));
        self
    }
}

/// JSON shape of [`SearchOptions`], with `fields` as an object.
#[derive(Deserialize)]
struct RawSearchOptions {
    #[serde(default)]
    bool: Option<BoolMode>,
    #[serde(default)]
    expand: Option<bool>,
    #[serde(default)]
    fields: Option<serde_json::Map<String, serde_json::Value>>,
}

impl From<RawSearchOptions> for SearchOptions {
    fn from(raw: RawSearchOptions) -> Self {
        let fields = raw.fields.map(|fields| {
            fields
                .into_iter()
                .map(|(name, value)| {
                    let options = serde_json::from_value(value).unwrap_or_else(|e| {
                        warn!("ignoring malformed options for field '{name}': {e}");
                        FieldOptions::default()
                    });
                    (name, options)
                })
                .collect()
        });
        SearchOptions {
            bool: raw.bool,
            expand: raw.expand,
            fields,
        }
    }
}

/// Resolved settings for one field of one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldConfig {
    pub boost: f64,
    pub bool: BoolMode,
    pub expand: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            boost: 1.0,
            bool: BoolMode::Or,
            expand: false,
        }
    }
}

/// Per-query configuration resolved against the index's fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    config: Vec<(String, FieldConfig)>,
}

impl Configuration {
    /// Resolve `options` against the registered `fields`.
    ///
    /// Without options every field is searched with the defaults. Listed
    /// fields that are not registered are skipped with a warning.
    pub fn new<S: AsRef<str>>(options: Option<&SearchOptions>, fields: &[S]) -> Self {
        match options {
            Some(options) => Self::build_user_config(options, fields),
            None => Self::build_default_config(fields),
        }
    }

    /// Resolve options given as JSON. Malformed JSON falls back to the
    /// default configuration.
    pub fn from_json<S: AsRef<str>>(json: &str, fields: &[S]) -> Self {
        match SearchOptions::from_json(json) {
            Ok(options) => Self::build_user_config(&options, fields),
            Err(e) => {
                warn!("search options parse failed, using default configuration: {e}");
                Self::build_default_config(fields)
            }
        }
    }

    fn build_default_config<S: AsRef<str>>(fields: &[S]) -> Self {
        Configuration {
            config: fields
                .iter()
                .map(|f| (f.as_ref().to_string(), FieldConfig::default()))
                .collect(),
        }
    }

    fn build_user_config<S: AsRef<str>>(options: &SearchOptions, fields: &[S]) -> Self {
        let bool = options.bool.unwrap_or_default();
        let expand = options.expand.unwrap_or(false);

        let Some(user_fields) = &options.fields else {
            return Configuration {
                config: fields
                    .iter()
                    .map(|f| {
                        let config = FieldConfig {
                            boost: 1.0,
                            bool,
                            expand,
                        };
                        (f.as_ref().to_string(), config)
                    })
                    .collect(),
            };
        };

        for (name, _) in user_fields {
            if !fields.iter().any(|f| f.as_ref() == name) {
                warn!("field '{name}' in search options is not an indexed field, ignoring it");
            }
        }

        // Registered field order; the last entry wins for repeated names.
        let config = fields
            .iter()
            .filter_map(|f| {
                let name = f.as_ref();
                let (_, field) = user_fields.iter().rev().find(|(n, _)| n == name)?;
                let config = FieldConfig {
                    boost: field.boost.unwrap_or(1.0),
                    bool: field.bool.unwrap_or(bool),
                    expand: field.expand.unwrap_or(expand),
                };
                Some((name.to_string(), config))
            })
            .collect();

        Configuration { config }
    }

    /// Settings for `field`, if the field takes part in the query.
    pub fn get(&self, field: &str) -> Option<&FieldConfig> {
        self.config
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, config)| config)
    }

    /// Configured fields, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldConfig)> {
        self.config.iter().map(|(name, config)| (name.as_str(), config))
    }

    pub fn len(&self) -> usize {
        self.config.len()
    }

    pub fn is_empty(&self) -> bool {
        self.config.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[&str] = &["title", "body"];

    #[test]
    fn test_default_config() {
        let config = Configuration::new(None, FIELDS);
        assert_eq!(config.len(), 2);
        assert_eq!(config.get("title"), Some(&FieldConfig::default()));
        assert_eq!(config.get("body"), Some(&FieldConfig::default()));
    }

    #[test]
    fn test_global_options_apply_to_all_fields() {
        let config = Configuration::from_json(r#"{"bool": "AND", "expand": true}"#, FIELDS);
        for (_, field) in config.iter() {
            assert_eq!(field.bool, BoolMode::And);
            assert!(field.expand);
            assert_eq!(field.boost, 1.0);
        }
    }

    #[test]
    fn test_field_options_restrict_and_override() {
        let json = r#"{
            "bool": "AND",
            "fields": {
                "title": {"boost": 2, "expand": true},
                "body": {"boost": 0, "bool": "OR"},
                "missing": {"boost": 5}
            }
        }"#;
        let config = Configuration::from_json(json, FIELDS);

        assert_eq!(
            config.get("title"),
            Some(&FieldConfig {
                boost: 2.0,
                bool: BoolMode::And,
                expand: true
            })
        );
        assert_eq!(
            config.get("body"),
            Some(&FieldConfig {
                boost: 0.0,
                bool: BoolMode::Or,
                expand: false
            })
        );
        assert!(config.get("missing").is_none());
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_unlisted_fields_are_not_searched() {
        let options = SearchOptions::new().field("body", FieldOptions::new().boost(3.0));
        let config = Configuration::new(Some(&options), FIELDS);
        assert!(config.get("title").is_none());
        assert_eq!(config.get("body").unwrap().boost, 3.0);
    }

    #[test]
    fn test_malformed_json_falls_back_to_default() {
        let config = Configuration::from_json("{not json", FIELDS);
        assert_eq!(config, Configuration::new(None, FIELDS));

        let config = Configuration::from_json(r#"{"bool": "XOR"}"#, FIELDS);
        assert_eq!(config, Configuration::new(None, FIELDS));
    }

    #[test]
    fn test_lowercase_bool_accepted() {
        let options = SearchOptions::from_json(r#"{"bool": "and"}"#).unwrap();
        assert_eq!(options.bool, Some(BoolMode::And));
    }
}
