use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The value type for fields in a document.
///
/// Values serialize untagged, so a [`Document`] reads and writes as a plain
/// JSON object such as `{"id": 1, "title": "Hello", "tags": ["a", "b"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),

    /// Text content to be tokenized.
    Text(String),

    /// List of values (e.g. tags). Each element is tokenized on its own.
    List(Vec<DataValue>),
}

impl DataValue {
    /// Returns the text value if this is a Text variant.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value if this is an Int64 variant.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DataValue::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float value if this is a Float64 variant.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DataValue::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean value if this is a Bool variant.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            DataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the elements if this is a List variant.
    pub fn as_list(&self) -> Option<&[DataValue]> {
        match self {
            DataValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }
}

/// String form used for tokenization and as a document reference.
///
/// Integral floats print without a fractional part, so `1.0` and `1` give
/// the same reference. Lists join their elements with commas.
impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => Ok(()),
            DataValue::Bool(b) => write!(f, "{b}"),
            DataValue::Int64(i) => write!(f, "{i}"),
            DataValue::Float64(v) => write!(f, "{v}"),
            DataValue::Text(s) => f.write_str(s),
            DataValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

// --- Conversions ---

impl From<String> for DataValue {
    fn from(v: String) -> Self {
        DataValue::Text(v)
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        DataValue::Text(v.to_string())
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        DataValue::Int64(v)
    }
}

impl From<i32> for DataValue {
    fn from(v: i32) -> Self {
        DataValue::Int64(v as i64)
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Float64(v)
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        DataValue::Bool(v)
    }
}

impl<T: Into<DataValue>> From<Vec<T>> for DataValue {
    fn from(v: Vec<T>) -> Self {
        DataValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(DataValue::Null)
    }
}

/// A document is a flat collection of named fields.
///
/// One of the fields acts as the reference field of the index the document
/// is added to; its value is the document's key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    /// Field data.
    pub fields: HashMap<String, DataValue>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Add a field to the document.
    pub fn add_field(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add a text field.
    pub fn add_text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields
            .insert(name.into(), DataValue::Text(text.into()));
        self
    }

    /// Add an integer field.
    pub fn add_integer(mut self, name: impl Into<String>, value: i64) -> Self {
        self.fields.insert(name.into(), DataValue::Int64(value));
        self
    }

    /// Add a float field.
    pub fn add_float(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), DataValue::Float64(value));
        self
    }

    /// Add a boolean field.
    pub fn add_boolean(mut self, name: impl Into<String>, value: bool) -> Self {
        self.fields.insert(name.into(), DataValue::Bool(value));
        self
    }

    /// Add a list field.
    pub fn add_list<T: Into<DataValue>>(mut self, name: impl Into<String>, values: Vec<T>) -> Self {
        self.fields.insert(name.into(), DataValue::from(values));
        self
    }

    /// Insert or replace a field in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<DataValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a reference to a field's value.
    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.fields.get(name)
    }

    /// Check if the document has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get all field names.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(|s| s.as_str()).collect()
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_reference_form() {
        assert_eq!(DataValue::from(1.0).to_string(), "1");
        assert_eq!(DataValue::from(2.5).to_string(), "2.5");
        assert_eq!(DataValue::from(42).to_string(), "42");
        assert_eq!(DataValue::from(true).to_string(), "true");
        assert_eq!(DataValue::Null.to_string(), "");
        assert_eq!(DataValue::from(vec!["a", "b"]).to_string(), "a,b");
    }

    #[test]
    fn test_document_json_is_flat() {
        let doc = Document::new()
            .add_integer("id", 7)
            .add_text("title", "Hello");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json, serde_json::json!({"id": 7, "title": "Hello"}));

        let back: Document =
            serde_json::from_str(r#"{"id": 7, "score": 1.5, "tags": ["x", null], "n": null}"#)
                .unwrap();
        assert_eq!(back.get("id"), Some(&DataValue::Int64(7)));
        assert_eq!(back.get("score"), Some(&DataValue::Float64(1.5)));
        assert_eq!(
            back.get("tags"),
            Some(&DataValue::List(vec![DataValue::from("x"), DataValue::Null]))
        );
        assert!(back.get("n").unwrap().is_null());
    }
}
