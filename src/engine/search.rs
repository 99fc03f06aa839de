use log::warn;

use crate::lexical::config::SearchOptions;
use crate::lexical::index::Query;

/// Search request against an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: Query,

    /// Per-query field options. `None` searches every field with the
    /// defaults.
    pub options: Option<SearchOptions>,

    /// Maximum number of results to return. `None` returns every hit.
    pub limit: Option<usize>,

    /// Number of results to skip before returning (for pagination).
    pub offset: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<Query>) -> Self {
        Self {
            query: query.into(),
            options: None,
            limit: None,
            offset: 0,
        }
    }

    pub fn builder(query: impl Into<Query>) -> SearchRequestBuilder {
        SearchRequestBuilder {
            request: SearchRequest::new(query),
        }
    }
}

pub struct SearchRequestBuilder {
    request: SearchRequest,
}

impl SearchRequestBuilder {
    pub fn options(mut self, options: SearchOptions) -> Self {
        self.request.options = Some(options);
        self
    }

    /// Set options from JSON. Malformed JSON leaves the defaults in place.
    pub fn options_json(mut self, json: &str) -> Self {
        match SearchOptions::from_json(json) {
            Ok(options) => self.request.options = Some(options),
            Err(e) => warn!("search options parse failed, using default configuration: {e}"),
        }
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.request.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.request.offset = offset;
        self
    }

    pub fn build(self) -> SearchRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::config::BoolMode;

    #[test]
    fn test_builder() {
        let request = SearchRequest::builder("fox")
            .options_json(r#"{"bool": "AND"}"#)
            .limit(5)
            .offset(10)
            .build();

        assert_eq!(request.query, Query::any("fox"));
        assert_eq!(request.options.unwrap().bool, Some(BoolMode::And));
        assert_eq!(request.limit, Some(5));
        assert_eq!(request.offset, 10);
    }

    #[test]
    fn test_malformed_options_ignored() {
        let request = SearchRequest::builder("fox").options_json("{oops").build();
        assert!(request.options.is_none());
        assert_eq!(request, SearchRequest::new("fox"));
    }
}
