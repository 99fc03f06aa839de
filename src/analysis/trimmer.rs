//! Trimmer: strips non-word characters from both ends of a token.

use crate::analysis::pipeline::TokenFilter;
use crate::error::{PetalError, Result};

/// Removes leading and trailing characters that are not letters, digits or
/// underscores, so `"(fox),"` becomes `"fox"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trimmer;

impl Trimmer {
    pub const NAME: &'static str = "trimmer";
}

/// Trim a token. A missing token is a caller bug and is rejected.
pub fn trim_token(token: Option<&str>) -> Result<String> {
    let token = token.ok_or_else(|| PetalError::invalid_argument("token should not be null"))?;
    Ok(trim(token).to_string())
}

fn trim(token: &str) -> &str {
    token.trim_matches(|c: char| !is_word_char(c))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl TokenFilter for Trimmer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn filter(&self, token: &str, _index: usize, _tokens: &[String]) -> Option<String> {
        Some(trim(token).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim() {
        assert_eq!(trim_token(Some("hello")).unwrap(), "hello");
        assert_eq!(trim_token(Some("(hello),")).unwrap(), "hello");
        assert_eq!(trim_token(Some("...it's...")).unwrap(), "it's");
        assert_eq!(trim_token(Some("_id_")).unwrap(), "_id_");
        assert_eq!(trim_token(Some("«café»")).unwrap(), "café");
        assert_eq!(trim_token(Some("!!!")).unwrap(), "");
    }

    #[test]
    fn test_null_token_rejected() {
        assert!(matches!(
            trim_token(None),
            Err(PetalError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_filter_never_drops() {
        assert_eq!(Trimmer.filter("--", 0, &[]), Some(String::new()));
    }
}
