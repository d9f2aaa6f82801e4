//! Ordered token sequence produced by every tokenizer

use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Non-empty text tokens in source order.
///
/// Construction always drops empty entries, so a `TokenStream` never holds an
/// empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TokenStream {
    tokens: Vec<String>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw tokenizer output, dropping empty entries
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: raw
                .into_iter()
                .map(Into::into)
                .filter(|token: &String| !token.is_empty())
                .collect(),
        }
    }

    /// Re-apply the empty-token filter. A no-op on any constructed stream.
    pub fn filtered(self) -> Self {
        Self::from_raw(self.tokens)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.tokens.iter()
    }

    /// Tokens joined back into one string
    pub fn concat(&self) -> String {
        self.tokens.concat()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tokens
    }
}

impl From<Vec<String>> for TokenStream {
    fn from(raw: Vec<String>) -> Self {
        Self::from_raw(raw)
    }
}

impl From<TokenStream> for Vec<String> {
    fn from(stream: TokenStream) -> Self {
        stream.tokens
    }
}

impl Deref for TokenStream {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.tokens
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl IntoIterator for TokenStream {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl PartialEq<[&str]> for TokenStream {
    fn eq(&self, other: &[&str]) -> bool {
        self.tokens.len() == other.len() && self.tokens.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<const N: usize> PartialEq<[&str; N]> for TokenStream {
    fn eq(&self, other: &[&str; N]) -> bool {
        *self == other[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_drops_empty_tokens() {
        let stream = TokenStream::from_raw(vec!["", "a", "", "@", "b", ""]);
        assert_eq!(stream, ["a", "@", "b"]);
    }

    #[test]
    fn test_refilter_is_idempotent() {
        let stream = TokenStream::from_raw(vec!["x", "", "y"]);
        assert_eq!(stream.clone().filtered(), stream);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let stream = TokenStream::from_raw(vec!["a", "@", "b"]);
        assert_eq!(serde_json::to_string(&stream).unwrap(), r#"["a","@","b"]"#);

        let back: TokenStream = serde_json::from_str(r#"["a","","b"]"#).unwrap();
        assert_eq!(back, ["a", "b"]);
    }
}
