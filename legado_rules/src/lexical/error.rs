//! Tokenizing failures

use crate::config::compile_time::lexical::*;
use crate::logging::{codes, Code};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which entry point produced a token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// Main rule bodies
    Rule,
    /// URL templates
    Url,
    /// `{{...}}` format strings
    Inner,
    /// Comma separated page lists
    Page,
}

impl TokenizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenizerKind::Rule => "rule",
            TokenizerKind::Url => "url",
            TokenizerKind::Inner => "inner",
            TokenizerKind::Page => "page",
        }
    }
}

impl fmt::Display for TokenizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Low-level condition that stopped a tokenizer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexFault {
    #[error("rule is {length} characters long (max {MAX_RULE_LENGTH})")]
    InputTooLong { length: usize },

    #[error("more than {MAX_TOKEN_COUNT} tokens at char {position}")]
    TooManyTokens { position: usize },

    #[error("nesting depth {depth} at char {position} (max {MAX_NESTING_DEPTH})")]
    NestingTooDeep { depth: usize, position: usize },

    #[error("cursor moved from {from} to {to} in a {length} character rule")]
    CursorOutOfRange { from: usize, to: usize, length: usize },
}

impl LexFault {
    /// Character offset the fault refers to
    pub fn position(&self) -> usize {
        match self {
            LexFault::InputTooLong { .. } => 0,
            LexFault::TooManyTokens { position } | LexFault::NestingTooDeep { position, .. } => {
                *position
            }
            LexFault::CursorOutOfRange { from, .. } => *from,
        }
    }
}

/// The single failure kind every tokenizer reports
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} tokenizer failed: {fault}")]
pub struct TokenizeError {
    pub kind: TokenizerKind,
    #[source]
    pub fault: LexFault,
}

impl TokenizeError {
    pub fn new(kind: TokenizerKind, fault: LexFault) -> Self {
        Self { kind, fault }
    }

    pub fn error_code(&self) -> Code {
        match self.fault {
            LexFault::InputTooLong { .. } => codes::lexical::RULE_TOO_LONG,
            LexFault::TooManyTokens { .. } => codes::lexical::TOKEN_LIMIT_EXCEEDED,
            LexFault::NestingTooDeep { .. } => codes::lexical::NESTING_TOO_DEEP,
            LexFault::CursorOutOfRange { .. } => codes::lexical::CURSOR_OUT_OF_RANGE,
        }
    }

    pub fn position(&self) -> usize {
        self.fault.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_carries_cause() {
        let error = TokenizeError::new(
            TokenizerKind::Url,
            LexFault::NestingTooDeep {
                depth: 300,
                position: 12,
            },
        );

        assert_eq!(error.error_code(), codes::lexical::NESTING_TOO_DEEP);
        assert_eq!(error.position(), 12);
        assert!(error.to_string().starts_with("url tokenizer failed: nesting depth 300"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_every_fault_maps_to_registered_code() {
        let faults = [
            LexFault::InputTooLong { length: 1 },
            LexFault::TooManyTokens { position: 0 },
            LexFault::NestingTooDeep {
                depth: 1,
                position: 0,
            },
            LexFault::CursorOutOfRange {
                from: 1,
                to: 0,
                length: 1,
            },
        ];

        for fault in faults {
            let error = TokenizeError::new(TokenizerKind::Rule, fault);
            assert!(codes::is_registered(error.error_code()));
        }
    }
}
