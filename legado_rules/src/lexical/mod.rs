//! Tokenizer family for book-source rules
//!
//! Four entry points share one marker check engine and one bracket-depth
//! scanner: the core rule tokenizer, the URL tokenizer, the inner format
//! tokenizer and the page list splitter. Each call owns its own state.

pub mod analyzer;
pub mod check;
pub mod error;
pub mod scanner;
pub mod state;

mod blocks;
mod inner;
mod page;
mod rule;
mod url;

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::TokenStream;
use state::CharLexer;

pub use analyzer::{LexicalAnalyzer, LexicalMetrics};
pub use error::{LexFault, TokenizeError, TokenizerKind};
pub use state::{LexStats, Lexed};

/// Run one tokenizer and keep its statistics
pub fn lex(kind: TokenizerKind, text: &str) -> Result<Lexed, TokenizeError> {
    let lexed = match kind {
        TokenizerKind::Rule => rule::RuleLexer::new(text).and_then(CharLexer::run),
        TokenizerKind::Url => url::UrlLexer::new(text).and_then(CharLexer::run),
        TokenizerKind::Inner => inner::InnerLexer::new(text).and_then(CharLexer::run),
        TokenizerKind::Page => page::PageSplitter::new(text).and_then(CharLexer::run),
    };
    lexed.map_err(|fault| TokenizeError::new(kind, fault))
}

pub fn tokenize_with(kind: TokenizerKind, text: &str) -> Result<TokenStream, TokenizeError> {
    lex(kind, text).map(|lexed| lexed.tokens)
}

/// Core tokenizer for rule bodies
pub fn tokenize(text: &str) -> Result<TokenStream, TokenizeError> {
    tokenize_with(TokenizerKind::Rule, text)
}

/// URL clause tokenizer
pub fn tokenize_url(text: &str) -> Result<TokenStream, TokenizeError> {
    tokenize_with(TokenizerKind::Url, text)
}

/// Tokenizer for nested `{{...}}` format strings
pub fn tokenize_inner(text: &str) -> Result<TokenStream, TokenizeError> {
    tokenize_with(TokenizerKind::Inner, text)
}

/// Split a comma separated page list
pub fn split_page(text: &str) -> Result<TokenStream, TokenizeError> {
    tokenize_with(TokenizerKind::Page, text)
}

pub fn create_analyzer() -> LexicalAnalyzer {
    LexicalAnalyzer::new()
}

pub fn create_analyzer_with_preferences(preferences: LexicalPreferences) -> LexicalAnalyzer {
    LexicalAnalyzer::with_preferences(preferences)
}

const LEXICAL_CODES: [crate::logging::Code; 5] = [
    codes::lexical::RULE_TOO_LONG,
    codes::lexical::TOKEN_LIMIT_EXCEEDED,
    codes::lexical::NESTING_TOO_DEEP,
    codes::lexical::CURSOR_OUT_OF_RANGE,
    codes::lexical::UNTERMINATED_BLOCK,
];

/// Check lexical codes against the registry at startup
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    validate_tokenization()?;

    crate::log_debug!("Lexical limits initialized",
        "max_rule_length" => MAX_RULE_LENGTH,
        "max_token_count" => MAX_TOKEN_COUNT,
        "max_nesting_depth" => MAX_NESTING_DEPTH
    );
    Ok(())
}

/// Codes registered and limits usable
pub fn validate_tokenization() -> Result<(), String> {
    codes::ensure_registered("lexical analysis", &LEXICAL_CODES)?;

    if MAX_RULE_LENGTH == 0 {
        return Err("MAX_RULE_LENGTH cannot be zero".to_string());
    }
    if MAX_TOKEN_COUNT == 0 {
        return Err("MAX_TOKEN_COUNT cannot be zero".to_string());
    }
    if MAX_NESTING_DEPTH == 0 {
        return Err("MAX_NESTING_DEPTH cannot be zero".to_string());
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalLimits {
    pub max_rule_length: usize,
    pub max_token_count: usize,
    pub max_nesting_depth: usize,
}

pub fn get_lexical_limits() -> LexicalLimits {
    LexicalLimits {
        max_rule_length: MAX_RULE_LENGTH,
        max_token_count: MAX_TOKEN_COUNT,
        max_nesting_depth: MAX_NESTING_DEPTH,
    }
}
