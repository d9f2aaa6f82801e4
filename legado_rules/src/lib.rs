// Internal modules
pub mod classify;
pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod source;
pub mod tokens;

// Re-export key types for library consumers
pub use classify::{classify, classify_group, ClassifyContext, RuleType};
pub use lexical::{split_page, tokenize, tokenize_inner, tokenize_url, TokenizeError, TokenizerKind};
pub use pipeline::{PipelineError, PipelineResult};
pub use source::BookSource;
pub use tokens::TokenStream;
