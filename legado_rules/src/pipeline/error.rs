use crate::config::compile_time::source::MAX_RULE_FIELDS_PER_SOURCE;
use crate::file_processor::FileProcessorError;
use crate::lexical::TokenizeError;
use crate::logging::{codes, Code};
use crate::source::SourceError;

/// Anything that stops a file from being analyzed
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    FileProcessing(#[from] FileProcessorError),

    #[error("cannot load sources: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error("source '{source_name}' declares {count} rules, more than {MAX_RULE_FIELDS_PER_SOURCE}")]
    TooManyRuleFields { source_name: String, count: usize },

    #[error("{message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: impl Into<String>) -> Self {
        Self::Pipeline {
            message: message.into(),
        }
    }

    /// The code of the underlying stage error
    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(inner) => inner.error_code(),
            Self::Source(inner) => inner.error_code(),
            Self::Tokenize(inner) => inner.error_code(),
            Self::TooManyRuleFields { .. } => codes::source::TOO_MANY_RULE_FIELDS,
            Self::Pipeline { .. } => codes::pipeline::PIPELINE_FAILURE,
        }
    }
}
