use crate::config::compile_time::source::MAX_SOURCES_PER_FILE;
use crate::file_processor::FileProcessorError;
use crate::logging::{codes, Code};

#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("Invalid JSON at line {line}, column {column}: {message}")]
    InvalidJson {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Expected a book source object or an array of them, found {found}")]
    UnexpectedShape { found: String },

    #[error("Source #{index} is not a valid book source: {message}")]
    InvalidRecord { index: usize, message: String },

    #[error("File holds {count} sources (max {MAX_SOURCES_PER_FILE})")]
    TooManySources { count: usize },

    #[error(transparent)]
    File(#[from] FileProcessorError),
}

impl SourceError {
    pub fn error_code(&self) -> Code {
        match self {
            SourceError::InvalidJson { .. } | SourceError::InvalidRecord { .. } => {
                codes::source::INVALID_JSON
            }
            SourceError::UnexpectedShape { .. } => codes::source::UNEXPECTED_SHAPE,
            SourceError::TooManySources { .. } => codes::source::TOO_MANY_SOURCES,
            SourceError::File(error) => error.error_code(),
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(error: serde_json::Error) -> Self {
        SourceError::InvalidJson {
            message: error.to_string(),
            line: error.line(),
            column: error.column(),
        }
    }
}
