//! Reading book-source files from disk

mod processor;

use crate::config::compile_time::file_processing::{LARGE_FILE_THRESHOLD, MAX_FILE_SIZE};
use crate::logging::codes::{self, file_processing as fp};
use std::path::Path;

pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

/// Read `file_path` with default checks
pub fn process_file<P: AsRef<Path>>(file_path: P) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

pub fn init_file_processor_logging() -> Result<(), String> {
    codes::ensure_registered(
        "file processing",
        &[
            fp::FILE_NOT_FOUND,
            fp::INVALID_EXTENSION,
            fp::FILE_TOO_LARGE,
            fp::EMPTY_FILE,
            fp::PERMISSION_DENIED,
            fp::INVALID_ENCODING,
            fp::IO_ERROR,
            fp::INVALID_PATH,
            codes::success::FILE_PROCESSING_SUCCESS,
        ],
    )?;

    crate::log_debug!("File size limits",
        "max" => MAX_FILE_SIZE,
        "large" => LARGE_FILE_THRESHOLD
    );
    Ok(())
}
