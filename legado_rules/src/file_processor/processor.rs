//! Reads book-source files with size, encoding and extension checks

use crate::config::compile_time::file_processing::{LARGE_FILE_THRESHOLD, MAX_FILE_SIZE};
use crate::config::constants::SOURCE_FILE_EXTENSION;
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::{codes, Code};
use crate::{log_debug, log_error, log_performance, log_success};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("No such source file: {path}")]
    FileNotFound { path: String },

    #[error("Source files must end in .{SOURCE_FILE_EXTENSION}, got {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("Source file is {size} bytes, limit is {max_size}")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Source file has no content")]
    EmptyFile,

    #[error("Not allowed to read {path}")]
    PermissionDenied { path: String },

    #[error("{path} is not UTF-8 (first bad byte at offset {offset})")]
    InvalidEncoding { path: String, offset: usize },

    #[error("Reading failed: {message}")]
    IoError { message: String },

    #[error("Not a readable file path: {path:?}")]
    InvalidPath { path: String },
}

impl FileProcessorError {
    pub fn error_code(&self) -> Code {
        use codes::file_processing as fp;
        match self {
            Self::FileNotFound { .. } => fp::FILE_NOT_FOUND,
            Self::InvalidExtension { .. } => fp::INVALID_EXTENSION,
            Self::FileTooLarge { .. } => fp::FILE_TOO_LARGE,
            Self::EmptyFile => fp::EMPTY_FILE,
            Self::PermissionDenied { .. } => fp::PERMISSION_DENIED,
            Self::InvalidEncoding { .. } => fp::INVALID_ENCODING,
            Self::IoError { .. } => fp::IO_ERROR,
            Self::InvalidPath { .. } => fp::INVALID_PATH,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    fn from_io(error: &io::Error, path: &Path, action: &str) -> Self {
        let path_text = path.display().to_string();
        match error.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound { path: path_text },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path: path_text },
            _ => Self::IoError {
                message: format!("{action} {path_text}: {error}"),
            },
        }
    }
}

/// Logs `error` against the file being processed and hands it back.
fn reject(error: FileProcessorError, file: &str) -> FileProcessorError {
    log_error!(error.error_code(), &error.to_string(), "file" => file);
    error
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical file path
    pub path: PathBuf,
    pub size: u64,
    /// Lower-cased extension, if any
    pub extension: Option<String>,
    pub is_json_file: bool,
    pub modified: Option<SystemTime>,
}

impl FileMetadata {
    fn collect(path: PathBuf, fs_meta: &fs::Metadata) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        Self {
            is_json_file: extension.as_deref() == Some(SOURCE_FILE_EXTENSION),
            size: fs_meta.len(),
            modified: fs_meta.modified().ok(),
            extension,
            path,
        }
    }

    pub fn human_readable_size(&self) -> String {
        human_size(self.size)
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

fn human_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    match bytes {
        b if b < KIB => format!("{b} B"),
        b if b < KIB * KIB => format!("{:.2} KB", b as f64 / KIB as f64),
        b if b < KIB * KIB * KIB => format!("{:.2} MB", b as f64 / (KIB * KIB) as f64),
        b => format!("{:.2} GB", b as f64 / (KIB * KIB * KIB) as f64),
    }
}

/// File contents plus what was learned while reading them
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    pub fn is_effectively_empty(&self) -> bool {
        self.source.trim().is_empty()
    }
}

pub struct FileProcessor {
    pub require_json_extension: bool,
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_json_extension: false,
            enable_performance_logging: true,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self::new()
            .with_json_extension_required(prefs.require_json_extension)
            .with_performance_logging(prefs.enable_performance_logging)
    }

    pub fn with_json_extension_required(mut self, required: bool) -> Self {
        self.require_json_extension = required;
        self
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    /// Resolves, checks and reads `file_path` into memory.
    pub fn process_file<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let started = Instant::now();
        let file_path = file_path.as_ref();
        let shown = file_path.display().to_string();
        log_debug!("Reading source file", "file" => shown);

        let path = resolve(file_path).map_err(|e| reject(e, &shown))?;
        let fs_meta = fs::metadata(&path)
            .map_err(|e| reject(FileProcessorError::from_io(&e, &path, "stat"), &shown))?;
        let metadata = FileMetadata::collect(path, &fs_meta);
        self.check(&metadata).map_err(|e| reject(e, &shown))?;

        let bytes = fs::read(&metadata.path)
            .map_err(|e| reject(FileProcessorError::from_io(&e, &metadata.path, "read"), &shown))?;
        let source = String::from_utf8(bytes).map_err(|e| {
            let offset = e.utf8_error().valid_up_to();
            reject(FileProcessorError::InvalidEncoding { path: shown.clone(), offset }, &shown)
        })?;

        let result = FileProcessingResult {
            source,
            metadata,
            processing_duration: started.elapsed(),
        };
        self.report(&result, &shown);
        Ok(result)
    }

    /// Limits applied once the file is known to exist.
    fn check(&self, metadata: &FileMetadata) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            return Err(FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            });
        }
        if metadata.size == 0 {
            return Err(FileProcessorError::EmptyFile);
        }
        if self.require_json_extension && !metadata.is_json_file {
            return Err(FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            });
        }
        Ok(())
    }

    fn report(&self, result: &FileProcessingResult, file: &str) {
        let meta = &result.metadata;
        if !self.enable_performance_logging {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Source file read",
                "file" => file,
                "size_bytes" => meta.size
            );
            return;
        }
        log_performance!(codes::success::FILE_PROCESSING_SUCCESS, "Source file read",
            duration = result.processing_duration,
            "file" => file,
            "size" => meta.human_readable_size(),
            "chars" => result.char_count(),
            "large" => meta.is_large_file()
        );
    }
}

fn resolve(path: &Path) -> Result<PathBuf, FileProcessorError> {
    if path.as_os_str().is_empty() {
        return Err(FileProcessorError::InvalidPath {
            path: String::new(),
        });
    }
    let shown = || path.display().to_string();
    if !path.exists() {
        return Err(FileProcessorError::FileNotFound { path: shown() });
    }
    if !path.is_file() {
        return Err(FileProcessorError::InvalidPath { path: shown() });
    }
    path.canonicalize()
        .map_err(|e| FileProcessorError::from_io(&e, path, "resolve"))
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_process_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("sources.json");
        let content = r#"[{"bookSourceName":"书源"}]"#;
        fs::write(&file_path, content).unwrap();

        let result = FileProcessor::new().process_file(&file_path).unwrap();

        assert!(result.metadata.is_json_file);
        assert_eq!(result.metadata.extension.as_deref(), Some("json"));
        assert_eq!(result.char_count(), content.chars().count());
        assert!(!result.is_effectively_empty());
    }

    #[test]
    fn test_file_not_found() {
        let dir = tempdir().unwrap();
        let result = FileProcessor::new().process_file(dir.path().join("missing.json"));
        assert_matches!(result, Err(FileProcessorError::FileNotFound { .. }));
    }

    #[test]
    fn test_directory_is_invalid_path() {
        let dir = tempdir().unwrap();
        let result = FileProcessor::new().process_file(dir.path());
        assert_matches!(result, Err(FileProcessorError::InvalidPath { .. }));
    }

    #[test]
    fn test_empty_path() {
        let result = FileProcessor::new().process_file("");
        assert_matches!(result, Err(FileProcessorError::InvalidPath { .. }));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("empty.json");
        fs::write(&file_path, "").unwrap();

        let result = FileProcessor::new().process_file(&file_path);
        assert_matches!(result, Err(FileProcessorError::EmptyFile));
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("sources.txt");
        fs::write(&file_path, "{}").unwrap();

        let lenient = FileProcessor::new().process_file(&file_path);
        assert!(lenient.is_ok());

        let strict = FileProcessor::new()
            .with_json_extension_required(true)
            .process_file(&file_path);
        assert_matches!(
            strict,
            Err(FileProcessorError::InvalidExtension { extension: Some(ext) }) if ext == "txt"
        );
    }

    #[test]
    fn test_uppercase_extension_accepted() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("SOURCES.JSON");
        fs::write(&file_path, "{}").unwrap();

        let processor = FileProcessor::new().with_json_extension_required(true);
        assert!(processor.process_file(&file_path).is_ok());
    }

    #[test]
    fn test_invalid_utf8() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bad.json");
        fs::write(&file_path, [0x7b, 0xff, 0xfe, 0x7d]).unwrap();

        let result = FileProcessor::new().process_file(&file_path);
        assert_matches!(result, Err(FileProcessorError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_error_codes() {
        let error = FileProcessorError::FileNotFound {
            path: "x.json".to_string(),
        };
        assert_eq!(error.error_code().as_str(), "E005");
        assert_eq!(error.category(), "FileProcessing");
        assert_eq!(FileProcessorError::EmptyFile.error_code().as_str(), "E008");
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.00 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_from_preferences() {
        let prefs = FileProcessorPreferences {
            require_json_extension: true,
            enable_performance_logging: false,
        };
        let processor = FileProcessor::from_preferences(&prefs);
        assert!(processor.require_json_extension);
        assert!(!processor.enable_performance_logging);
    }
}
