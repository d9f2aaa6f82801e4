use super::entities::BookSource;
use super::error::SourceError;
use crate::config::compile_time::source::MAX_SOURCES_PER_FILE;
use crate::file_processor::{FileMetadata, FileProcessor};
use crate::logging::codes;
use crate::{log_debug, log_error, log_performance};
use serde_json::Value;
use std::path::Path;
use std::time::Instant;

/// Sources read from one file
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub sources: Vec<BookSource>,
    pub metadata: FileMetadata,
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_record(index: usize, value: Value) -> Result<BookSource, SourceError> {
    if !value.is_object() {
        return Err(SourceError::UnexpectedShape {
            found: format!("{} at index {}", shape_name(&value), index),
        });
    }
    serde_json::from_value(value).map_err(|e| SourceError::InvalidRecord {
        index,
        message: e.to_string(),
    })
}

/// Parse one book source object or an array of them
pub fn load_sources_from_str(json: &str) -> Result<Vec<BookSource>, SourceError> {
    let json = json.strip_prefix('\u{feff}').unwrap_or(json);
    let document: Value = serde_json::from_str(json)?;

    let records = match document {
        Value::Array(items) => items,
        Value::Object(_) => vec![document],
        other => {
            return Err(SourceError::UnexpectedShape {
                found: shape_name(&other).to_string(),
            })
        }
    };

    if records.len() > MAX_SOURCES_PER_FILE {
        return Err(SourceError::TooManySources {
            count: records.len(),
        });
    }

    records
        .into_iter()
        .enumerate()
        .map(|(index, value)| parse_record(index, value))
        .collect()
}

/// Read a file through `processor` and parse the sources in it
pub fn load_sources_with<P: AsRef<Path>>(
    processor: &FileProcessor,
    path: P,
) -> Result<SourceFile, SourceError> {
    let path = path.as_ref();
    let started = Instant::now();
    let file = processor.process_file(path)?;

    log_debug!("Parsing book sources",
        "file" => path.display(),
        "chars" => file.char_count()
    );

    let sources = load_sources_from_str(&file.source).map_err(|error| {
        log_error!(error.error_code(), &error.to_string(),
            "file" => path.display()
        );
        error
    })?;

    log_performance!(codes::success::SOURCES_LOADED,
        "Book sources loaded",
        duration = started.elapsed(),
        "file" => path.display(),
        "sources" => sources.len()
    );

    Ok(SourceFile {
        sources,
        metadata: file.metadata,
    })
}

/// Read and parse a book-source file with default file checks
pub fn load_sources_from_file<P: AsRef<Path>>(path: P) -> Result<SourceFile, SourceError> {
    load_sources_with(&FileProcessor::new(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_processor::FileProcessorError;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_single_object() {
        let sources = load_sources_from_str(r#"{"bookSourceName": "一"}"#).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "一");
    }

    #[test]
    fn test_array_and_bom() {
        let sources = load_sources_from_str(
            "\u{feff}[{\"bookSourceName\": \"a\"}, {\"bookSourceName\": \"b\", \"enabled\": false}]",
        )
        .unwrap();
        assert_eq!(sources.len(), 2);
        assert!(sources[0].enabled);
        assert!(!sources[1].enabled);
    }

    #[test]
    fn test_empty_array() {
        assert!(load_sources_from_str("[]").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json_reports_location() {
        let error = load_sources_from_str("{\n  \"bookSourceName\": }").unwrap_err();
        assert_matches!(error, SourceError::InvalidJson { line: 2, .. });
        assert_eq!(error.error_code(), codes::source::INVALID_JSON);
    }

    #[test]
    fn test_unexpected_shapes() {
        assert_matches!(
            load_sources_from_str("\"text\""),
            Err(SourceError::UnexpectedShape { .. })
        );
        let error = load_sources_from_str(r#"[{}, 3]"#).unwrap_err();
        assert_matches!(&error, SourceError::UnexpectedShape { found } if found.contains("index 1"));
        assert_eq!(error.error_code(), codes::source::UNEXPECTED_SHAPE);
    }

    #[test]
    fn test_invalid_record() {
        let error = load_sources_from_str(r#"[{"ruleToc": "not a group"}]"#).unwrap_err();
        assert_matches!(error, SourceError::InvalidRecord { index: 0, .. });
    }

    #[test]
    fn test_too_many_sources() {
        let json = format!("[{}]", vec!["{}"; MAX_SOURCES_PER_FILE + 1].join(","));
        assert_matches!(
            load_sources_from_str(&json),
            Err(SourceError::TooManySources { count }) if count == MAX_SOURCES_PER_FILE + 1
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"[{{"bookSourceName": "f", "ruleToc": {{"chapterList": "li"}}}}]"#).unwrap();

        let loaded = load_sources_from_file(file.path()).unwrap();
        assert_eq!(loaded.sources.len(), 1);
        assert_eq!(loaded.sources[0].rule_toc.chapter_list, "li");
        assert!(loaded.metadata.is_json_file);
    }

    #[test]
    fn test_file_errors_pass_through() {
        let error = load_sources_from_file("/definitely/not/here.json").unwrap_err();
        assert_matches!(error, SourceError::File(FileProcessorError::FileNotFound { .. }));
        assert_eq!(error.error_code(), codes::file_processing::FILE_NOT_FOUND);
    }
}
