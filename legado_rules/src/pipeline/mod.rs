//! Book-source analysis: file -> sources -> rule fields -> tokens -> rule types

mod error;
mod result;
mod validation;

pub use error::PipelineError;
pub use result::{PipelineResult, RuleFailure, RuleReport, SourceReport};
pub use validation::validate_pipeline;

use crate::classify::{classify_stream, ClassifyContext};
use crate::config::compile_time::source::MAX_RULE_FIELDS_PER_SOURCE;
use crate::config::runtime::{RuntimeConfig, SourcePreferences};
use crate::file_processor::FileProcessor;
use crate::lexical::{LexicalAnalyzer, TokenizeError, TokenizerKind};
use crate::logging::{self, codes};
use crate::source::{self, BookSource};
use crate::{log_debug, log_error, log_info, log_success, log_warning};
use std::path::PathBuf;
use std::time::Instant;

/// Classifier settings implied by source preferences
pub fn classify_context(preferences: &SourcePreferences) -> ClassifyContext {
    if preferences.group_classification {
        ClassifyContext::grouped()
    } else {
        ClassifyContext::flat(false, preferences.content_is_json)
    }
}

/// Tokenize and classify one rule string with default settings
pub fn analyze_rule(
    location: &str,
    kind: TokenizerKind,
    text: &str,
) -> Result<RuleReport, TokenizeError> {
    let context = classify_context(&SourcePreferences::default());
    analyze_rule_with(&mut LexicalAnalyzer::new(), context, location, kind, text)
}

pub fn analyze_rule_with(
    analyzer: &mut LexicalAnalyzer,
    context: ClassifyContext,
    location: &str,
    kind: TokenizerKind,
    text: &str,
) -> Result<RuleReport, TokenizeError> {
    let tokens = analyzer.tokenize_with(kind, text)?;
    let classified = classify_stream(&tokens[..], context);

    log_debug!("Rule classified",
        "location" => location,
        "tokenizer" => kind,
        "tokens" => classified.len()
    );

    Ok(RuleReport {
        location: location.to_string(),
        kind,
        rule: text.to_string(),
        tokens: classified,
    })
}

/// Analyze every rule field of one source with default settings
pub fn analyze_source(book_source: &BookSource) -> Result<SourceReport, PipelineError> {
    analyze_source_with(
        &mut LexicalAnalyzer::new(),
        &SourcePreferences::default(),
        book_source,
    )
}

/// Analyze one source; rejected rules land in the report's failures
pub fn analyze_source_with(
    analyzer: &mut LexicalAnalyzer,
    preferences: &SourcePreferences,
    book_source: &BookSource,
) -> Result<SourceReport, PipelineError> {
    let name = book_source.display_name();
    let mut report = SourceReport {
        name: name.to_string(),
        url: book_source.url.clone(),
        enabled: book_source.enabled,
        ..SourceReport::default()
    };

    if preferences.skip_disabled_sources && !book_source.enabled {
        log_warning!(codes::source::SOURCE_SKIPPED,
            "Skipping disabled book source",
            "source" => name
        );
        report.skipped = true;
        return Ok(report);
    }

    let fields = book_source.rule_fields();
    if fields.len() > MAX_RULE_FIELDS_PER_SOURCE {
        let error = PipelineError::TooManyRuleFields {
            source_name: name.to_string(),
            count: fields.len(),
        };
        log_error!(error.error_code(), &error.to_string(), "source" => name);
        return Err(error);
    }

    let context = classify_context(preferences);
    for field in &fields {
        match analyze_rule_with(analyzer, context, &field.location, field.kind, field.text) {
            Ok(rule) => report.rules.push(rule),
            Err(error) => {
                log_warning!(codes::pipeline::RULE_REJECTED,
                    "Rule rejected by tokenizer",
                    "source" => name,
                    "location" => &field.location,
                    "reason" => &error
                );
                report.failures.push(RuleFailure::new(&field.location, &error));
            }
        }
    }

    log_success!(codes::success::SOURCE_ANALYSIS_COMPLETE,
        "Book source analyzed",
        "source" => name,
        "rules" => report.rules.len(),
        "rejected" => report.failures.len(),
        "tokens" => report.token_count()
    );

    Ok(report)
}

/// Process a book-source file with default preferences
pub fn process_file(file_path: &str) -> Result<PipelineResult, PipelineError> {
    process_file_with_config(file_path, &RuntimeConfig::default())
}

/// Process a book-source file: read, load, then tokenize and classify every rule
pub fn process_file_with_config(
    file_path: &str,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(PathBuf::from(file_path), 0, || {
        log_info!("Starting book-source analysis", "file" => file_path);

        // Stage 1: read the file
        let file_result = FileProcessor::from_preferences(&config.file_processor)
            .process_file(file_path)?;

        // Stage 2: parse sources
        let sources = source::load_sources_from_str(&file_result.source).map_err(|error| {
            log_error!(error.error_code(), &error.to_string(), "file" => file_path);
            error
        })?;
        log_success!(codes::success::SOURCES_LOADED,
            "Book sources loaded",
            "file" => file_path,
            "sources" => sources.len()
        );

        // Stage 3: tokenize and classify
        let mut analyzer = LexicalAnalyzer::with_preferences(config.lexical.clone());
        let reports = sources
            .iter()
            .map(|book_source| analyze_source_with(&mut analyzer, &config.source, book_source))
            .collect::<Result<Vec<_>, _>>()?;

        let classified: usize = reports.iter().map(SourceReport::token_count).sum();
        log_success!(codes::success::CLASSIFICATION_COMPLETE,
            "Rule classification finished",
            "tokens" => classified,
            "grouped" => config.source.group_classification
        );
        analyzer.log_summary();

        let result = PipelineResult::new(
            file_result.metadata,
            reports,
            analyzer.metrics().clone(),
            start_time.elapsed(),
        );
        result.log_success(file_path);

        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RuleType;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"[
        {
            "bookSourceName": "甲",
            "bookSourceUrl": "https://a.example",
            "searchUrl": "/search?q={{key}}&page={{page}}",
            "ruleSearch": {"bookList": "class.list@tag.li", "name": "tag.a@text"},
            "ruleToc": {"chapterList": "$.chapters[*]", "chapterName": "$.title"}
        },
        {
            "bookSourceName": "乙",
            "enabled": false,
            "ruleContent": {"content": "@js:result.trim()"}
        }
    ]"#;

    fn sample_file() -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_validate_pipeline() {
        let _ = crate::logging::init_global_logging();
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        assert_matches!(&error, PipelineError::Pipeline { message } if message == "Test error");
        assert_eq!(error.error_code(), codes::pipeline::PIPELINE_FAILURE);
    }

    #[test]
    fn test_analyze_rule() {
        let report = analyze_rule("ruleSearch.name", TokenizerKind::Rule, "tag.a@text").unwrap();
        assert_eq!(report.tokens_text(), "tag.a@text");
        assert_eq!(report.tokens.len(), 3);
        assert_eq!(report.tokens[1].rule_type, RuleType::RuleSymbol);
    }

    #[test]
    fn test_analyze_source_lists_fields_in_order() {
        let sources = source::load_sources_from_str(SAMPLE).unwrap();
        let report = analyze_source(&sources[0]).unwrap();

        let locations: Vec<&str> = report.rules.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(
            locations,
            vec![
                "searchUrl",
                "ruleSearch.bookList",
                "ruleSearch.name",
                "ruleToc.chapterList",
                "ruleToc.chapterName",
            ]
        );
        assert_eq!(report.rules[0].kind, TokenizerKind::Url);
        assert!(report.is_clean());
        assert!(!report.skipped);
    }

    #[test]
    fn test_disabled_source_skipped_by_preference() {
        let sources = source::load_sources_from_str(SAMPLE).unwrap();
        let preferences = SourcePreferences {
            skip_disabled_sources: true,
            group_classification: false,
            content_is_json: false,
        };

        let report =
            analyze_source_with(&mut LexicalAnalyzer::new(), &preferences, &sources[1]).unwrap();
        assert!(report.skipped);
        assert!(report.rules.is_empty());

        let report = analyze_source(&sources[1]).unwrap();
        assert!(!report.skipped);
        assert_eq!(report.rules.len(), 1);
    }

    #[test]
    fn test_grouped_context_from_preferences() {
        let preferences = SourcePreferences {
            skip_disabled_sources: false,
            group_classification: true,
            content_is_json: false,
        };
        assert!(classify_context(&preferences).grouped);
    }

    #[test]
    fn test_rejected_rule_does_not_abort_source() {
        let long = "a".repeat(crate::config::compile_time::lexical::MAX_RULE_LENGTH + 1);
        let book_source = BookSource {
            name: "长".to_string(),
            search_url: long,
            rule_toc: crate::source::RuleToc {
                chapter_list: "li".to_string(),
                ..Default::default()
            },
            ..BookSource::default()
        };

        let report = analyze_source(&book_source).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].location, "searchUrl");
        assert_eq!(report.failures[0].code, codes::lexical::RULE_TOO_LONG.as_str());
        assert_eq!(report.rules.len(), 1);
    }

    #[test]
    fn test_process_file() {
        let file = sample_file();
        let path = file.path().to_string_lossy().to_string();

        let result = process_file(&path).unwrap();
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.total_rules(), 6);
        assert!(!result.has_failures());
        assert_eq!(result.lexical_metrics.rules_processed, 6);
        assert!(result.total_tokens() > 0);
    }

    #[test]
    fn test_process_file_reports_bad_json() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(b"{not json").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let error = process_file(&path).unwrap_err();
        assert_matches!(error, PipelineError::Source(crate::source::SourceError::InvalidJson { .. }));
    }

    #[test]
    fn test_process_missing_file() {
        assert_matches!(
            process_file("/no/such/sources.json"),
            Err(PipelineError::FileProcessing(_))
        );
    }
}
