use crate::classify::{type_histogram, ClassifiedToken, RuleType};
use crate::file_processor::FileMetadata;
use crate::lexical::{LexicalMetrics, TokenizeError, TokenizerKind};
use crate::logging::codes;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// One rule string after tokenizing and classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub location: String,
    pub kind: TokenizerKind,
    pub rule: String,
    pub tokens: Vec<ClassifiedToken>,
}

impl RuleReport {
    /// Tokens joined back together
    pub fn tokens_text(&self) -> String {
        self.tokens.iter().map(|t| t.token.as_str()).collect()
    }
}

/// A rule the tokenizer rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleFailure {
    pub location: String,
    pub kind: TokenizerKind,
    pub code: String,
    pub message: String,
    pub position: usize,
}

impl RuleFailure {
    pub fn new(location: &str, error: &TokenizeError) -> Self {
        Self {
            location: location.to_string(),
            kind: error.kind,
            code: error.error_code().as_str().to_string(),
            message: error.to_string(),
            position: error.position(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub name: String,
    pub url: String,
    pub enabled: bool,
    /// Disabled and skipped by preference
    pub skipped: bool,
    pub rules: Vec<RuleReport>,
    pub failures: Vec<RuleFailure>,
}

impl SourceReport {
    pub fn token_count(&self) -> usize {
        self.rules.iter().map(|rule| rule.tokens.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn type_histogram(&self) -> BTreeMap<RuleType, usize> {
        let mut histogram = BTreeMap::new();
        for rule in &self.rules {
            for (rule_type, count) in type_histogram(&rule.tokens) {
                *histogram.entry(rule_type).or_insert(0) += count;
            }
        }
        histogram
    }
}

/// Everything learned from one book-source file
#[derive(Debug)]
pub struct PipelineResult {
    pub file_metadata: FileMetadata,
    pub sources: Vec<SourceReport>,
    pub lexical_metrics: LexicalMetrics,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn new(
        file_metadata: FileMetadata,
        sources: Vec<SourceReport>,
        lexical_metrics: LexicalMetrics,
        processing_duration: Duration,
    ) -> Self {
        Self {
            file_metadata,
            sources,
            lexical_metrics,
            processing_duration,
        }
    }

    pub fn total_rules(&self) -> usize {
        self.sources.iter().map(|source| source.rules.len()).sum()
    }

    pub fn total_failures(&self) -> usize {
        self.sources.iter().map(|source| source.failures.len()).sum()
    }

    pub fn total_tokens(&self) -> usize {
        self.sources.iter().map(SourceReport::token_count).sum()
    }

    pub fn skipped_sources(&self) -> usize {
        self.sources.iter().filter(|source| source.skipped).count()
    }

    pub fn has_failures(&self) -> bool {
        self.total_failures() > 0
    }

    pub fn log_success(&self, file_path: &str) {
        let seconds = self.processing_duration.as_secs_f64();
        crate::log_performance!(
            codes::success::PIPELINE_COMPLETE,
            "Book-source file analysis succeeded",
            duration = self.processing_duration,
            "file" => file_path,
            "sources" => self.sources.len(),
            "skipped" => self.skipped_sources(),
            "rules" => self.total_rules(),
            "rejected_rules" => self.total_failures(),
            "processing_rate_bytes_per_sec" => format!("{:.0}",
                self.file_metadata.size as f64 / seconds.max(f64::EPSILON))
        );
    }
}
