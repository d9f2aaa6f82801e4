//! Stateful tokenizer front end with metrics and logging

use super::error::{TokenizeError, TokenizerKind};
use super::state::{LexStats, Lexed};
use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::TokenStream;
use crate::{log_debug, log_error, log_performance, log_warning};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

const RULE_PREVIEW_CHARS: usize = 80;

/// Totals across every rule an analyzer has tokenized
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub rules_processed: usize,
    pub failures: usize,
    pub total_tokens: usize,
    pub marker_tokens: usize,
    pub blocks_captured: usize,
    pub unterminated_blocks: usize,
    pub max_stack_depth: usize,
    pub max_brace_depth: usize,
    pub per_kind: BTreeMap<TokenizerKind, usize>,
    pub processing_time: Duration,

    // Only filled when detailed metrics are enabled
    pub marker_usage: BTreeMap<String, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_run(
        &mut self,
        kind: TokenizerKind,
        stats: &LexStats,
        preferences: &LexicalPreferences,
    ) {
        self.rules_processed += 1;
        *self.per_kind.entry(kind).or_insert(0) += 1;
        self.total_tokens += stats.tokens;
        self.marker_tokens += stats.markers;
        self.blocks_captured += stats.blocks_captured;
        self.unterminated_blocks += stats.unterminated_blocks;
        self.max_stack_depth = self.max_stack_depth.max(stats.max_stack_depth);
        self.max_brace_depth = self.max_brace_depth.max(stats.max_brace_depth);

        if preferences.collect_detailed_metrics && self.marker_usage.len() < METRICS_BUFFER_SIZE {
            for (marker, count) in &stats.marker_usage {
                *self.marker_usage.entry(marker.clone()).or_insert(0) += count;
            }
        }
    }

    pub(crate) fn record_failure(&mut self, kind: TokenizerKind) {
        self.rules_processed += 1;
        self.failures += 1;
        *self.per_kind.entry(kind).or_insert(0) += 1;
    }

    /// Most used markers, highest count first
    pub fn top_markers(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut markers: Vec<(&str, usize)> = self
            .marker_usage
            .iter()
            .map(|(marker, count)| (marker.as_str(), *count))
            .collect();
        markers.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        markers.truncate(limit);
        markers
    }
}

/// Runs the tokenizer family and keeps metrics across calls
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn reset_metrics(&mut self) {
        self.metrics = LexicalMetrics::default();
    }

    pub fn tokenize(&mut self, text: &str) -> Result<TokenStream, TokenizeError> {
        self.tokenize_with(TokenizerKind::Rule, text)
    }

    pub fn tokenize_url(&mut self, text: &str) -> Result<TokenStream, TokenizeError> {
        self.tokenize_with(TokenizerKind::Url, text)
    }

    pub fn tokenize_inner(&mut self, text: &str) -> Result<TokenStream, TokenizeError> {
        self.tokenize_with(TokenizerKind::Inner, text)
    }

    pub fn split_page(&mut self, text: &str) -> Result<TokenStream, TokenizeError> {
        self.tokenize_with(TokenizerKind::Page, text)
    }

    pub fn tokenize_with(
        &mut self,
        kind: TokenizerKind,
        text: &str,
    ) -> Result<TokenStream, TokenizeError> {
        let started = Instant::now();
        log_debug!("Starting tokenization",
            "tokenizer" => kind,
            "chars" => text.chars().count(),
            "max_tokens" => MAX_TOKEN_COUNT
        );

        let result = super::lex(kind, text);
        self.metrics.processing_time += started.elapsed();

        match result {
            Ok(Lexed { tokens, stats }) => {
                self.metrics.record_run(kind, &stats, &self.preferences);

                if stats.unterminated_blocks > 0 && self.preferences.log_unterminated_blocks {
                    log_warning!(codes::lexical::UNTERMINATED_BLOCK,
                        "Block runs to end of rule",
                        "tokenizer" => kind,
                        "count" => stats.unterminated_blocks,
                        "rule" => rule_preview(text)
                    );
                }

                log_debug!("Tokenization complete",
                    "tokenizer" => kind,
                    "tokens" => tokens.len(),
                    "blocks" => stats.blocks_captured,
                    "max_stack_depth" => stats.max_stack_depth
                );
                Ok(tokens)
            }
            Err(error) => {
                self.metrics.record_failure(kind);
                self.log_failure(&error, text);
                Err(error)
            }
        }
    }

    fn log_failure(&self, error: &TokenizeError, text: &str) {
        let message = format!("Tokenizing failed: {}", error);
        if self.preferences.include_rule_in_errors {
            log_error!(error.error_code(), &message,
                position = error.position(),
                "tokenizer" => error.kind,
                "rule" => rule_preview(text)
            );
        } else {
            log_error!(error.error_code(), &message,
                position = error.position(),
                "tokenizer" => error.kind
            );
        }
    }

    /// Report the accumulated metrics as one success event
    pub fn log_summary(&self) {
        let metrics = &self.metrics;
        log_performance!(codes::success::TOKENIZATION_COMPLETE,
            "Tokenization finished",
            duration = metrics.processing_time,
            "rules" => metrics.rules_processed,
            "failures" => metrics.failures,
            "tokens" => metrics.total_tokens,
            "blocks" => metrics.blocks_captured,
            "unterminated_blocks" => metrics.unterminated_blocks
        );
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// First characters of a rule, for log context
pub(crate) fn rule_preview(text: &str) -> String {
    let mut preview: String = text.chars().take(RULE_PREVIEW_CHARS).collect();
    if text.chars().nth(RULE_PREVIEW_CHARS).is_some() {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preferences(detailed: bool) -> LexicalPreferences {
        LexicalPreferences {
            collect_detailed_metrics: detailed,
            log_unterminated_blocks: true,
            include_rule_in_errors: true,
        }
    }

    #[test]
    fn test_metrics_accumulate_across_rules() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences(true));

        analyzer.tokenize("a@b@c").unwrap();
        analyzer.tokenize_url("p<1,2>").unwrap();
        analyzer.split_page("1,2").unwrap();

        let metrics = analyzer.metrics();
        assert_eq!(metrics.rules_processed, 3);
        assert_eq!(metrics.failures, 0);
        assert_eq!(metrics.total_tokens, 5 + 3 + 2);
        assert_eq!(metrics.blocks_captured, 1);
        assert_eq!(metrics.per_kind.get(&TokenizerKind::Rule), Some(&1));
        assert_eq!(metrics.top_markers(1), vec![("@", 2)]);
    }

    #[test]
    fn test_marker_usage_is_optional() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences(false));
        analyzer.tokenize("a@css:b").unwrap();

        assert_eq!(analyzer.metrics().marker_tokens, 1);
        assert!(analyzer.metrics().marker_usage.is_empty());
    }

    #[test]
    fn test_unterminated_blocks_are_counted() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences(false));
        let tokens = analyzer.tokenize("{{open").unwrap();

        assert_eq!(tokens, ["{{", "{{open"]);
        assert_eq!(analyzer.metrics().unterminated_blocks, 1);
    }

    #[test]
    fn test_failure_is_recorded() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences(false));
        let deep = "{a".repeat(MAX_NESTING_DEPTH + 1);

        assert!(analyzer.tokenize_inner(&deep).is_err());
        assert_eq!(analyzer.metrics().failures, 1);

        analyzer.reset_metrics();
        assert_eq!(analyzer.metrics().rules_processed, 0);
    }

    #[test]
    fn test_rule_preview_truncates() {
        assert_eq!(rule_preview("short"), "short");
        let long = "x".repeat(RULE_PREVIEW_CHARS + 5);
        assert!(rule_preview(&long).ends_with("..."));
        assert_eq!(rule_preview(&long).chars().count(), RULE_PREVIEW_CHARS + 3);
    }
}
