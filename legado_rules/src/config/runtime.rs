//! Runtime preferences
//!
//! Read from an optional TOML file, then overridden by `LEGADO_*`
//! environment variables. Unlike the compile-time limits these only change
//! behavior, never the limits enforced on input.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

pub use crate::logging::events::LogLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Reject source files that do not end in `.json`
    pub require_json_extension: bool,
    /// Log read timings with the success event
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_json_extension: false,
            enable_performance_logging: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Count marker usage per marker
    pub collect_detailed_metrics: bool,
    /// Emit a debug event for every unterminated block
    pub log_unterminated_blocks: bool,
    /// Quote the offending rule in error events
    pub include_rule_in_errors: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: true,
            log_unterminated_blocks: false,
            include_rule_in_errors: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePreferences {
    /// Skip sources whose `enabled` flag is false
    pub skip_disabled_sources: bool,
    /// Use the grouped classifier instead of the flat one
    pub group_classification: bool,
    /// Treat fetched content as JSON when classifying flat rules
    pub content_is_json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Write console events as JSON lines
    pub use_structured_logging: bool,
    pub enable_console_logging: bool,
    pub min_log_level: LogLevel,
    /// Print the per-file diagnostics report at the end of a run
    pub enable_cargo_style_output: bool,
    /// Tag events with the file being processed
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: false,
            enable_console_logging: false,
            min_log_level: LogLevel::Info,
            enable_cargo_style_output: true,
            include_file_context: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeConfigError {
    #[error("cannot read {path}: {message}")]
    Read { path: String, message: String },

    #[error("{path} is not a valid preferences file: {message}")]
    Parse { path: String, message: String },

    #[error("{name}={value} is not a valid setting")]
    Env { name: String, value: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub source: SourcePreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Omitted tables and keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, RuntimeConfigError> {
        let shown = || path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| RuntimeConfigError::Read {
            path: shown(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| RuntimeConfigError::Parse {
            path: shown(),
            message: e.to_string(),
        })
    }

    /// Preferences from `path` (or defaults) with environment overrides applied
    pub fn load(path: Option<&Path>) -> Result<Self, RuntimeConfigError> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| env::var(name).ok())?;
        Ok(config)
    }

    /// Apply every override `lookup` has a value for
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), RuntimeConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        use env_vars::*;

        let files = &mut self.file_processor;
        set(&lookup, REQUIRE_JSON_EXTENSION, &mut files.require_json_extension)?;
        set(&lookup, ENABLE_PERFORMANCE_LOGGING, &mut files.enable_performance_logging)?;

        let lexical = &mut self.lexical;
        set(&lookup, LEXICAL_DETAILED_METRICS, &mut lexical.collect_detailed_metrics)?;
        set(&lookup, LEXICAL_LOG_UNTERMINATED, &mut lexical.log_unterminated_blocks)?;
        set(&lookup, LEXICAL_INCLUDE_RULE, &mut lexical.include_rule_in_errors)?;

        let source = &mut self.source;
        set(&lookup, SOURCE_SKIP_DISABLED, &mut source.skip_disabled_sources)?;
        set(&lookup, SOURCE_GROUP_CLASSIFICATION, &mut source.group_classification)?;
        set(&lookup, SOURCE_CONTENT_IS_JSON, &mut source.content_is_json)?;

        let logging = &mut self.logging;
        set(&lookup, LOGGING_USE_STRUCTURED, &mut logging.use_structured_logging)?;
        set(&lookup, LOGGING_ENABLE_CONSOLE, &mut logging.enable_console_logging)?;
        set(&lookup, LOGGING_MIN_LEVEL, &mut logging.min_log_level)?;
        set(&lookup, LOGGING_CARGO_STYLE, &mut logging.enable_cargo_style_output)?;
        set(&lookup, LOGGING_INCLUDE_FILE_CONTEXT, &mut logging.include_file_context)
    }
}

fn set<F, T>(lookup: &F, name: &str, slot: &mut T) -> Result<(), RuntimeConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(value) = lookup(name) else {
        return Ok(());
    };
    *slot = value.trim().parse().map_err(|_| RuntimeConfigError::Env {
        name: name.to_string(),
        value,
    })?;
    Ok(())
}

/// Environment variables consulted by [`RuntimeConfig::load`]
pub mod env_vars {
    pub const REQUIRE_JSON_EXTENSION: &str = "LEGADO_REQUIRE_JSON_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "LEGADO_ENABLE_PERFORMANCE_LOGGING";

    pub const LEXICAL_DETAILED_METRICS: &str = "LEGADO_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_LOG_UNTERMINATED: &str = "LEGADO_LEXICAL_LOG_UNTERMINATED";
    pub const LEXICAL_INCLUDE_RULE: &str = "LEGADO_LEXICAL_INCLUDE_RULE";

    pub const SOURCE_SKIP_DISABLED: &str = "LEGADO_SOURCE_SKIP_DISABLED";
    pub const SOURCE_GROUP_CLASSIFICATION: &str = "LEGADO_SOURCE_GROUP_CLASSIFICATION";
    pub const SOURCE_CONTENT_IS_JSON: &str = "LEGADO_SOURCE_CONTENT_IS_JSON";

    pub const LOGGING_USE_STRUCTURED: &str = "LEGADO_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "LEGADO_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "LEGADO_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "LEGADO_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "LEGADO_LOGGING_INCLUDE_FILE_CONTEXT";
}
