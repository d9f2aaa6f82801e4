//! Logging settings
//!
//! Buffer limits come from the build profile. Level and output format come
//! from runtime preferences, installed once at startup or read from the
//! environment on first use.

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

static PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences. Fails if they were already installed or read.
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime logging preferences already initialized".to_string())
}

fn preferences() -> &'static LoggingPreferences {
    PREFERENCES.get_or_init(LoggingPreferences::default)
}

/// Effective minimum level, never below the build profile's floor
pub fn get_min_log_level() -> LogLevel {
    preferences()
        .min_log_level
        .max(get_security_log_level())
}

pub fn get_security_log_level() -> LogLevel {
    match SECURITY_MIN_LOG_LEVEL {
        0 => LogLevel::Error,
        1 => LogLevel::Warning,
        _ => LogLevel::Info,
    }
}

pub fn use_structured_logging() -> bool {
    preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    preferences().enable_console_logging
}

pub fn use_cargo_style_output() -> bool {
    preferences().enable_cargo_style_output
}

pub fn include_file_context() -> bool {
    preferences().include_file_context
}

pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE < 100 {
        return Err(format!("Log buffer size too small: {}", LOG_BUFFER_SIZE));
    }
    if MAX_LOG_EVENTS_PER_FILE > LOG_BUFFER_SIZE {
        return Err("Max log events per file exceeds total buffer size".to_string());
    }
    if MAX_ERROR_COLLECTION == 0 || MAX_LOG_MESSAGE_LENGTH == 0 {
        return Err("Error collection and message limits must be non-zero".to_string());
    }
    Ok(())
}

pub fn get_config_summary() -> String {
    let preferences = preferences();
    let lines = [
        "Logging Configuration:".to_string(),
        format!("  log buffer size: {}", LOG_BUFFER_SIZE),
        format!("  max events per file: {}", MAX_LOG_EVENTS_PER_FILE),
        format!("  max message length: {}", MAX_LOG_MESSAGE_LENGTH),
        format!("  max collected errors: {}", MAX_ERROR_COLLECTION),
        format!("  level floor: {}", get_security_log_level().as_str()),
        format!("  min log level: {}", preferences.min_log_level.as_str()),
        format!("  console: {}", preferences.enable_console_logging),
        format!("  structured: {}", preferences.use_structured_logging),
        format!("  cargo-style summary: {}", preferences.enable_cargo_style_output),
    ];
    lines.join("\n")
}

/// Console debug output, used by the CLI's `--verbose`
pub fn verbose_preferences() -> LoggingPreferences {
    LoggingPreferences {
        use_structured_logging: false,
        enable_console_logging: true,
        min_log_level: LogLevel::Debug,
        enable_cargo_style_output: true,
        include_file_context: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_min_level_respects_floor() {
        assert!(get_min_log_level() >= get_security_log_level());
    }

    #[test]
    fn test_summary_mentions_buffers() {
        let summary = get_config_summary();
        assert!(summary.starts_with("Logging Configuration:"));
        assert!(summary.contains("log buffer size"));
        assert!(summary.contains("min log level"));
    }

    #[test]
    fn test_verbose_preferences() {
        let prefs = verbose_preferences();
        assert!(prefs.enable_console_logging);
        assert_eq!(prefs.min_log_level, LogLevel::Debug);
    }
}
