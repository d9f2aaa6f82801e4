//! Global logging for the rule tokenizer
//!
//! A process-wide logging service and error collector, per-thread file
//! context, and the helpers the logging macros expand to.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

pub use codes::Code;
pub use collector::{ErrorCollector, FileProcessingContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleFormat, ConsoleLogger, Logger, LoggingService, MemoryLogger, MultiLogger};

/// Key/value pairs attached to an event by the logging macros
pub type Context<'a> = [(&'a str, &'a str)];

struct Globals {
    service: Arc<LoggingService>,
    collector: ErrorCollector,
}

static GLOBALS: OnceLock<Globals> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileProcessingContext>> = const { RefCell::new(None) };
}

/// Every stage logs at least one of these; startup refuses to continue without their metadata
const REQUIRED_CODES: [Code; 5] = [
    codes::system::INTERNAL_ERROR,
    codes::file_processing::FILE_NOT_FOUND,
    codes::lexical::RULE_TOO_LONG,
    codes::source::INVALID_JSON,
    codes::pipeline::PIPELINE_FAILURE,
];

/// Initialize global logging from the runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("invalid logging configuration: {e}"))?;

    if let Some(missing) = REQUIRED_CODES.iter().find(|code| !codes::is_registered(**code)) {
        return Err(format!("code {missing} has no registered metadata"));
    }

    let service = Arc::new(service::create_configured_service());
    install(Arc::clone(&service))?;
    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Logging ready",
    ));
    Ok(())
}

fn install(service: Arc<LoggingService>) -> Result<(), String> {
    let globals = Globals {
        service,
        collector: ErrorCollector::new(),
    };
    GLOBALS
        .set(globals)
        .map_err(|_| "logging is already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBALS.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBALS.get().map(|globals| globals.service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBALS.get().map(|globals| &globals.collector)
}

// ============================================================================
// FILE CONTEXT
// ============================================================================

/// Clears the thread's file context when dropped
#[must_use = "the file context is cleared as soon as the guard is dropped"]
pub struct FileContextGuard(());

impl Drop for FileContextGuard {
    fn drop(&mut self) {
        clear_file_context();
    }
}

/// Attribute this thread's coded events to `file_path` until the guard drops
pub fn enter_file_context(file_path: PathBuf, file_id: usize) -> FileContextGuard {
    let context = FileProcessingContext::new(file_path, file_id);
    if let Some(collector) = try_get_global_error_collector() {
        collector.record_file_context(context.clone());
    }
    FILE_CONTEXT.with(|slot| *slot.borrow_mut() = Some(context));
    FileContextGuard(())
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|slot| slot.borrow_mut().take());
}

/// Run `f` with `file_path` as this thread's file context
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = enter_file_context(file_path, file_id);
    f()
}

pub fn get_current_file_context() -> Option<FileProcessingContext> {
    FILE_CONTEXT.with(|slot| slot.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT
// ============================================================================

fn build_event(mut event: LogEvent, context: &Context) -> LogEvent {
    let max_len = config::get_max_log_message_length();
    if let Some((cut, _)) = event.message.char_indices().nth(max_len) {
        event.message.truncate(cut);
    }

    event = context
        .iter()
        .fold(event, |event, (key, value)| event.with_context(key, value));

    match get_current_file_context() {
        Some(file) if config::include_file_context() => event
            .with_context("file", &file.file_path.display().to_string())
            .with_context("file_id", &file.file_id.to_string()),
        _ => event,
    }
}

/// Errors and warnings are also kept per file for the end-of-run report
fn dispatch(event: LogEvent) {
    let Some(globals) = GLOBALS.get() else {
        return;
    };
    if event.is_error() || event.is_warning() {
        if let Some(file) = get_current_file_context() {
            globals.collector.record_event(&file.file_path, event.clone());
        }
    }
    globals.service.log_event(event);
}

/// Used by `log_error!`
pub fn log_error_with_context(code: Code, message: &str, position: Option<usize>, context: &Context) {
    let event = build_event(LogEvent::error(code, message), context);
    dispatch(match position {
        Some(position) => event.with_position(position),
        None => event,
    });
}

/// Used by `log_warning!`
pub fn log_warning_with_context(code: Code, message: &str, context: &Context) {
    dispatch(build_event(LogEvent::warning_with_code(code, message), context));
}

/// Used by `log_success!` and `log_performance!`
pub fn log_success_with_context(code: Code, message: &str, context: &Context) {
    dispatch(build_event(LogEvent::success(code, message), context));
}

/// `duration_ms` value written by `log_performance!`
pub fn duration_ms(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64() * 1000.0)
}

/// Used by `log_info!`
pub fn log_info_with_context(message: &str, context: &Context) {
    dispatch(build_event(LogEvent::info(message), context));
}

/// Used by `log_debug!`
pub fn log_debug_with_context(message: &str, context: &Context) {
    dispatch(build_event(LogEvent::debug(message), context));
}

// ============================================================================
// REPORTING
// ============================================================================

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(ErrorCollector::get_summary)
        .unwrap_or_default()
}

/// Print collected diagnostics, cargo style, when that output is enabled
pub fn print_cargo_style_summary() {
    let Some(collector) = try_get_global_error_collector() else {
        return;
    };
    if config::use_cargo_style_output() {
        let report = collector::format_cargo_style_errors(collector);
        if !report.is_empty() {
            eprint!("{report}");
        }
    }
}

/// Error logging that falls back to stderr before initialization
pub fn safe_log_error(code: Code, message: &str) {
    match try_get_global_logger() {
        Some(logger) => logger.log_event(LogEvent::error(code, message)),
        None => eprintln!("error[{code}]: {message}"),
    }
}

pub fn get_system_diagnostics() -> String {
    let mut out = String::from("Logging diagnostics\n");
    let _ = writeln!(out, "  initialized: {}", is_initialized());
    if let Some(collector) = try_get_global_error_collector() {
        let (held, capacity, fill) = collector.get_capacity_info();
        let _ = writeln!(out, "  collected events: {held}/{capacity} ({:.1}%)", fill * 100.0);
    }
    out.push('\n');
    out.push_str(&config::get_config_summary());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_clears_file_context() {
        let file_path = PathBuf::from("sources.json");
        clear_file_context();

        {
            let _guard = enter_file_context(file_path.clone(), 1);
            assert_eq!(get_current_file_context().unwrap().file_path, file_path);
        }

        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_with_file_context() {
        let result = with_file_context(PathBuf::from("other.json"), 2, || {
            assert_eq!(get_current_file_context().unwrap().file_id, 2);
            42
        });

        assert_eq!(result, 42);
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_file_context_cleared_after_panic() {
        let outcome = std::panic::catch_unwind(|| {
            with_file_context(PathBuf::from("panics.json"), 3, || panic!("boom"))
        });

        assert!(outcome.is_err());
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_build_event_truncates_long_messages() {
        let max_len = config::get_max_log_message_length();
        let long = "书".repeat(max_len + 10);
        let event = build_event(LogEvent::info(&long), &[("k", "v")]);

        assert_eq!(event.message.chars().count(), max_len);
        assert_eq!(event.context.get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn test_safe_logging_never_panics() {
        safe_log_error(codes::system::INTERNAL_ERROR, "Test error");
    }

    #[test]
    fn test_diagnostics() {
        let diagnostics = get_system_diagnostics();
        assert!(diagnostics.contains("Logging diagnostics"));
        assert!(diagnostics.contains("Logging Configuration"));
    }
}
