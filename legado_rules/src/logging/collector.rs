//! Per-file event collection with cargo-style reporting

use super::events::LogEvent;
use crate::config::compile_time::logging::{MAX_ERROR_COLLECTION, MAX_LOG_EVENTS_PER_FILE};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Context keys rendered in the location suffix rather than as notes
const LOCATION_KEYS: [&str; 3] = ["file", "file_id", "location"];

/// The input file currently being processed on this thread
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self { file_path, file_id }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub clean_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub elapsed: Duration,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

#[derive(Default)]
struct FileLog {
    events: Vec<LogEvent>,
    truncated: bool,
}

impl FileLog {
    fn errors(&self) -> impl Iterator<Item = &LogEvent> {
        self.events.iter().filter(|event| event.is_error())
    }

    fn warnings(&self) -> impl Iterator<Item = &LogEvent> {
        self.events.iter().filter(|event| event.is_warning())
    }
}

#[derive(Default)]
struct State {
    files: BTreeMap<PathBuf, FileLog>,
    stored: usize,
}

/// Thread-safe store of error and warning events keyed by input file
pub struct ErrorCollector {
    state: Mutex<State>,
    started: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            started: Instant::now(),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Events past the per-file limit are dropped behind a single overflow note.
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut state = self.state();
        if state.stored >= MAX_ERROR_COLLECTION {
            return;
        }

        let log = state.files.entry(file_path.to_path_buf()).or_default();
        let kept = if log.events.len() < MAX_LOG_EVENTS_PER_FILE {
            log.events.push(event);
            true
        } else if !log.truncated {
            log.truncated = true;
            log.events.push(LogEvent::warning(&format!(
                "further events for this file dropped after {MAX_LOG_EVENTS_PER_FILE}"
            )));
            true
        } else {
            false
        };

        if kept {
            state.stored += 1;
        }
    }

    /// Registers a file so it is counted even if it logs nothing
    pub fn record_file_context(&self, context: FileProcessingContext) {
        self.state().files.entry(context.file_path).or_default();
    }

    pub fn file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        self.state()
            .files
            .get(file_path)
            .map(|log| log.events.clone())
            .unwrap_or_default()
    }

    pub fn file_has_errors(&self, file_path: &Path) -> bool {
        self.state()
            .files
            .get(file_path)
            .is_some_and(|log| log.errors().next().is_some())
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let state = self.state();
        let mut summary = ProcessingSummary {
            total_files: state.files.len(),
            elapsed: self.started.elapsed(),
            ..ProcessingSummary::default()
        };

        for log in state.files.values() {
            let errors = log.errors().count();
            let warnings = log.warnings().count();
            summary.total_errors += errors;
            summary.total_warnings += warnings;
            match (errors, warnings) {
                (0, 0) => summary.clean_files += 1,
                (0, _) => summary.files_with_warnings += 1,
                _ => summary.failed_files += 1,
            }
        }
        summary
    }

    pub fn clear(&self) {
        *self.state() = State::default();
    }

    pub fn total_event_count(&self) -> usize {
        self.state().stored
    }

    /// (stored, limit, fill fraction) of the global collection limit
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let stored = self.total_event_count();
        (stored, MAX_ERROR_COLLECTION, stored as f64 / MAX_ERROR_COLLECTION as f64)
    }

    /// Cargo-style report of every file that logged an error or warning
    pub fn render(&self) -> String {
        let state = self.state();
        let mut out = String::new();
        let mut totals = (0, 0);

        for (path, log) in &state.files {
            let errors: Vec<&LogEvent> = log.errors().collect();
            let warnings: Vec<&LogEvent> = log.warnings().collect();
            if errors.is_empty() && warnings.is_empty() {
                continue;
            }
            totals.0 += errors.len();
            totals.1 += warnings.len();

            let _ = writeln!(out, "Checking {}...", path.display());
            for event in errors {
                render_event(&mut out, "error", path, event);
                let _ = writeln!(
                    out,
                    "  = severity: {}, category: {}",
                    event.severity(),
                    event.category()
                );
                render_notes(&mut out, event);
                if let Some(help) = event.metadata().map(|meta| meta.recommended_action) {
                    let _ = writeln!(out, "  = help: {help}");
                }
            }
            for event in warnings {
                render_event(&mut out, "warning", path, event);
                render_notes(&mut out, event);
            }
            out.push('\n');
        }

        if totals.0 > 0 {
            let _ = writeln!(out, "Total errors: {}", totals.0);
        }
        if totals.1 > 0 {
            let _ = writeln!(out, "Total warnings: {}", totals.1);
        }
        out
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn render_event(out: &mut String, label: &str, path: &Path, event: &LogEvent) {
    let _ = write!(out, "{label}[{}]: {}", event.code, event.message);
    let path = path.display();
    let _ = match (event.context.get("location"), event.position) {
        (Some(location), Some(at)) => write!(out, " --> {path} [{location}:{at}]"),
        (Some(location), None) => write!(out, " --> {path} [{location}]"),
        (None, Some(at)) => write!(out, " --> {path}:{at}"),
        (None, None) => Ok(()),
    };
    out.push('\n');
}

fn render_notes(out: &mut String, event: &LogEvent) {
    for (key, value) in &event.context {
        if !LOCATION_KEYS.contains(&key.as_str()) {
            let _ = writeln!(out, "  = {key}: {value}");
        }
    }
}

/// Render collected errors and warnings grouped by file, cargo style
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    collector.render()
}
