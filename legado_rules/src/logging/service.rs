//! Sinks for log events and the level filter in front of them
//!
//! Console output goes to stderr so report output on stdout stays parseable.

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleFormat {
    Plain,
    /// One JSON object per line
    Json,
}

pub struct ConsoleLogger {
    format: ConsoleFormat,
}

impl ConsoleLogger {
    pub fn new(format: ConsoleFormat) -> Self {
        Self { format }
    }

    pub fn render(&self, event: &LogEvent) -> String {
        match self.format {
            ConsoleFormat::Plain => event.to_string(),
            ConsoleFormat::Json => event.format_json().unwrap_or_else(|_| event.to_string()),
        }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        eprintln!("{}", self.render(event));
    }
}

/// Keeps the most recent events in memory
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
    capacity: usize,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::with_capacity(config::get_error_buffer_size())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    fn guard(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.guard().clone()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn with_code(&self, code: Code) -> Vec<LogEvent> {
        self.guard().iter().filter(|e| e.code == code).cloned().collect()
    }

    pub fn contains_code(&self, code: Code) -> bool {
        self.guard().iter().any(|e| e.code == code)
    }

    pub fn count_by_level(&self) -> BTreeMap<LogLevel, usize> {
        let mut counts = BTreeMap::new();
        for event in self.guard().iter() {
            *counts.entry(event.level).or_insert(0) += 1;
        }
        counts
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.guard();
        if events.len() >= self.capacity {
            let overflow = events.len() + 1 - self.capacity;
            events.drain(..overflow);
        }
        events.push(event.clone());
    }
}

/// Sends every event to each inner logger
#[derive(Default)]
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
}

impl MultiLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, logger: Arc<dyn Logger>) -> Self {
        self.loggers.push(logger);
        self
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        for logger in &self.loggers {
            logger.log(event);
        }
    }
}

/// Level filter in front of an optional sink
pub struct LoggingService {
    sink: Option<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(sink: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self {
            sink: Some(sink),
            min_level,
        }
    }

    /// Filters as usual but writes nowhere
    pub fn silent(min_level: LogLevel) -> Self {
        Self {
            sink: None,
            min_level,
        }
    }

    /// Service described by the runtime logging preferences
    pub fn from_preferences() -> Self {
        let min_level = config::get_min_log_level();
        if !config::use_console_logging() {
            return Self::silent(min_level);
        }

        let format = if config::use_structured_logging() {
            ConsoleFormat::Json
        } else {
            ConsoleFormat::Plain
        };
        Self::new(Arc::new(ConsoleLogger::new(format)), min_level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if let Some(sink) = &self.sink {
            if self.enabled(event.level) {
                sink.log(&event);
            }
        }
    }
}

pub fn create_configured_service() -> LoggingService {
    LoggingService::from_preferences()
}
