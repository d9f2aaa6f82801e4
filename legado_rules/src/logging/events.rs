//! Log events

use super::codes::{self, Code, ErrorMetadata};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    #[serde(alias = "warn")]
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Accepts level names in any case, `warn`, or the digits 0-3
impl FromStr for LogLevel {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_ascii_lowercase().as_str() {
            "error" | "0" => Ok(Self::Error),
            "warning" | "warn" | "1" => Ok(Self::Warning),
            "info" | "2" => Ok(Self::Info),
            "debug" | "3" => Ok(Self::Debug),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Placeholder codes for events that carry no registered code
const UNCODED_WARNING: Code = Code::new("W000");
const UNCODED_INFO: Code = Code::new("I000");
const UNCODED_DEBUG: Code = Code::new("D000");

/// A single log event.
///
/// `position` is a character offset into the rule the event is about.
/// Context keys are sorted so rendered output is stable.
#[derive(Debug, Clone)]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub position: Option<usize>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    pub fn new(level: LogLevel, code: Code, message: &str) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0);

        Self {
            timestamp_ms,
            level,
            code,
            message: message.to_string(),
            position: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, code, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, UNCODED_WARNING, message)
    }

    pub fn warning_with_code(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, UNCODED_INFO, message)
    }

    /// Info-level event carrying a success code
    pub fn success(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, UNCODED_DEBUG, message)
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn metadata(&self) -> Option<&'static ErrorMetadata> {
        codes::get_error_metadata(self.code.as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.code.as_str())
    }

    /// Multi-line form with registry metadata and context
    pub fn format_detailed(&self) -> String {
        let mut output = self.to_string();
        output.push_str(&format!("\n  Category: {}", self.category()));
        output.push_str(&format!("\n  Severity: {}", self.severity()));

        if let Some(metadata) = self.metadata() {
            if self.is_error() {
                output.push_str(&format!("\n  Recoverable: {}", metadata.recoverable));
                output.push_str(&format!("\n  Requires halt: {}", metadata.requires_halt));
            }
            output.push_str(&format!("\n  Description: {}", metadata.description));
            output.push_str(&format!("\n  Recommended action: {}", metadata.recommended_action));
        }

        for (key, value) in &self.context {
            output.push_str(&format!("\n  {}: {}", key, value));
        }
        output
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut json = serde_json::json!({
            "timestamp_ms": self.timestamp_ms,
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
        });

        if let Some(metadata) = self.metadata().filter(|_| self.is_error()) {
            json["error_metadata"] = serde_json::json!({
                "severity": metadata.severity.as_str(),
                "recoverable": metadata.recoverable,
                "requires_halt": metadata.requires_halt,
                "recommended_action": metadata.recommended_action,
            });
        }
        if let Some(position) = self.position {
            json["position"] = serde_json::json!(position);
        }
        if !self.context.is_empty() {
            json["context"] = serde_json::json!(self.context);
        }
        json
    }

    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_json())
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {}", self.level.as_str(), self.code, self.message)?;
        if let Some(position) = self.position {
            write!(f, " at char {}", position)?;
        }
        Ok(())
    }
}
