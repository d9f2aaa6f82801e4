//! Error and success codes with their classification metadata
//!
//! Every code an event can carry is declared here together with its category,
//! severity and recommended action. Lookups for unregistered codes fall back to
//! permissive defaults.

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Code attached to every log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Metadata registered for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_INVALID: Code = Code::new("ERR003");
}

pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Rule tokenizing codes
pub mod lexical {
    use super::Code;

    pub const RULE_TOO_LONG: Code = Code::new("E020");
    pub const TOKEN_LIMIT_EXCEEDED: Code = Code::new("E021");
    pub const NESTING_TOO_DEEP: Code = Code::new("E022");
    pub const CURSOR_OUT_OF_RANGE: Code = Code::new("E023");

    // Not an error: the block ran to the end of the rule
    pub const UNTERMINATED_BLOCK: Code = Code::new("W020");
}

/// Book-source loading codes
pub mod source {
    use super::Code;

    pub const INVALID_JSON: Code = Code::new("E030");
    pub const UNEXPECTED_SHAPE: Code = Code::new("E031");
    pub const TOO_MANY_SOURCES: Code = Code::new("E032");
    pub const TOO_MANY_RULE_FIELDS: Code = Code::new("E033");

    pub const SOURCE_SKIPPED: Code = Code::new("W030");
}

pub mod pipeline {
    use super::Code;

    pub const PIPELINE_FAILURE: Code = Code::new("E040");
    pub const RULE_REJECTED: Code = Code::new("W040");
}

pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const CLASSIFICATION_COMPLETE: Code = Code::new("I025");
    pub const SOURCES_LOADED: Code = Code::new("I030");
    pub const SOURCE_ANALYSIS_COMPLETE: Code = Code::new("I040");
    pub const PIPELINE_COMPLETE: Code = Code::new("I041");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

const REGISTRY_ENTRIES: &[ErrorMetadata] = &[
    // System
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Critical internal system error",
        "File a bug report with the rule text that triggered it",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        true,
        "System initialization failure",
        "Check logging configuration and environment variables",
    ),
    ErrorMetadata::new(
        "ERR003",
        "System",
        Severity::High,
        false,
        true,
        "Runtime configuration is invalid",
        "Fix the runtime configuration file or LEGADO_* variables",
    ),
    // File processing
    ErrorMetadata::new(
        "E005",
        "FileProcessing",
        Severity::Medium,
        false,
        false,
        "Input file not found",
        "Check the path to the book-source file",
    ),
    ErrorMetadata::new(
        "E006",
        "FileProcessing",
        Severity::Low,
        true,
        false,
        "File extension is not .json",
        "Rename the file or disable LEGADO_REQUIRE_JSON_EXTENSION",
    ),
    ErrorMetadata::new(
        "E007",
        "FileProcessing",
        Severity::High,
        false,
        false,
        "File exceeds the configured size limit",
        "Split the source collection into smaller files",
    ),
    ErrorMetadata::new(
        "E008",
        "FileProcessing",
        Severity::Low,
        true,
        false,
        "File is empty",
        "Export the book sources again",
    ),
    ErrorMetadata::new(
        "E009",
        "FileProcessing",
        Severity::Medium,
        false,
        false,
        "Permission denied reading file",
        "Check file permissions",
    ),
    ErrorMetadata::new(
        "E010",
        "FileProcessing",
        Severity::Medium,
        false,
        false,
        "File is not valid UTF-8",
        "Re-encode the file as UTF-8",
    ),
    ErrorMetadata::new(
        "E011",
        "FileProcessing",
        Severity::Medium,
        false,
        false,
        "I/O error while reading file",
        "Retry or check the storage device",
    ),
    ErrorMetadata::new(
        "E012",
        "FileProcessing",
        Severity::Medium,
        false,
        false,
        "Path is not a regular file",
        "Pass a file path, not a directory",
    ),
    // Lexical
    ErrorMetadata::new(
        "E020",
        "Lexical",
        Severity::High,
        true,
        false,
        "Rule string exceeds the maximum length",
        "Shorten the rule or raise max_rule_length in the build profile",
    ),
    ErrorMetadata::new(
        "E021",
        "Lexical",
        Severity::High,
        true,
        false,
        "Rule produced more tokens than allowed",
        "Simplify the rule or raise max_token_count in the build profile",
    ),
    ErrorMetadata::new(
        "E022",
        "Lexical",
        Severity::High,
        true,
        false,
        "Brace or block nesting exceeds the maximum depth",
        "Check the rule for runaway '{' sequences",
    ),
    ErrorMetadata::new(
        "E023",
        "Lexical",
        Severity::Critical,
        true,
        false,
        "Tokenizer cursor moved outside the rule text",
        "File a bug report with the rule text that triggered it",
    ),
    ErrorMetadata::new(
        "W020",
        "Lexical",
        Severity::Low,
        true,
        false,
        "Block marker without closing sequence consumed the rest of the rule",
        "Add the missing closing marker if the rule was not meant to end there",
    ),
    // Source
    ErrorMetadata::new(
        "E030",
        "Source",
        Severity::High,
        false,
        false,
        "Book-source document is not valid JSON",
        "Validate the exported JSON",
    ),
    ErrorMetadata::new(
        "E031",
        "Source",
        Severity::High,
        false,
        false,
        "Book-source document is neither an object nor an array of objects",
        "Export the sources with the reader application",
    ),
    ErrorMetadata::new(
        "E032",
        "Source",
        Severity::Medium,
        false,
        false,
        "Document holds more book sources than allowed",
        "Split the collection or raise max_sources_per_file",
    ),
    ErrorMetadata::new(
        "E033",
        "Source",
        Severity::Medium,
        true,
        false,
        "Book source declares more rule fields than allowed",
        "Raise max_rule_fields_per_source in the build profile",
    ),
    ErrorMetadata::new(
        "W030",
        "Source",
        Severity::Low,
        true,
        false,
        "Book source skipped",
        "Enable the source or turn off LEGADO_SOURCE_SKIP_DISABLED",
    ),
    // Pipeline
    ErrorMetadata::new(
        "E040",
        "Pipeline",
        Severity::High,
        false,
        true,
        "Pipeline stage failed",
        "See the preceding stage error",
    ),
    ErrorMetadata::new(
        "W040",
        "Pipeline",
        Severity::Medium,
        true,
        false,
        "A rule string could not be tokenized and was left out of the report",
        "Inspect the rule named in the event context",
    ),
    // Success
    ErrorMetadata::new(
        "I001",
        "Success",
        Severity::Low,
        true,
        false,
        "Operation completed successfully",
        "No action required",
    ),
    ErrorMetadata::new(
        "I004",
        "Success",
        Severity::Low,
        true,
        false,
        "Logging system initialized",
        "No action required",
    ),
    ErrorMetadata::new(
        "I006",
        "Success",
        Severity::Low,
        true,
        false,
        "File read and validated",
        "No action required",
    ),
    ErrorMetadata::new(
        "I020",
        "Success",
        Severity::Low,
        true,
        false,
        "Rule tokenized",
        "No action required",
    ),
    ErrorMetadata::new(
        "I025",
        "Success",
        Severity::Low,
        true,
        false,
        "Token stream classified",
        "No action required",
    ),
    ErrorMetadata::new(
        "I030",
        "Success",
        Severity::Low,
        true,
        false,
        "Book sources loaded",
        "No action required",
    ),
    ErrorMetadata::new(
        "I040",
        "Success",
        Severity::Low,
        true,
        false,
        "All rules of a book source analyzed",
        "No action required",
    ),
    ErrorMetadata::new(
        "I041",
        "Success",
        Severity::Low,
        true,
        false,
        "Pipeline finished",
        "No action required",
    ),
];

// ============================================================================
// LOOKUPS
// ============================================================================

/// Registered metadata for `code`; the table is small enough to scan
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    REGISTRY_ENTRIES.iter().find(|metadata| metadata.code == code)
}

pub fn is_registered(code: Code) -> bool {
    get_error_metadata(code.as_str()).is_some()
}

/// Startup check that every code a stage logs has registry metadata
pub fn ensure_registered(stage: &str, stage_codes: &[Code]) -> Result<(), String> {
    match stage_codes.iter().find(|code| !is_registered(**code)) {
        Some(code) => Err(format!("{stage} logs unregistered code {code}")),
        None => Ok(()),
    }
}

fn field<T>(code: &str, pick: fn(&ErrorMetadata) -> T, fallback: T) -> T {
    get_error_metadata(code).map_or(fallback, pick)
}

pub fn get_severity(code: &str) -> Severity {
    field(code, |m| m.severity, Severity::Medium)
}

pub fn requires_halt(code: &str) -> bool {
    field(code, |m| m.requires_halt, false)
}

pub fn get_action(code: &str) -> &'static str {
    field(code, |m| m.recommended_action, "No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    field(code, |m| m.category, "Unknown")
}
