//! Fixed values of the book-source format that are not build-profile dependent

/// File extension expected for exported book-source collections
pub const SOURCE_FILE_EXTENSION: &str = "json";

/// Prefix shared by every runtime environment variable
pub const ENV_PREFIX: &str = "LEGADO_";

pub mod source_defaults {
    /// Response time hint applied when a source omits `responseTime` (ms)
    pub const RESPONSE_TIME_MS: i64 = 1500;

    /// `bookSourceType` for plain text sources
    pub const BOOK_SOURCE_TYPE: i32 = 0;

    /// Sources are enabled unless they say otherwise
    pub const ENABLED: bool = true;
}

pub mod rule_fields {
    /// Rule fields holding URL templates rather than extraction rules.
    /// These are lexed with the URL tokenizer.
    pub const URL_FIELDS: &[&str] = &["searchUrl", "exploreUrl", "loginUrl"];
}
