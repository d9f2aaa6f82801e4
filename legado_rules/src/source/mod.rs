//! Book-source records and the JSON loader that reads them

mod entities;
mod error;
mod loader;

use crate::config::compile_time::source::{MAX_RULE_FIELDS_PER_SOURCE, MAX_SOURCES_PER_FILE};
use crate::logging::codes;

pub use entities::{
    BookSource, RuleBookInfo, RuleContent, RuleExplore, RuleField, RuleSearch, RuleToc,
};
pub use error::SourceError;
pub use loader::{load_sources_from_file, load_sources_from_str, load_sources_with, SourceFile};

/// Check source codes against the registry at startup
pub fn init_source_logging() -> Result<(), String> {
    codes::ensure_registered(
        "source loading",
        &[
            codes::source::INVALID_JSON,
            codes::source::UNEXPECTED_SHAPE,
            codes::source::TOO_MANY_SOURCES,
            codes::source::TOO_MANY_RULE_FIELDS,
            codes::source::SOURCE_SKIPPED,
            codes::success::SOURCES_LOADED,
        ],
    )?;

    crate::log_debug!("Source limits loaded",
        "max_sources_per_file" => MAX_SOURCES_PER_FILE,
        "max_rule_fields_per_source" => MAX_RULE_FIELDS_PER_SOURCE
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_source_logging() {
        assert!(init_source_logging().is_ok());
    }

    #[test]
    fn test_loaded_source_exposes_rule_fields() {
        let sources = load_sources_from_str(
            r#"{"exploreUrl": "分类::/c/{{page}}", "ruleContent": {"content": "@js:result"}}"#,
        )
        .unwrap();
        let fields = sources[0].rule_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].location, "exploreUrl");
        assert_eq!(fields[1].location, "ruleContent.content");
    }
}
