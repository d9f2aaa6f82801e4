//! Rule type classification
//!
//! Given a token stream and a position, decide which extraction strategy the
//! evaluator applies to the token there. Both classifiers are total: unknown
//! shapes fall back to [`RuleType::DefaultOrEnd`].

pub mod flat;
pub mod group;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use flat::classify;
pub use group::classify_group;

/// Semantic role of one token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum RuleType {
    DefaultOrEnd = 0,
    Xpath = 1,
    Json = 2,
    Js = 3,
    Regex = 4,
    RuleSymbol = 5,
    End = 6,
    Inner = 7,
    Get = 8,
    Put = 9,
    Order = 10,
    Unknown = 11,
    Format = 12,
    JsonInner = 13,
    JoinSymbol = 14,
    Page = 15,
}

impl RuleType {
    pub const ALL: [RuleType; 16] = [
        RuleType::DefaultOrEnd,
        RuleType::Xpath,
        RuleType::Json,
        RuleType::Js,
        RuleType::Regex,
        RuleType::RuleSymbol,
        RuleType::End,
        RuleType::Inner,
        RuleType::Get,
        RuleType::Put,
        RuleType::Order,
        RuleType::Unknown,
        RuleType::Format,
        RuleType::JsonInner,
        RuleType::JoinSymbol,
        RuleType::Page,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::DefaultOrEnd => "DefaultOrEnd",
            RuleType::Xpath => "Xpath",
            RuleType::Json => "Json",
            RuleType::Js => "Js",
            RuleType::Regex => "Regex",
            RuleType::RuleSymbol => "RuleSymbol",
            RuleType::End => "End",
            RuleType::Inner => "Inner",
            RuleType::Get => "Get",
            RuleType::Put => "Put",
            RuleType::Order => "Order",
            RuleType::Unknown => "Unknown",
            RuleType::Format => "Format",
            RuleType::JsonInner => "JsonInner",
            RuleType::JoinSymbol => "JoinSymbol",
            RuleType::Page => "Page",
        }
    }

    /// Numeric value used by the rule evaluator
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Structural tokens rather than rule content
    pub fn is_symbol(&self) -> bool {
        matches!(self, RuleType::RuleSymbol | RuleType::JoinSymbol)
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags the evaluator knows about the rule being classified
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyContext {
    /// The rule declares an end sub-rule
    pub has_end_rule: bool,
    /// The content the rule runs against is JSON
    pub content_is_json: bool,
    /// Use the grouped classifier
    pub grouped: bool,
}

impl ClassifyContext {
    pub fn flat(has_end_rule: bool, content_is_json: bool) -> Self {
        Self {
            has_end_rule,
            content_is_json,
            grouped: false,
        }
    }

    pub fn grouped() -> Self {
        Self {
            grouped: true,
            ..Self::default()
        }
    }

    pub fn classify<S: AsRef<str>>(&self, tokens: &[S], index: usize) -> RuleType {
        if self.grouped {
            classify_group(tokens, index)
        } else {
            classify(tokens, index, self.has_end_rule, self.content_is_json)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedToken {
    pub token: String,
    pub rule_type: RuleType,
}

/// Classify every token of a stream
pub fn classify_stream<S: AsRef<str>>(tokens: &[S], context: ClassifyContext) -> Vec<ClassifiedToken> {
    (0..tokens.len())
        .map(|index| ClassifiedToken {
            token: tokens[index].as_ref().to_string(),
            rule_type: context.classify(tokens, index),
        })
        .collect()
}

/// Occurrences of each rule type in a classified stream
pub fn type_histogram(classified: &[ClassifiedToken]) -> std::collections::BTreeMap<RuleType, usize> {
    let mut histogram = std::collections::BTreeMap::new();
    for entry in classified {
        *histogram.entry(entry.rule_type).or_insert(0) += 1;
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;

    #[test]
    fn test_codes_round_trip_through_table() {
        for (index, rule_type) in RuleType::ALL.iter().enumerate() {
            assert_eq!(usize::from(rule_type.code()), index);
            assert_eq!(RuleType::from_code(rule_type.code()), Some(*rule_type));
        }
        assert_eq!(RuleType::from_code(16), None);
        assert_eq!(RuleType::Page.code(), 15);
    }

    #[test]
    fn test_display_and_serde_names_agree() {
        let json = serde_json::to_string(&RuleType::JsonInner).unwrap();
        assert_eq!(json, format!("\"{}\"", RuleType::JsonInner));
    }

    #[test]
    fn test_classify_stream_flat() {
        let tokens = tokenize("@css:div.title@text").unwrap();
        let classified = classify_stream(&tokens[..], ClassifyContext::flat(false, false));

        let types: Vec<RuleType> = classified.iter().map(|c| c.rule_type).collect();
        assert_eq!(
            types,
            vec![
                RuleType::RuleSymbol,
                RuleType::DefaultOrEnd,
                RuleType::RuleSymbol,
                RuleType::DefaultOrEnd,
            ]
        );
        assert_eq!(classified[1].token, "div.title");
    }

    #[test]
    fn test_classify_stream_grouped() {
        let tokens = ["+", "class.item", "@", "text"];
        let classified = classify_stream(&tokens, ClassifyContext::grouped());

        assert_eq!(classified[0].rule_type, RuleType::Order);
        assert_eq!(classified[2].rule_type, RuleType::DefaultOrEnd);
        assert_eq!(classified[3].rule_type, RuleType::DefaultOrEnd);
    }

    #[test]
    fn test_histogram() {
        let tokens = ["a", "&&", "b"];
        let classified = classify_stream(&tokens, ClassifyContext::flat(true, false));
        let histogram = type_histogram(&classified);

        assert_eq!(histogram.get(&RuleType::End), Some(&2));
        assert_eq!(histogram.get(&RuleType::RuleSymbol), Some(&1));
        assert_eq!(classified.iter().filter(|c| c.rule_type.is_symbol()).count(), 1);
    }

    #[test]
    fn test_empty_stream() {
        let tokens: [&str; 0] = [];
        assert!(classify_stream(&tokens, ClassifyContext::default()).is_empty());
    }
}
