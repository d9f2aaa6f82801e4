//! Classifier for grouped sub-rule streams

use super::RuleType;
use crate::tokens::is_number_token;
use crate::tokens::separators::{
    DEFAULT_SEPARATORS, FORMAT_SEPARATORS, INNER_SEPARATORS, JOIN_SEPARATORS,
    JSON_INNER_SEPARATORS, JSON_SEPARATORS, JS_SEPARATORS, ORDER_SEPARATORS, PAGE_SEPARATORS,
    REGEX_SEPARATORS,
};

/// Rule type of `tokens[index]` inside a grouped rule
pub fn classify_group<S: AsRef<str>>(tokens: &[S], index: usize) -> RuleType {
    let Some(current) = tokens.get(index).map(AsRef::as_ref) else {
        return RuleType::Unknown;
    };
    let token_at = |i: usize| tokens.get(i).map(AsRef::as_ref);

    if let Some(rule_type) = by_membership(current, index) {
        return rule_type;
    }

    if let Some(previous) = index.checked_sub(1).and_then(token_at) {
        if let Some(rule_type) = by_previous(previous) {
            return rule_type;
        }
    }

    // A closing brace takes the role of the block it closes
    if current == "}" {
        match index.checked_sub(2).and_then(token_at) {
            Some("@get:{" | "{") => return RuleType::Format,
            Some("@put:{") => return RuleType::Put,
            _ => {}
        }
    }

    if is_number_token(current) {
        return RuleType::Format;
    }

    if let Some(next) = token_at(index + 1) {
        if matches!(next, "{{" | "{" | "@get:{") || is_number_token(next) {
            return RuleType::Format;
        }
    }

    if current.starts_with("$.") || current.starts_with("$[") {
        return RuleType::Json;
    }
    if current.starts_with('/') {
        return RuleType::Xpath;
    }

    RuleType::DefaultOrEnd
}

fn by_membership(current: &str, index: usize) -> Option<RuleType> {
    if DEFAULT_SEPARATORS.contains(current) {
        Some(RuleType::DefaultOrEnd)
    } else if JS_SEPARATORS.contains(current) {
        Some(RuleType::Js)
    } else if JSON_SEPARATORS.contains(current) {
        Some(RuleType::Json)
    } else if REGEX_SEPARATORS.contains(current) {
        Some(RuleType::Regex)
    } else if ORDER_SEPARATORS.contains(current) && index == 0 {
        Some(RuleType::Order)
    } else if INNER_SEPARATORS.contains(current)
        || JSON_INNER_SEPARATORS.contains(current)
        || PAGE_SEPARATORS.contains(current)
    {
        Some(RuleType::Format)
    } else if JOIN_SEPARATORS.contains(current) {
        Some(RuleType::JoinSymbol)
    } else {
        match current {
            "@get:{" => Some(RuleType::Format),
            "@put:{" => Some(RuleType::Put),
            _ => None,
        }
    }
}

fn by_previous(previous: &str) -> Option<RuleType> {
    if DEFAULT_SEPARATORS.contains(previous) {
        return Some(RuleType::DefaultOrEnd);
    }
    match previous {
        "##" | "####" | ":" => Some(RuleType::Regex),
        "<js>" | "@js:" => Some(RuleType::Js),
        "@put:{" => Some(RuleType::Put),
        _ if FORMAT_SEPARATORS.contains(previous) || is_number_token(previous) => {
            Some(RuleType::Format)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_membership() {
        assert_eq!(classify_group(&["@css:"], 0), RuleType::DefaultOrEnd);
        assert_eq!(classify_group(&["@js:"], 0), RuleType::Js);
        assert_eq!(classify_group(&["@json:"], 0), RuleType::Json);
        assert_eq!(classify_group(&["####"], 0), RuleType::Regex);
        assert_eq!(classify_group(&["{{"], 0), RuleType::Format);
        assert_eq!(classify_group(&["{"], 0), RuleType::Format);
        assert_eq!(classify_group(&[">"], 0), RuleType::Format);
        assert_eq!(classify_group(&["||"], 0), RuleType::JoinSymbol);
        assert_eq!(classify_group(&["@get:{"], 0), RuleType::Format);
        assert_eq!(classify_group(&["@put:{"], 0), RuleType::Put);
    }

    #[test]
    fn test_order_only_at_start() {
        assert_eq!(classify_group(&["-", "a"], 0), RuleType::Order);
        // Not at index 0, so `-` falls through to the lookbehind rules
        assert_eq!(classify_group(&["a", "-"], 1), RuleType::DefaultOrEnd);
        assert_eq!(classify_group(&["{{", "-"], 1), RuleType::Format);
    }

    #[test]
    fn test_previous_token_rules() {
        assert_eq!(classify_group(&["@@", "x"], 1), RuleType::DefaultOrEnd);
        assert_eq!(classify_group(&["####", "x"], 1), RuleType::Regex);
        assert_eq!(classify_group(&["<js>", "x"], 1), RuleType::Js);
        assert_eq!(classify_group(&["@put:{", "x"], 1), RuleType::Put);
        assert_eq!(classify_group(&["<", "1"], 1), RuleType::Format);
        assert_eq!(classify_group(&["$1", "x"], 1), RuleType::Format);
    }

    #[test]
    fn test_closing_brace_looks_two_back() {
        assert_eq!(classify_group(&["@get:{", "k", "}"], 2), RuleType::Format);
        assert_eq!(classify_group(&["@put:{", "k", "}"], 2), RuleType::Put);
        assert_eq!(classify_group(&["{", "$.a", "}"], 2), RuleType::Format);
        assert_eq!(classify_group(&["a", "b", "}"], 2), RuleType::DefaultOrEnd);
    }

    #[test]
    fn test_number_token_is_format() {
        assert_eq!(classify_group(&["$2"], 0), RuleType::Format);
        assert_eq!(classify_group(&["a", "$2"], 1), RuleType::Format);
    }

    #[test]
    fn test_lookahead() {
        assert_eq!(classify_group(&["a", "{{"], 0), RuleType::Format);
        assert_eq!(classify_group(&["a", "@get:{"], 0), RuleType::Format);
        assert_eq!(classify_group(&["a", "$1"], 0), RuleType::Format);
        assert_eq!(classify_group(&["a", "@css:"], 0), RuleType::DefaultOrEnd);
    }

    #[test]
    fn test_content_sniffing() {
        assert_eq!(classify_group(&["$.a"], 0), RuleType::Json);
        assert_eq!(classify_group(&["$[1]"], 0), RuleType::Json);
        assert_eq!(classify_group(&["//a"], 0), RuleType::Xpath);
        assert_eq!(classify_group(&["plain"], 0), RuleType::DefaultOrEnd);
    }

    #[test]
    fn test_out_of_range_index() {
        assert_eq!(classify_group(&["a"], 1), RuleType::Unknown);
    }
}
