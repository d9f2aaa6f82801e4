//! Classifier for flat (ungrouped) rule streams

use super::RuleType;
use crate::tokens::separators::{RULE_JOIN_SET, RULE_SEPARATORS};
use crate::tokens::is_number_token;

/// Rule type of `tokens[index]`
///
/// Order of the checks matters: separator membership, then the previous
/// token, then the token's own shape and the caller's flags.
pub fn classify<S: AsRef<str>>(
    tokens: &[S],
    index: usize,
    has_end_rule: bool,
    content_is_json: bool,
) -> RuleType {
    let Some(current) = tokens.get(index).map(AsRef::as_ref) else {
        return RuleType::Unknown;
    };

    if RULE_SEPARATORS.contains(current) {
        return RuleType::RuleSymbol;
    }

    if let Some(previous) = index.checked_sub(1).map(|i| tokens[i].as_ref()) {
        if let Some(rule_type) = by_previous(previous, current) {
            return rule_type;
        }
    }

    if current.starts_with('/') && !stream_has_template(tokens) {
        return RuleType::Xpath;
    }
    if current.starts_with("$.") || current.starts_with("$[") {
        return RuleType::Json;
    }
    if content_is_json {
        return RuleType::Json;
    }
    if has_end_rule {
        let ends_clause = tokens
            .get(index + 1)
            .map_or(true, |next| RULE_JOIN_SET.contains(next.as_ref()));
        if ends_clause {
            return RuleType::End;
        }
    }

    RuleType::DefaultOrEnd
}

fn by_previous(previous: &str, current: &str) -> Option<RuleType> {
    let rule_type = match previous {
        "##" | ":" => RuleType::Regex,
        _ if is_number_token(current) => RuleType::Regex,
        "@css:" | "@@" => RuleType::DefaultOrEnd,
        "@js:" | "<js>" => RuleType::Js,
        "@get:{" => RuleType::Get,
        "@put:{" => RuleType::Put,
        "{{" => RuleType::Inner,
        "{" => RuleType::JsonInner,
        "<" => RuleType::Page,
        _ => return None,
    };
    Some(rule_type)
}

/// A leading `/` is a path segment, not XPath, once templates are involved
fn stream_has_template<S: AsRef<str>>(tokens: &[S]) -> bool {
    tokens
        .iter()
        .any(|token| matches!(token.as_ref(), "{{" | "@get:{"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(tokens: &[&str], index: usize) -> RuleType {
        classify(tokens, index, false, false)
    }

    #[test]
    fn test_separators_are_symbols() {
        for marker in ["@", "@css:", "&&", "{{", "}", "###", "<", "+"] {
            assert_eq!(flat(&[marker], 0), RuleType::RuleSymbol, "{}", marker);
        }
        // `{` and `####` are emitted by the tokenizer but are not rule separators
        assert_eq!(flat(&["{"], 0), RuleType::DefaultOrEnd);
        assert_eq!(flat(&["####"], 0), RuleType::DefaultOrEnd);
    }

    #[test]
    fn test_regex_after_hash_pair() {
        assert_eq!(flat(&["##", "abc", "##"], 1), RuleType::Regex);
        assert_eq!(flat(&[":", "a(b)"], 1), RuleType::Regex);
    }

    #[test]
    fn test_back_reference_is_regex_by_lookbehind() {
        assert_eq!(flat(&["text", "$1"], 1), RuleType::Regex);
        assert_eq!(flat(&["$1"], 0), RuleType::DefaultOrEnd);
    }

    #[test]
    fn test_previous_token_rules() {
        assert_eq!(flat(&["@css:", "div"], 1), RuleType::DefaultOrEnd);
        assert_eq!(flat(&["@js:", "result"], 1), RuleType::Js);
        assert_eq!(flat(&["<js>", "result"], 1), RuleType::Js);
        assert_eq!(flat(&["@get:{", "@get:{k}"], 1), RuleType::Get);
        assert_eq!(flat(&["@put:{", "@put:{k:v}"], 1), RuleType::Put);
        assert_eq!(flat(&["{{", "{{a}}"], 1), RuleType::Inner);
        assert_eq!(flat(&["{", "$.name"], 1), RuleType::JsonInner);
        assert_eq!(flat(&["p", "<", "<1,2>"], 2), RuleType::Page);
    }

    #[test]
    fn test_xpath_unless_templates_present() {
        assert_eq!(flat(&["//div[@class]"], 0), RuleType::Xpath);
        assert_eq!(flat(&["/a", "{{", "{{b}}"], 0), RuleType::DefaultOrEnd);
        assert_eq!(flat(&["/a", "@get:{", "@get:{b}"], 0), RuleType::DefaultOrEnd);
    }

    #[test]
    fn test_json_sniffing() {
        assert_eq!(flat(&["$.data.list"], 0), RuleType::Json);
        assert_eq!(flat(&["$[0]"], 0), RuleType::Json);
        assert_eq!(classify(&["name"], 0, false, true), RuleType::Json);
    }

    #[test]
    fn test_end_rule_position() {
        let tokens = ["a", "||", "b", "c"];
        assert_eq!(classify(&tokens, 0, true, false), RuleType::End);
        assert_eq!(classify(&tokens, 2, true, false), RuleType::DefaultOrEnd);
        assert_eq!(classify(&tokens, 3, true, false), RuleType::End);
        assert_eq!(classify(&tokens, 3, false, false), RuleType::DefaultOrEnd);
        assert_eq!(classify(&["a", "##", "b"], 0, true, false), RuleType::End);
    }

    #[test]
    fn test_json_content_beats_end_rule() {
        assert_eq!(classify(&["a"], 0, true, true), RuleType::Json);
    }

    #[test]
    fn test_out_of_range_index() {
        assert_eq!(flat(&["a"], 3), RuleType::Unknown);
        assert_eq!(flat(&[], 0), RuleType::Unknown);
    }
}
