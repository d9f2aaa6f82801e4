//! Marker tables shared by the tokenizers and the rule type classifier

use phf::{phf_set, Set};

/// Every string the flat classifier treats as a structural symbol
pub static RULE_SEPARATORS: Set<&'static str> = phf_set! {
    "@", "@@", "{{", "}}", "<js>", "</js>", "@js:", "@css:", "@xpath:", "@json:",
    "&&", "||", "%%", "##", "###", "}", "@put:{", "@get:{",
    "+", "-", ":", "<", ">"
};

/// Markers that join alternative rules; an `End` rule may precede them
pub static RULE_JOIN_SET: Set<&'static str> = phf_set! { "&&", "||", "%%", "##" };

pub static DEFAULT_SEPARATORS: Set<&'static str> = phf_set! { "@", "@css:", "@@" };

pub static JS_SEPARATORS: Set<&'static str> = phf_set! { "<js>", "</js>", "@js:" };

pub static JSON_SEPARATORS: Set<&'static str> = phf_set! { "@json:" };

pub static REGEX_SEPARATORS: Set<&'static str> = phf_set! { "##", "###", ":", "####" };

/// Leading `+`/`-` select list ordering
pub static ORDER_SEPARATORS: Set<&'static str> = phf_set! { "+", "-" };

pub static INNER_SEPARATORS: Set<&'static str> = phf_set! { "{{", "}}" };

pub static JSON_INNER_SEPARATORS: Set<&'static str> = phf_set! { "{" };

pub static FORMAT_SEPARATORS: Set<&'static str> = phf_set! {
    "{{", "}}", "{", "}", "@get:{", "<", ">"
};

pub static PAGE_SEPARATORS: Set<&'static str> = phf_set! { "<", ">" };

pub static JOIN_SEPARATORS: Set<&'static str> = phf_set! { "&&", "||", "%%" };

/// A regex back-reference such as `$1`: exactly `$` followed by one numeric char
pub fn is_number_token(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some('$'), Some(digit), None) if digit.is_numeric()
    )
}
