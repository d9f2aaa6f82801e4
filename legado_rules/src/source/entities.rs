//! Typed book-source records
//!
//! Field names follow the camelCase keys of exported source files. Rule
//! fields are kept as raw strings; exports in the wild store numbers, booleans
//! and nulls in them too, so those are read leniently.

use crate::config::constants::{rule_fields, source_defaults};
use crate::lexical::TokenizerKind;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Read any scalar as a string; objects and arrays keep their JSON text
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    })
}

/// Integers that may arrive quoted; anything unreadable keeps the default
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|value| value as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Some(flag),
        Value::String(text) => text.trim().parse().ok(),
        Value::Number(number) => number.as_i64().map(|value| value != 0),
        _ => None,
    })
}

/// `null` rule groups read as empty groups
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleBookInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub author: String,
    #[serde(deserialize_with = "lenient_string")]
    pub cover_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub intro: String,
    #[serde(deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_chapter: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub word_count: String,
    #[serde(deserialize_with = "lenient_string")]
    pub update_time: String,
    #[serde(rename = "canReName", deserialize_with = "lenient_string")]
    pub can_rename: String,
    #[serde(deserialize_with = "lenient_string")]
    pub download_urls: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleContent {
    #[serde(deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(deserialize_with = "lenient_string")]
    pub source_regex: String,
    #[serde(deserialize_with = "lenient_string")]
    pub replace_regex: String,
    #[serde(deserialize_with = "lenient_string")]
    pub next_content_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub web_js: String,
    /// Display hint such as `FULL`, not a rule
    #[serde(deserialize_with = "lenient_string")]
    pub image_style: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pay_action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleExplore {
    #[serde(deserialize_with = "lenient_string")]
    pub author: String,
    #[serde(deserialize_with = "lenient_string")]
    pub book_list: String,
    #[serde(deserialize_with = "lenient_string")]
    pub book_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub cover_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub intro: String,
    #[serde(deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_chapter: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub word_count: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleSearch {
    #[serde(deserialize_with = "lenient_string")]
    pub author: String,
    #[serde(deserialize_with = "lenient_string")]
    pub book_list: String,
    #[serde(deserialize_with = "lenient_string")]
    pub book_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub cover_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub intro: String,
    #[serde(deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_chapter: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub update_time: String,
    #[serde(deserialize_with = "lenient_string")]
    pub word_count: String,
    #[serde(rename = "checkKeyWord", deserialize_with = "lenient_string")]
    pub check_keyword: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleToc {
    #[serde(deserialize_with = "lenient_string")]
    pub chapter_list: String,
    #[serde(deserialize_with = "lenient_string")]
    pub chapter_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub chapter_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub next_toc_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub update_time: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pre_update_js: String,
    #[serde(deserialize_with = "lenient_string")]
    pub is_volume: String,
    #[serde(deserialize_with = "lenient_string")]
    pub is_vip: String,
    #[serde(deserialize_with = "lenient_string")]
    pub is_pay: String,
}

/// One book source: metadata plus five rule groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookSource {
    #[serde(rename = "bookSourceName", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "bookSourceGroup", deserialize_with = "lenient_string")]
    pub group: String,
    #[serde(rename = "bookSourceUrl", deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(rename = "bookSourceComment", deserialize_with = "lenient_string")]
    pub comment: String,
    #[serde(rename = "bookSourceType", deserialize_with = "lenient_source_type")]
    pub source_type: i32,
    #[serde(deserialize_with = "lenient_string")]
    pub book_url_pattern: String,
    #[serde(deserialize_with = "lenient_default_i64")]
    pub custom_order: i64,
    #[serde(deserialize_with = "lenient_enabled")]
    pub enabled: bool,
    #[serde(deserialize_with = "lenient_default_bool")]
    pub enabled_cookie_jar: bool,
    #[serde(deserialize_with = "lenient_default_bool")]
    pub enabled_explore: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub explore_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub header: String,
    #[serde(deserialize_with = "lenient_default_i64")]
    pub last_update_time: i64,
    #[serde(deserialize_with = "lenient_string")]
    pub login_url: String,
    #[serde(deserialize_with = "lenient_response_time")]
    pub response_time: i64,
    #[serde(deserialize_with = "lenient_string")]
    pub search_url: String,
    #[serde(deserialize_with = "lenient_default_i64")]
    pub weight: i64,

    #[serde(deserialize_with = "null_as_default")]
    pub rule_book_info: RuleBookInfo,
    #[serde(deserialize_with = "null_as_default")]
    pub rule_content: RuleContent,
    #[serde(deserialize_with = "null_as_default")]
    pub rule_explore: RuleExplore,
    #[serde(deserialize_with = "null_as_default")]
    pub rule_search: RuleSearch,
    #[serde(deserialize_with = "null_as_default")]
    pub rule_toc: RuleToc,
}

fn lenient_default_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(lenient_i64(deserializer)?.unwrap_or(0))
}

fn lenient_response_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(lenient_i64(deserializer)?.unwrap_or(source_defaults::RESPONSE_TIME_MS))
}

fn lenient_source_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    Ok(lenient_i64(deserializer)?
        .and_then(|value| i32::try_from(value).ok())
        .unwrap_or(source_defaults::BOOK_SOURCE_TYPE))
}

fn lenient_default_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(lenient_bool(deserializer)?.unwrap_or(false))
}

fn lenient_enabled<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(lenient_bool(deserializer)?.unwrap_or(source_defaults::ENABLED))
}

impl Default for BookSource {
    fn default() -> Self {
        Self {
            name: String::new(),
            group: String::new(),
            url: String::new(),
            comment: String::new(),
            source_type: source_defaults::BOOK_SOURCE_TYPE,
            book_url_pattern: String::new(),
            custom_order: 0,
            enabled: source_defaults::ENABLED,
            enabled_cookie_jar: false,
            enabled_explore: false,
            explore_url: String::new(),
            header: String::new(),
            last_update_time: 0,
            login_url: String::new(),
            response_time: source_defaults::RESPONSE_TIME_MS,
            search_url: String::new(),
            weight: 0,
            rule_book_info: RuleBookInfo::default(),
            rule_content: RuleContent::default(),
            rule_explore: RuleExplore::default(),
            rule_search: RuleSearch::default(),
            rule_toc: RuleToc::default(),
        }
    }
}

/// A non-empty rule string and where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleField<'a> {
    /// Dotted location such as `ruleToc.chapterList`
    pub location: String,
    pub kind: TokenizerKind,
    pub text: &'a str,
}

impl BookSource {
    /// Label used in logs and reports
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.url.is_empty() {
            &self.url
        } else {
            "<unnamed>"
        }
    }

    /// Every non-empty rule string in document order
    pub fn rule_fields<'a>(&'a self) -> Vec<RuleField<'a>> {
        let mut fields = Vec::new();
        let mut push = |group: &str, key: &'static str, text: &'a String| {
            if text.trim().is_empty() {
                return;
            }
            let location = if group.is_empty() {
                key.to_string()
            } else {
                format!("{}.{}", group, key)
            };
            let kind = if group.is_empty() && rule_fields::URL_FIELDS.contains(&key) {
                TokenizerKind::Url
            } else {
                TokenizerKind::Rule
            };
            fields.push(RuleField {
                location,
                kind,
                text: text.as_str(),
            });
        };

        push("", "searchUrl", &self.search_url);
        push("", "exploreUrl", &self.explore_url);
        push("", "loginUrl", &self.login_url);

        let search = &self.rule_search;
        for (key, text) in [
            ("checkKeyWord", &search.check_keyword),
            ("bookList", &search.book_list),
            ("name", &search.name),
            ("author", &search.author),
            ("kind", &search.kind),
            ("wordCount", &search.word_count),
            ("lastChapter", &search.last_chapter),
            ("updateTime", &search.update_time),
            ("intro", &search.intro),
            ("coverUrl", &search.cover_url),
            ("bookUrl", &search.book_url),
        ] {
            push("ruleSearch", key, text);
        }

        let explore = &self.rule_explore;
        for (key, text) in [
            ("bookList", &explore.book_list),
            ("name", &explore.name),
            ("author", &explore.author),
            ("kind", &explore.kind),
            ("wordCount", &explore.word_count),
            ("lastChapter", &explore.last_chapter),
            ("intro", &explore.intro),
            ("coverUrl", &explore.cover_url),
            ("bookUrl", &explore.book_url),
        ] {
            push("ruleExplore", key, text);
        }

        let info = &self.rule_book_info;
        for (key, text) in [
            ("name", &info.name),
            ("author", &info.author),
            ("kind", &info.kind),
            ("wordCount", &info.word_count),
            ("lastChapter", &info.last_chapter),
            ("updateTime", &info.update_time),
            ("intro", &info.intro),
            ("coverUrl", &info.cover_url),
            ("canReName", &info.can_rename),
            ("downloadUrls", &info.download_urls),
        ] {
            push("ruleBookInfo", key, text);
        }

        let toc = &self.rule_toc;
        for (key, text) in [
            ("preUpdateJs", &toc.pre_update_js),
            ("chapterList", &toc.chapter_list),
            ("chapterName", &toc.chapter_name),
            ("chapterUrl", &toc.chapter_url),
            ("isVolume", &toc.is_volume),
            ("isVip", &toc.is_vip),
            ("isPay", &toc.is_pay),
            ("updateTime", &toc.update_time),
            ("nextTocUrl", &toc.next_toc_url),
        ] {
            push("ruleToc", key, text);
        }

        let content = &self.rule_content;
        for (key, text) in [
            ("content", &content.content),
            ("nextContentUrl", &content.next_content_url),
            ("webJs", &content.web_js),
            ("sourceRegex", &content.source_regex),
            ("replaceRegex", &content.replace_regex),
            ("payAction", &content.pay_action),
        ] {
            push("ruleContent", key, text);
        }

        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_keys() {
        let source: BookSource = serde_json::from_str("{}").unwrap();

        assert_eq!(source, BookSource::default());
        assert!(source.enabled);
        assert!(!source.enabled_explore);
        assert_eq!(source.response_time, 1500);
        assert_eq!(source.source_type, 0);
        assert!(source.rule_fields().is_empty());
    }

    #[test]
    fn test_camel_case_keys() {
        let source: BookSource = serde_json::from_str(
            r##"{
                "bookSourceName": "示例",
                "bookSourceUrl": "https://example.com",
                "bookSourceType": 1,
                "enabledExplore": true,
                "searchUrl": "/search?key={{key}}",
                "ruleSearch": {"bookList": "class.item", "checkKeyWord": "我的"},
                "ruleToc": {"chapterList": "#list@a", "nextTocUrl": "text.下一页@href"},
                "ruleBookInfo": {"canReName": "true"}
            }"##,
        )
        .unwrap();

        assert_eq!(source.name, "示例");
        assert_eq!(source.source_type, 1);
        assert!(source.enabled_explore);
        assert_eq!(source.rule_search.check_keyword, "我的");
        assert_eq!(source.rule_toc.next_toc_url, "text.下一页@href");
        assert_eq!(source.rule_book_info.can_rename, "true");
    }

    #[test]
    fn test_regex_fields_are_not_swapped() {
        let content: RuleContent =
            serde_json::from_str(r#"{"sourceRegex": "src", "replaceRegex": "rep"}"#).unwrap();
        assert_eq!(content.source_regex, "src");
        assert_eq!(content.replace_regex, "rep");
    }

    #[test]
    fn test_lenient_scalars() {
        let source: BookSource = serde_json::from_str(
            r#"{
                "weight": "12",
                "responseTime": null,
                "enabled": "false",
                "lastUpdateTime": 1700000000000,
                "ruleBookInfo": {"wordCount": 42, "updateTime": null, "canReName": false},
                "ruleContent": null
            }"#,
        )
        .unwrap();

        assert_eq!(source.weight, 12);
        assert_eq!(source.response_time, 1500);
        assert!(!source.enabled);
        assert_eq!(source.last_update_time, 1_700_000_000_000);
        assert_eq!(source.rule_book_info.word_count, "42");
        assert_eq!(source.rule_book_info.update_time, "");
        assert_eq!(source.rule_book_info.can_rename, "false");
        assert_eq!(source.rule_content, RuleContent::default());
    }

    #[test]
    fn test_array_explore_url_keeps_json_text() {
        let source: BookSource =
            serde_json::from_str(r#"{"exploreUrl": [{"title": "A", "url": "/a"}]}"#).unwrap();
        assert_eq!(source.explore_url, r#"[{"title":"A","url":"/a"}]"#);
    }

    #[test]
    fn test_rule_fields_locations_and_kinds() {
        let source: BookSource = serde_json::from_str(
            r#"{
                "searchUrl": "/s?q={{key}}",
                "loginUrl": "  ",
                "ruleSearch": {"bookList": "class.item"},
                "ruleContent": {"content": "id.content@html", "imageStyle": "FULL"}
            }"#,
        )
        .unwrap();

        let fields = source.rule_fields();
        let summary: Vec<(&str, TokenizerKind)> = fields
            .iter()
            .map(|field| (field.location.as_str(), field.kind))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("searchUrl", TokenizerKind::Url),
                ("ruleSearch.bookList", TokenizerKind::Rule),
                ("ruleContent.content", TokenizerKind::Rule),
            ]
        );
        assert_eq!(fields[2].text, "id.content@html");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut source = BookSource::default();
        assert_eq!(source.display_name(), "<unnamed>");
        source.url = "https://a.b".to_string();
        assert_eq!(source.display_name(), "https://a.b");
        source.name = "名".to_string();
        assert_eq!(source.display_name(), "名");
    }
}
