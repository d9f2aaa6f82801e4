use legado_rules::classify::{classify, classify_group, RuleType};
use legado_rules::lexical::{self, TokenizerKind};
use legado_rules::tokens::TokenStream;
use proptest::prelude::*;

const ALL_KINDS: [TokenizerKind; 4] = [
    TokenizerKind::Rule,
    TokenizerKind::Url,
    TokenizerKind::Inner,
    TokenizerKind::Page,
];

/// Rule-ish text with every trigger character
fn rule_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9{}<>@#&|%+:$\\\\,./\\[\\] -]{0,48}"
}

/// Text whose markers all reproduce their own input
fn round_trip_text() -> impl Strategy<Value = String> {
    "[a-z0-9@#&|%+:$. /\\[\\]-]{0,48}"
}

proptest! {
    #[test]
    fn no_tokenizer_emits_empty_tokens(text in rule_text()) {
        for kind in ALL_KINDS {
            let tokens = lexical::tokenize_with(kind, &text);
            prop_assert!(tokens.is_ok(), "{} failed on {:?}", kind, text);
            let tokens = tokens.unwrap();
            prop_assert!(tokens.iter().all(|t| !t.is_empty()), "{} on {:?}: {:?}", kind, text, tokens);
        }
    }

    #[test]
    fn core_tokens_concatenate_to_input(text in round_trip_text()) {
        let tokens = lexical::tokenize(&text).unwrap();
        prop_assert_eq!(tokens.concat(), text);
    }

    #[test]
    fn url_and_inner_tokens_concatenate_to_input(text in round_trip_text()) {
        prop_assert_eq!(lexical::tokenize_url(&text).unwrap().concat(), text.clone());
        prop_assert_eq!(lexical::tokenize_inner(&text).unwrap().concat(), text);
    }

    #[test]
    fn escaped_character_stays_literal(escaped in any::<char>()) {
        let text = format!("a\\{}b", escaped);
        let tokens = lexical::tokenize(&text).unwrap();
        prop_assert_eq!(tokens.into_vec(), vec![text]);
    }

    #[test]
    fn page_split_matches_comma_split(pieces in prop::collection::vec("[a-z0-9 ./]{0,8}", 0..8)) {
        let text = pieces.join(",");
        let expected: Vec<String> = pieces.into_iter().filter(|p| !p.is_empty()).collect();
        prop_assert_eq!(lexical::split_page(&text).unwrap().into_vec(), expected);
    }

    #[test]
    fn filtering_is_idempotent(raw in prop::collection::vec("[a-z@]{0,3}", 0..12)) {
        let once = TokenStream::from_raw(raw).filtered();
        let twice = once.clone().filtered();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn classifiers_are_total(text in rule_text(), end_rule in any::<bool>(), json in any::<bool>()) {
        let tokens = lexical::tokenize(&text).unwrap();
        for index in 0..tokens.len() {
            let flat = classify(&tokens[..], index, end_rule, json);
            prop_assert!(RuleType::ALL.contains(&flat));
            let grouped = classify_group(&tokens[..], index);
            prop_assert!(RuleType::ALL.contains(&grouped));
        }
        prop_assert_eq!(classify(&tokens[..], tokens.len(), end_rule, json), RuleType::Unknown);
    }
}
