//! Tokenizer for `{{...}}` format strings

use super::blocks;
use super::check::{self, run_checks, Outcome};
use super::state::{CharLexer, Flow, LexResult, LexState};

pub(crate) struct InnerLexer {
    state: LexState,
}

impl InnerLexer {
    pub fn new(text: &str) -> LexResult<Self> {
        Ok(Self {
            state: LexState::new(text)?,
        })
    }

    /// A single `{` only tracks nesting; the text stays literal
    fn on_open_brace(&mut self) -> LexResult<Flow> {
        match run_checks(&mut self.state, check::url::OPEN_BRACE)? {
            Outcome::Matched(matched) => blocks::resume(&mut self.state, matched),
            Outcome::Literal | Outcome::NoMatch => {
                self.state.push_symbol("{")?;
                self.state.take_literal();
                Ok(Flow::Continue)
            }
        }
    }

    fn on_close_brace(&mut self) -> Flow {
        self.state.pop_if("{");
        self.state.take_literal();
        Flow::Continue
    }
}

impl CharLexer for InnerLexer {
    fn state(&mut self) -> &mut LexState {
        &mut self.state
    }

    fn into_state(self) -> LexState {
        self.state
    }

    fn step(&mut self, current: char) -> LexResult<Flow> {
        match current {
            '{' => self.on_open_brace(),
            '}' => Ok(self.on_close_brace()),
            _ => {
                self.state.take_literal();
                Ok(Flow::Continue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{lex, tokenize_inner, TokenizerKind};

    #[test]
    fn test_only_double_braces_split() {
        assert_eq!(
            tokenize_inner("第{{index}}章 {name}").unwrap(),
            ["第", "{{", "{{index}}", "章 {name}"]
        );
    }

    #[test]
    fn test_nested_single_braces_inside_block() {
        assert_eq!(
            tokenize_inner("{{a{b}}}c").unwrap(),
            ["{{", "{{a{b}}}", "c"]
        );
    }

    #[test]
    fn test_single_braces_are_tracked() {
        let lexed = lex(TokenizerKind::Inner, "{a{b}}").unwrap();
        assert_eq!(lexed.tokens, ["{a{b}}"]);
        assert_eq!(lexed.stats.max_stack_depth, 2);
    }

    #[test]
    fn test_empty() {
        assert!(tokenize_inner("").unwrap().is_empty());
    }
}
