//! URL clause tokenizer
//!
//! Everything after `@js:` is script source and becomes one trailing token.

use super::blocks;
use super::check::{self, run_checks, Check, Outcome};
use super::state::{CharLexer, Flow, LexResult, LexState};

pub(crate) struct UrlLexer {
    state: LexState,
}

impl UrlLexer {
    pub fn new(text: &str) -> LexResult<Self> {
        Ok(Self {
            state: LexState::new(text)?,
        })
    }

    fn dispatch(&mut self, table: &[Check]) -> LexResult<Flow> {
        match run_checks(&mut self.state, table)? {
            Outcome::Matched(matched) => blocks::resume(&mut self.state, matched),
            Outcome::Literal | Outcome::NoMatch => {
                self.state.take_literal();
                Ok(Flow::Continue)
            }
        }
    }

    fn on_escape(&mut self) -> Flow {
        let width = self.state.remaining().min(2);
        let escaped = self.state.slice(self.state.position(), self.state.position() + width);
        self.state.push_pending(&escaped);
        self.state.advance(width);
        Flow::Continue
    }
}

impl CharLexer for UrlLexer {
    fn state(&mut self) -> &mut LexState {
        &mut self.state
    }

    fn into_state(self) -> LexState {
        self.state
    }

    fn step(&mut self, current: char) -> LexResult<Flow> {
        match current {
            '@' => self.dispatch(check::url::AT),
            '{' => self.dispatch(check::url::OPEN_BRACE),
            '<' => self.dispatch(check::url::ANGLE),
            '\\' => Ok(self.on_escape()),
            _ => {
                self.state.take_literal();
                Ok(Flow::Continue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tokenize_url;

    #[test]
    fn test_page_brackets() {
        assert_eq!(tokenize_url("p<1,2>").unwrap(), ["p", "<", "<1,2>"]);
        assert_eq!(tokenize_url("/list<,/{{page}}>x").unwrap().len(), 4);
    }

    #[test]
    fn test_template_block() {
        assert_eq!(
            tokenize_url("/search?q={{key}}&page={{page}}").unwrap(),
            ["/search?q=", "{{", "{{key}}", "&page=", "{{", "{{page}}"]
        );
        assert_eq!(
            tokenize_url("{{java.encode(key, {a:1})}}").unwrap(),
            ["{{", "{{java.encode(key, {a:1})}}"]
        );
    }

    #[test]
    fn test_script_remainder() {
        assert_eq!(
            tokenize_url("https://a.b/c@js:result + '?p=' + page").unwrap(),
            ["https://a.b/c", "@js:", "result + '?p=' + page"]
        );
        assert_eq!(tokenize_url("x@y").unwrap(), ["x@y"]);
    }

    #[test]
    fn test_script_tag_discarded() {
        assert_eq!(tokenize_url("<js>var a = 1</js>/path").unwrap(), ["<js>", "/path"]);
    }

    #[test]
    fn test_unterminated_blocks() {
        assert_eq!(tokenize_url("a{{b").unwrap(), ["a", "{{", "{{b"]);
        assert_eq!(tokenize_url("a<b").unwrap(), ["a", "<", "<b"]);
    }

    #[test]
    fn test_escape_and_empty() {
        assert_eq!(tokenize_url(r"a\<b").unwrap(), [r"a\<b"]);
        assert!(tokenize_url("").unwrap().is_empty());
    }
}
