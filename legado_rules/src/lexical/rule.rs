//! Core tokenizer for rule bodies

use super::blocks;
use super::check::{self, run_checks, Check, Outcome};
use super::state::{CharLexer, Flow, LexResult, LexState};

pub(crate) struct RuleLexer {
    state: LexState,
}

impl RuleLexer {
    pub fn new(text: &str) -> LexResult<Self> {
        Ok(Self {
            state: LexState::new(text)?,
        })
    }

    /// Run a trigger table; anything it does not claim is literal text
    fn dispatch(&mut self, table: &[Check]) -> LexResult<Flow> {
        match run_checks(&mut self.state, table)? {
            Outcome::Matched(matched) => blocks::resume(&mut self.state, matched),
            Outcome::Literal | Outcome::NoMatch => Ok(self.literal()),
        }
    }

    fn literal(&mut self) -> Flow {
        self.state.take_literal();
        Flow::Continue
    }

    /// `&&` and `%%`; a trigger in the last position ends the scan
    fn on_join(&mut self, table: &[Check]) -> LexResult<Flow> {
        if self.state.is_last() {
            self.state.take_literal();
            return Ok(Flow::Stop);
        }
        self.dispatch(table)
    }

    fn on_escape(&mut self) -> Flow {
        let width = self.state.remaining().min(2);
        let escaped = self.state.slice(self.state.position(), self.state.position() + width);
        self.state.push_pending(&escaped);
        self.state.advance(width);
        Flow::Continue
    }

    /// `$1`..`$9` back-references
    fn on_dollar(&mut self) -> LexResult<Flow> {
        if self.state.is_last() {
            self.state.take_literal();
            return Ok(Flow::Stop);
        }

        match self.state.peek(1) {
            Some(digit) if digit.is_numeric() => {
                self.state.flush()?;
                self.state.emit(format!("${}", digit))?;
                self.state.advance(2);
                Ok(Flow::Continue)
            }
            _ => Ok(self.literal()),
        }
    }

    /// Operators that only mean something near the start of a rule
    fn on_leading(&mut self, current: char) -> LexResult<Flow> {
        let position = self.state.position();
        let leading = match current {
            '+' | '-' => position == 0,
            ':' => position <= 1,
            _ => false,
        };
        if !leading {
            return Ok(self.literal());
        }

        self.state.flush()?;
        self.state.emit_marker(current.encode_utf8(&mut [0; 4]))?;
        self.state.advance(1);
        Ok(Flow::Continue)
    }
}

impl CharLexer for RuleLexer {
    fn state(&mut self) -> &mut LexState {
        &mut self.state
    }

    fn into_state(self) -> LexState {
        self.state
    }

    fn step(&mut self, current: char) -> LexResult<Flow> {
        match current {
            '@' => self.dispatch(check::rule::AT),
            '{' => self.dispatch(check::rule::OPEN_BRACE),
            '}' => self.dispatch(check::rule::CLOSE_BRACE),
            '|' => self.dispatch(check::rule::PIPE),
            '&' => self.on_join(check::rule::AMPERSAND),
            '%' => self.on_join(check::rule::PERCENT),
            '<' => self.dispatch(check::rule::ANGLE),
            '\\' => Ok(self.on_escape()),
            '+' | '-' | ':' => self.on_leading(current),
            '#' => self.dispatch(check::rule::HASH),
            '$' => self.on_dollar(),
            _ => Ok(self.literal()),
        }
    }
}
