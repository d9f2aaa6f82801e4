//! Comma splitter for page lists
//!
//! Commas inside a `{{...}}` span never split.

use super::scanner::{scan_block, BlockSpec};
use super::state::{CharLexer, Flow, LexResult, LexState};

const TEMPLATE_OPEN: &str = "{{";

pub(crate) struct PageSplitter {
    state: LexState,
}

impl PageSplitter {
    pub fn new(text: &str) -> LexResult<Self> {
        Ok(Self {
            state: LexState::new(text)?,
        })
    }

    fn on_open_brace(&mut self) -> LexResult<Flow> {
        if self.state.is_last() {
            self.state.take_literal();
            return Ok(Flow::Stop);
        }
        if !self.state.matches(TEMPLATE_OPEN) {
            self.state.take_literal();
            return Ok(Flow::Continue);
        }

        let start = self.state.position();
        let scan = scan_block(
            self.state.chars(),
            start + TEMPLATE_OPEN.len(),
            &BlockSpec::sentinel('{', '}', "}}"),
        );
        self.state.record_brace_depth(scan.max_depth)?;
        self.state.record_block(scan.terminated);

        let span = self.state.slice(start, scan.end);
        self.state.push_pending(&span);
        self.state.jump_to(scan.end);
        Ok(Flow::Continue)
    }

    fn on_comma(&mut self) -> LexResult<Flow> {
        self.state.flush()?;
        self.state.advance(1);
        Ok(Flow::Continue)
    }
}

impl CharLexer for PageSplitter {
    fn state(&mut self) -> &mut LexState {
        &mut self.state
    }

    fn into_state(self) -> LexState {
        self.state
    }

    fn step(&mut self, current: char) -> LexResult<Flow> {
        match current {
            '{' => self.on_open_brace(),
            ',' => self.on_comma(),
            _ => {
                self.state.take_literal();
                Ok(Flow::Continue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::split_page;

    #[test]
    fn test_commas_split_outside_templates() {
        assert_eq!(split_page("1,2,3").unwrap(), ["1", "2", "3"]);
        assert_eq!(split_page(",a,,b,").unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_commas_inside_templates_do_not_split() {
        assert_eq!(
            split_page("/p/{{page}},/p/{{java.max(1,page)}}").unwrap(),
            ["/p/{{page}}", "/p/{{java.max(1,page)}}"]
        );
        assert_eq!(split_page("{{a,{b,c}}},d").unwrap(), ["{{a,{b,c}}}", "d"]);
    }

    #[test]
    fn test_unterminated_template_keeps_rest() {
        assert_eq!(split_page("a,{{b,c").unwrap(), ["a", "{{b,c"]);
        assert_eq!(split_page("a{").unwrap(), ["a{"]);
    }

    #[test]
    fn test_empty() {
        assert!(split_page("").unwrap().is_empty());
    }
}
