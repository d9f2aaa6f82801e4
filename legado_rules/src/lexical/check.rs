//! Marker check engine
//!
//! Each trigger character owns an ordered table of checks; the first check
//! that applies wins. A marker check either matches completely (stack action
//! applied, pending literal flushed, marker emitted, cursor moved past it) or
//! leaves the state untouched so the next entry can be tried.

use super::state::{LexResult, LexState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackAction {
    Keep,
    /// Push the marker itself
    Push,
    /// Only match while `expected` is on top, and pop it
    PopIf(&'static str),
}

/// Extra precondition evaluated after the marker text matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Always,
    /// `text` directly follows the marker and at least `min_after`
    /// characters remain after it
    FollowedBy {
        text: &'static str,
        min_after: usize,
    },
    StackBaseIsOrEmpty(&'static str),
}

/// What the tokenizer does once a marker has been emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    /// Capture from the marker through the first `char`
    CaptureThrough(char),
    /// Capture a `{{...}}` block until brace depth returns to zero
    CaptureBalanced,
    /// Capture a `{{...}}` block up to the closing sentinel
    CaptureSentinel(&'static str),
    /// Script source up to `###`
    ScriptBody,
    /// Regex body up to `###`, or the whole input after an embedded `@js:`
    RegexBody,
    /// Drop everything through the sentinel
    DiscardUntil(&'static str),
    /// Emit the rest of the input as one token and stop
    Remainder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerCheck {
    pub marker: &'static str,
    pub guard: Guard,
    pub stack: StackAction,
    pub then: Continuation,
}

impl MarkerCheck {
    pub const fn plain(marker: &'static str) -> Self {
        Self {
            marker,
            guard: Guard::Always,
            stack: StackAction::Keep,
            then: Continuation::Continue,
        }
    }

    pub const fn pushing(marker: &'static str, then: Continuation) -> Self {
        Self {
            marker,
            guard: Guard::Always,
            stack: StackAction::Push,
            then,
        }
    }

    pub const fn then(mut self, then: Continuation) -> Self {
        self.then = then;
        self
    }

    pub const fn guarded(mut self, guard: Guard) -> Self {
        self.guard = guard;
        self
    }
}

/// Conditions under which the trigger character is plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralGuard {
    PreviousCharIs(char),
    StackTopIs(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Marker(MarkerCheck),
    LiteralIf(LiteralGuard),
}

/// A marker that matched and was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matched {
    /// Cursor position of the marker's first character
    pub start: usize,
    pub marker: &'static str,
    pub then: Continuation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Matched(Matched),
    /// A literal guard fired; the trigger is text
    Literal,
    /// Nothing in the table applied
    NoMatch,
}

fn guard_holds(state: &LexState, check: &MarkerCheck) -> bool {
    match check.guard {
        Guard::Always => true,
        Guard::FollowedBy { text, min_after } => {
            let after = state.position() + check.marker.chars().count();
            state.len().saturating_sub(after) >= min_after
                && super::scanner::matches_at(state.chars(), after, text)
        }
        Guard::StackBaseIsOrEmpty(base) => state.stack_base().map_or(true, |b| b == base),
    }
}

/// Try one marker at the cursor
pub(crate) fn try_marker(state: &mut LexState, check: &MarkerCheck) -> LexResult<Option<Matched>> {
    if !state.matches(check.marker) || !guard_holds(state, check) {
        return Ok(None);
    }

    match check.stack {
        StackAction::Keep => {}
        StackAction::Push => state.push_symbol(check.marker)?,
        StackAction::PopIf(expected) => {
            if !state.pop_if(expected) {
                return Ok(None);
            }
        }
    }

    let start = state.position();
    state.flush()?;
    state.emit_marker(check.marker)?;
    state.advance(check.marker.chars().count());

    Ok(Some(Matched {
        start,
        marker: check.marker,
        then: check.then,
    }))
}

fn literal_guard_holds(state: &LexState, guard: LiteralGuard) -> bool {
    match guard {
        LiteralGuard::PreviousCharIs(expected) => state.previous() == Some(expected),
        LiteralGuard::StackTopIs(symbol) => state.stack_top() == Some(symbol),
    }
}

pub(crate) fn run_checks(state: &mut LexState, table: &[Check]) -> LexResult<Outcome> {
    for check in table {
        match check {
            Check::Marker(marker) => {
                if let Some(matched) = try_marker(state, marker)? {
                    return Ok(Outcome::Matched(matched));
                }
            }
            Check::LiteralIf(guard) => {
                if literal_guard_holds(state, *guard) {
                    return Ok(Outcome::Literal);
                }
            }
        }
    }
    Ok(Outcome::NoMatch)
}

/// Core tokenizer tables, one per trigger character
pub mod rule {
    use super::*;

    pub static AT: &[Check] = &[
        Check::Marker(MarkerCheck::pushing("@get:{", Continuation::CaptureThrough('}'))),
        Check::Marker(MarkerCheck::pushing("@put:{", Continuation::CaptureThrough('}'))),
        Check::Marker(MarkerCheck::plain("@css:")),
        Check::Marker(MarkerCheck::pushing("@json:", Continuation::Continue)),
        Check::Marker(MarkerCheck::plain("@@")),
        Check::Marker(MarkerCheck::plain("@js:").then(Continuation::ScriptBody)),
        Check::LiteralIf(LiteralGuard::PreviousCharIs('[')),
        Check::LiteralIf(LiteralGuard::StackTopIs("@json:")),
        Check::Marker(MarkerCheck::plain("@")),
    ];

    pub static OPEN_BRACE: &[Check] = &[
        Check::Marker(MarkerCheck::pushing("{{", Continuation::CaptureBalanced)),
        Check::Marker(
            MarkerCheck::pushing("{", Continuation::Continue).guarded(Guard::FollowedBy {
                text: "$.",
                min_after: 4,
            }),
        ),
    ];

    pub static CLOSE_BRACE: &[Check] = &[Check::Marker(MarkerCheck {
        marker: "}",
        guard: Guard::Always,
        stack: StackAction::PopIf("{"),
        then: Continuation::Continue,
    })];

    pub static PIPE: &[Check] = &[
        Check::LiteralIf(LiteralGuard::StackTopIs("{{")),
        Check::Marker(MarkerCheck::plain("||")),
    ];

    pub static AMPERSAND: &[Check] = &[Check::Marker(
        MarkerCheck::plain("&&").guarded(Guard::StackBaseIsOrEmpty("@json:")),
    )];

    pub static PERCENT: &[Check] = &[Check::Marker(
        MarkerCheck::plain("%%").guarded(Guard::StackBaseIsOrEmpty("@json:")),
    )];

    pub static ANGLE: &[Check] = &[Check::Marker(MarkerCheck::pushing(
        "<js>",
        Continuation::DiscardUntil("</js>"),
    ))];

    pub static HASH: &[Check] = &[
        Check::Marker(MarkerCheck::plain("####")),
        Check::Marker(MarkerCheck::plain("##").then(Continuation::RegexBody)),
    ];
}

/// URL tokenizer tables
pub mod url {
    use super::*;

    pub static AT: &[Check] = &[Check::Marker(
        MarkerCheck::plain("@js:").then(Continuation::Remainder),
    )];

    pub static OPEN_BRACE: &[Check] = &[Check::Marker(MarkerCheck::pushing(
        "{{",
        Continuation::CaptureSentinel("}}"),
    ))];

    pub static ANGLE: &[Check] = &[
        Check::Marker(MarkerCheck::pushing("<js>", Continuation::DiscardUntil("</js>"))),
        Check::Marker(MarkerCheck::pushing("<", Continuation::CaptureThrough('>'))),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_check_leaves_state_untouched() {
        let mut state = LexState::new("ab}").unwrap();
        state.take_literal();
        state.take_literal();

        let outcome = run_checks(&mut state, rule::CLOSE_BRACE).unwrap();
        assert_eq!(outcome, Outcome::NoMatch);
        assert_eq!(state.position(), 2);

        state.take_literal();
        let lexed = state.finish().unwrap();
        assert_eq!(lexed.tokens, ["ab}"]);
    }

    #[test]
    fn test_match_flushes_then_emits_marker() {
        let mut state = LexState::new("x@css:y").unwrap();
        state.take_literal();

        let outcome = run_checks(&mut state, rule::AT).unwrap();
        assert_eq!(
            outcome,
            Outcome::Matched(Matched {
                start: 1,
                marker: "@css:",
                then: Continuation::Continue,
            })
        );
        assert_eq!(state.position(), 6);

        let lexed = state.finish().unwrap();
        assert_eq!(lexed.tokens, ["x", "@css:"]);
        assert_eq!(lexed.stats.markers, 1);
    }

    #[test]
    fn test_longer_markers_win() {
        let mut state = LexState::new("####").unwrap();
        let outcome = run_checks(&mut state, rule::HASH).unwrap();
        assert!(matches!(outcome, Outcome::Matched(Matched { marker: "####", .. })));
    }

    #[test]
    fn test_json_brace_needs_enough_lookahead() {
        let mut short = LexState::new("{$.a").unwrap();
        assert_eq!(run_checks(&mut short, rule::OPEN_BRACE).unwrap(), Outcome::NoMatch);

        let mut long = LexState::new("{$.ab").unwrap();
        let outcome = run_checks(&mut long, rule::OPEN_BRACE).unwrap();
        assert!(matches!(outcome, Outcome::Matched(Matched { marker: "{", .. })));
        assert_eq!(long.stack_top(), Some("{"));
    }

    #[test]
    fn test_join_guard_blocks_inside_foreign_stack() {
        let mut state = LexState::new("&&").unwrap();
        state.push_symbol("{").unwrap();
        assert_eq!(run_checks(&mut state, rule::AMPERSAND).unwrap(), Outcome::NoMatch);

        let mut json = LexState::new("&&").unwrap();
        json.push_symbol("@json:").unwrap();
        json.push_symbol("{").unwrap();
        assert!(matches!(
            run_checks(&mut json, rule::AMPERSAND).unwrap(),
            Outcome::Matched(_)
        ));
    }

    #[test]
    fn test_literal_guard_short_circuits() {
        let mut state = LexState::new("a|").unwrap();
        state.take_literal();
        state.push_symbol("{{").unwrap();

        assert_eq!(run_checks(&mut state, rule::PIPE).unwrap(), Outcome::Literal);
    }
}
