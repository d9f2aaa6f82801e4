//! Continuations run after a block-opening marker has been emitted

use super::check::{Continuation, Matched};
use super::scanner::{find_sentinel, scan_block, BlockSpec};
use super::state::{Flow, LexResult, LexState};

const SCRIPT_END: &str = "###";
const REGEX_PAIR: &str = "##";
const SCRIPT_MARKER: &str = "@js:";

pub(crate) fn resume(state: &mut LexState, matched: Matched) -> LexResult<Flow> {
    match matched.then {
        Continuation::Continue => Ok(Flow::Continue),
        Continuation::CaptureThrough(close) => capture_through(state, matched, close),
        Continuation::CaptureBalanced => {
            capture_block(state, matched, BlockSpec::balanced('{', '}', 2))
        }
        Continuation::CaptureSentinel(sentinel) => {
            capture_block(state, matched, BlockSpec::sentinel('{', '}', sentinel))
        }
        Continuation::ScriptBody => script_body(state),
        Continuation::RegexBody => regex_body(state),
        Continuation::DiscardUntil(sentinel) => discard_until(state, matched, sentinel),
        Continuation::Remainder => {
            let rest = state.slice(state.position(), state.len());
            state.emit(rest)?;
            state.jump_to(state.len());
            Ok(Flow::Stop)
        }
    }
}

fn capture_through(state: &mut LexState, matched: Matched, close: char) -> LexResult<Flow> {
    let from = state.position();
    let closing = state.chars()[from..].iter().position(|c| *c == close);

    let (end, terminated) = match closing {
        Some(offset) => (from + offset + 1, true),
        None => (state.len(), false),
    };
    if terminated {
        state.pop_if(matched.marker);
    }

    state.emit_block(matched.start, end, terminated)?;
    state.jump_to(end);
    Ok(Flow::Continue)
}

fn capture_block(state: &mut LexState, matched: Matched, spec: BlockSpec) -> LexResult<Flow> {
    let scan = scan_block(state.chars(), state.position(), &spec);
    state.record_brace_depth(scan.max_depth)?;
    if scan.terminated {
        state.pop_if(matched.marker);
    }

    state.emit_block(matched.start, scan.end, scan.terminated)?;
    state.jump_to(scan.end);
    Ok(Flow::Continue)
}

/// Emit the body between the cursor and `body_end`, then the `###` closer if found
fn emit_body(state: &mut LexState, body_end: usize, closed: bool) -> LexResult<Flow> {
    let body = state.slice(state.position(), body_end);
    state.emit(body)?;

    if closed {
        state.emit_marker(SCRIPT_END)?;
        state.jump_to(body_end + SCRIPT_END.len());
    } else {
        state.jump_to(body_end);
    }
    Ok(Flow::Continue)
}

/// `@js:` source; a `##` inside it is skipped with the character after it
fn script_body(state: &mut LexState) -> LexResult<Flow> {
    let mut cursor = state.position();

    loop {
        match find_sentinel(state.chars(), cursor, &[SCRIPT_END, REGEX_PAIR]) {
            Some((at, SCRIPT_END)) => return emit_body(state, at, true),
            Some((at, _)) => cursor = at + REGEX_PAIR.len() + 1,
            None => return emit_body(state, state.len(), false),
        }
    }
}

/// `##pattern##replacement###`; an embedded `@js:` takes the rest of the input
fn regex_body(state: &mut LexState) -> LexResult<Flow> {
    let mut cursor = state.position();

    loop {
        match find_sentinel(state.chars(), cursor, &[SCRIPT_END, REGEX_PAIR, SCRIPT_MARKER]) {
            Some((at, SCRIPT_END)) => return emit_body(state, at, true),
            Some((at, SCRIPT_MARKER)) => return script_tail(state, at),
            Some((at, _)) => cursor = at + REGEX_PAIR.len() + 1,
            None => return emit_body(state, state.len(), false),
        }
    }
}

/// Body up to `at`, the `@js:` marker, then everything after it as one token
fn script_tail(state: &mut LexState, at: usize) -> LexResult<Flow> {
    let body = state.slice(state.position(), at);
    state.emit(body)?;
    state.emit_marker(SCRIPT_MARKER)?;

    let source_start = at + SCRIPT_MARKER.len();
    let source = state.slice(source_start, state.len());
    state.emit(source)?;
    state.jump_to(state.len());
    Ok(Flow::Stop)
}

fn discard_until(state: &mut LexState, matched: Matched, sentinel: &'static str) -> LexResult<Flow> {
    match find_sentinel(state.chars(), state.position(), &[sentinel]) {
        Some((at, _)) => {
            state.pop_if(matched.marker);
            state.record_block(true);
            state.jump_to(at + sentinel.chars().count());
        }
        None => {
            state.record_block(false);
            state.jump_to(state.len());
        }
    }
    Ok(Flow::Continue)
}
