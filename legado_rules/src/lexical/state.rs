//! Per-call lexer state shared by every tokenizer

use super::error::LexFault;
use super::scanner;
use crate::config::compile_time::lexical::*;
use crate::tokens::TokenStream;
use std::collections::BTreeMap;

pub(crate) type LexResult<T> = Result<T, LexFault>;

/// Whether the driving loop keeps going after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

/// Counters gathered during one tokenizer run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexStats {
    pub tokens: usize,
    pub markers: usize,
    pub blocks_captured: usize,
    pub unterminated_blocks: usize,
    pub max_stack_depth: usize,
    pub max_brace_depth: usize,
    pub marker_usage: BTreeMap<String, usize>,
}

/// Token stream plus the statistics of the run that produced it
#[derive(Debug, Clone)]
pub struct Lexed {
    pub tokens: TokenStream,
    pub stats: LexStats,
}

/// Pending literal, cursor and symbol stack for one invocation
pub(crate) struct LexState {
    chars: Vec<char>,
    position: usize,
    pending: String,
    stack: Vec<&'static str>,
    tokens: Vec<String>,
    stats: LexStats,
}

impl LexState {
    pub fn new(text: &str) -> LexResult<Self> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() > MAX_RULE_LENGTH {
            return Err(LexFault::InputTooLong {
                length: chars.len(),
            });
        }

        Ok(Self {
            chars,
            position: 0,
            pending: String::new(),
            stack: Vec::new(),
            tokens: Vec::new(),
            stats: LexStats::default(),
        })
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    pub fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    pub fn previous(&self) -> Option<char> {
        self.position
            .checked_sub(1)
            .and_then(|index| self.chars.get(index).copied())
    }

    pub fn is_last(&self) -> bool {
        self.position + 1 == self.chars.len()
    }

    pub fn remaining(&self) -> usize {
        self.chars.len().saturating_sub(self.position)
    }

    pub fn matches(&self, marker: &str) -> bool {
        scanner::matches_at(&self.chars, self.position, marker)
    }

    pub fn advance(&mut self, count: usize) {
        self.position += count;
    }

    pub fn jump_to(&mut self, position: usize) {
        self.position = position;
    }

    /// Original text between two cursor positions
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        self.chars[start.min(end)..end].iter().collect()
    }

    /// Take the current character as literal text
    pub fn take_literal(&mut self) {
        if let Some(current) = self.current() {
            self.pending.push(current);
            self.position += 1;
        }
    }

    pub fn push_pending(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    pub fn flush(&mut self) -> LexResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let literal = std::mem::take(&mut self.pending);
        self.emit(literal)
    }

    pub fn emit(&mut self, token: String) -> LexResult<()> {
        if token.is_empty() {
            return Ok(());
        }
        if self.tokens.len() >= MAX_TOKEN_COUNT {
            return Err(LexFault::TooManyTokens {
                position: self.position,
            });
        }
        self.tokens.push(token);
        self.stats.tokens += 1;
        Ok(())
    }

    pub fn emit_marker(&mut self, marker: &str) -> LexResult<()> {
        self.emit(marker.to_string())?;
        self.stats.markers += 1;
        *self.stats.marker_usage.entry(marker.to_string()).or_insert(0) += 1;
        Ok(())
    }

    /// Emit a captured block span
    pub fn emit_block(&mut self, start: usize, end: usize, terminated: bool) -> LexResult<()> {
        let span = self.slice(start, end);
        self.emit(span)?;
        self.record_block(terminated);
        Ok(())
    }

    pub fn record_block(&mut self, terminated: bool) {
        self.stats.blocks_captured += 1;
        if !terminated {
            self.stats.unterminated_blocks += 1;
        }
    }

    pub fn record_brace_depth(&mut self, depth: usize) -> LexResult<()> {
        self.stats.max_brace_depth = self.stats.max_brace_depth.max(depth);
        if depth > MAX_NESTING_DEPTH {
            return Err(LexFault::NestingTooDeep {
                depth,
                position: self.position,
            });
        }
        Ok(())
    }

    pub fn push_symbol(&mut self, symbol: &'static str) -> LexResult<()> {
        let depth = self.stack.len() + 1;
        if depth > MAX_NESTING_DEPTH {
            return Err(LexFault::NestingTooDeep {
                depth,
                position: self.position,
            });
        }
        self.stack.push(symbol);
        self.stats.max_stack_depth = self.stats.max_stack_depth.max(depth);
        Ok(())
    }

    /// Pop the top symbol when it equals `expected`
    pub fn pop_if(&mut self, expected: &str) -> bool {
        if self.stack_top() == Some(expected) {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn stack_top(&self) -> Option<&'static str> {
        self.stack.last().copied()
    }

    pub fn stack_base(&self) -> Option<&'static str> {
        self.stack.first().copied()
    }

    /// Every step has to move the cursor forward without leaving the input
    pub fn ensure_progress(&self, before: usize) -> LexResult<()> {
        if self.position <= before || self.position > self.chars.len() {
            return Err(LexFault::CursorOutOfRange {
                from: before,
                to: self.position,
                length: self.chars.len(),
            });
        }
        Ok(())
    }

    pub fn finish(mut self) -> LexResult<Lexed> {
        self.flush()?;
        Ok(Lexed {
            tokens: TokenStream::from_raw(self.tokens),
            stats: self.stats,
        })
    }
}

/// A tokenizer that consumes its input one trigger character at a time
pub(crate) trait CharLexer: Sized {
    fn state(&mut self) -> &mut LexState;

    fn into_state(self) -> LexState;

    /// Handle the character under the cursor
    fn step(&mut self, current: char) -> LexResult<Flow>;

    fn run(mut self) -> LexResult<Lexed> {
        while let Some(current) = self.state().current() {
            let before = self.state().position();
            if self.step(current)? == Flow::Stop {
                break;
            }
            self.state().ensure_progress(before)?;
        }
        self.into_state().finish()
    }
}
