//! Token cursor handed to directive unmarshalers.
//!
//! # Responsibilities
//! - Walk one segment's tokens line by line
//! - Distinguish same-line arguments from the next directive line
//! - Track `{ ... }` block nesting
//! - Build fatal errors that point at the current token
//!
//! # Design Decisions
//! - The cursor starts *before* the first token; `next()` lands on it
//! - A `{` is never an argument, it opens a block

use crate::error::CompileError;
use crate::tokens::token::Token;

/// Cursor over a segment of tokens.
#[derive(Debug, Clone, Default)]
pub struct Dispenser {
    tokens: Vec<Token>,
    cursor: Option<usize>,
    nesting: usize,
}

impl Dispenser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            cursor: None,
            nesting: 0,
        }
    }

    /// Advance to the next token regardless of line. Returns false at the end.
    pub fn next(&mut self) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next < self.tokens.len() {
            self.cursor = Some(next);
            true
        } else {
            false
        }
    }

    /// Advance to the next token only if it is an argument on the current line.
    pub fn next_arg(&mut self) -> bool {
        let Some(c) = self.cursor else {
            return self.next();
        };
        match self.tokens.get(c + 1) {
            Some(next) if next.same_line(&self.tokens[c]) && next.text != "{" => {
                self.cursor = Some(c + 1);
                true
            }
            _ => false,
        }
    }

    fn next_on_same_line(&mut self) -> bool {
        let Some(c) = self.cursor else {
            return self.next();
        };
        match self.tokens.get(c + 1) {
            Some(next) if next.same_line(&self.tokens[c]) => {
                self.cursor = Some(c + 1);
                true
            }
            _ => false,
        }
    }

    fn prev(&mut self) {
        self.cursor = match self.cursor {
            Some(0) | None => None,
            Some(c) => Some(c - 1),
        };
    }

    /// Iterate the lines of a block opened on the current line.
    ///
    /// Call in a `while` loop with the nesting level seen before the loop
    /// (`self.nesting()`); each `true` leaves the cursor on the first token of
    /// a line inside the block.
    pub fn next_block(&mut self, initial_nesting: usize) -> bool {
        if self.nesting > initial_nesting {
            if !self.next() {
                return false;
            }
            match self.val() {
                "}" => self.nesting -= 1,
                "{" => self.nesting += 1,
                _ => {}
            }
            return self.nesting > initial_nesting;
        }
        if !self.next_on_same_line() {
            return false;
        }
        if self.val() != "{" {
            self.prev();
            return false;
        }
        if !self.next() || self.val() == "}" {
            return false;
        }
        self.nesting += 1;
        true
    }

    /// Current block depth.
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    /// Text of the current token, or "" before the first token.
    pub fn val(&self) -> &str {
        self.token().map_or("", |t| t.text.as_str())
    }

    pub fn token(&self) -> Option<&Token> {
        self.cursor.and_then(|c| self.tokens.get(c))
    }

    fn position_token(&self) -> Option<&Token> {
        self.token().or_else(|| self.tokens.first())
    }

    /// File of the current token (or of the segment when nothing was consumed).
    pub fn file(&self) -> &str {
        self.position_token().map_or("", |t| t.file.as_str())
    }

    /// Line of the current token (or of the segment when nothing was consumed).
    pub fn line(&self) -> usize {
        self.position_token().map_or(0, |t| t.line)
    }

    /// Consume every remaining argument on the current line.
    pub fn remaining_args(&mut self) -> Vec<String> {
        let mut args = Vec::new();
        while self.next_arg() {
            args.push(self.val().to_string());
        }
        args
    }

    /// Take the current token's line plus the block it opens, if any, and
    /// leave the cursor on the last token taken.
    pub fn next_segment(&mut self) -> Vec<Token> {
        let Some(start) = self.cursor else {
            return Vec::new();
        };
        let mut end = start;
        while end + 1 < self.tokens.len() && self.tokens[end + 1].same_line(&self.tokens[end]) {
            end += 1;
        }
        if self.tokens[end].text == "{" {
            let mut depth = 1usize;
            while depth > 0 && end + 1 < self.tokens.len() {
                end += 1;
                match self.tokens[end].text.as_str() {
                    "{" => depth += 1,
                    "}" => depth -= 1,
                    _ => {}
                }
            }
        }
        self.cursor = Some(end);
        self.tokens[start..=end].to_vec()
    }

    /// Remove the current token and step back so the following `next()` lands
    /// on the token after it.
    pub fn delete(&mut self) -> Option<Token> {
        let c = self.cursor?;
        let removed = self.tokens.remove(c);
        self.prev();
        Some(removed)
    }

    /// Rewind to before the first token.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.nesting = 0;
    }

    pub fn arg_err(&self) -> CompileError {
        CompileError::ArgumentCount {
            file: self.file().to_string(),
            line: self.line(),
            after: self.val().to_string(),
        }
    }

    pub fn errf(&self, message: impl Into<String>) -> CompileError {
        CompileError::Syntax {
            file: self.file().to_string(),
            line: self.line(),
            message: message.into(),
        }
    }

    pub fn syntax_err(&self, expected: &str) -> CompileError {
        self.errf(format!(
            "Unexpected token '{}', expecting '{}'",
            self.val(),
            expected
        ))
    }

    /// Tokens left in this segment, including ones already consumed.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}
