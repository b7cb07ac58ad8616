//! Character cursor shared by every parser in the crate.
//!
//! A [`Scanner`] never mutates its source. `start..pos` is the current token;
//! callers backtrack by restoring `pos` (or cloning the scanner) rather than
//! keeping an undo log.

use std::rc::Rc;

use crate::error::ScannerError;

/// Anything that can decide whether a character matches: a literal `char` or
/// a predicate.
pub trait CharMatch {
    fn matches(&self, ch: char) -> bool;
}

impl CharMatch for char {
    fn matches(&self, ch: char) -> bool {
        *self == ch
    }
}

impl<F> CharMatch for F
where
    F: Fn(char) -> bool,
{
    fn matches(&self, ch: char) -> bool {
        self(ch)
    }
}

/// A cursor over the characters of an immutable string.
///
/// Positions are character offsets, not byte offsets, so error positions line
/// up with what a user sees in an editor.
#[derive(Debug, Clone)]
pub struct Scanner {
    chars: Rc<[char]>,
    /// Current read position.
    pub pos: usize,
    /// Start of the current token.
    pub start: usize,
    /// Upper bound for reading; `eof()` is relative to this.
    pub end: usize,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        let chars: Rc<[char]> = source.chars().collect();
        let end = chars.len();
        Self {
            chars,
            pos: 0,
            start: 0,
            end,
        }
    }

    /// Returns true if there is nothing left to read within the limit.
    pub fn eof(&self) -> bool {
        self.pos >= self.end
    }

    /// Creates a sub-view over `start..end` that shares the same characters
    /// and has its own `eof()` boundary.
    pub fn limit(&self, start: usize, end: usize) -> Scanner {
        let end = end.min(self.chars.len());
        Scanner {
            chars: Rc::clone(&self.chars),
            pos: start,
            start,
            end,
        }
    }

    /// Returns the character at the current position without consuming it.
    pub fn peek(&self) -> Option<char> {
        if self.eof() {
            None
        } else {
            self.chars.get(self.pos).copied()
        }
    }

    /// Consumes and returns the current character.
    pub fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    /// Consumes the current character only if it matches.
    pub fn eat(&mut self, m: impl CharMatch) -> bool {
        match self.peek() {
            Some(ch) if m.matches(ch) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// Consumes characters while they match. Returns true if anything was
    /// consumed.
    pub fn eat_while(&mut self, m: impl CharMatch) -> bool {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !m.matches(ch) {
                break;
            }
            self.pos += 1;
        }
        self.pos != start
    }

    /// Moves the read position back by `n` characters.
    pub fn back_up(&mut self, n: usize) {
        self.pos = self.pos.saturating_sub(n);
    }

    /// Returns the current token (`start..pos`).
    pub fn current(&self) -> String {
        self.substring(self.start, self.pos)
    }

    pub fn substring(&self, from: usize, to: usize) -> String {
        let to = to.min(self.chars.len());
        if from >= to {
            return String::new();
        }
        self.chars[from..to].iter().collect()
    }

    /// Character at an absolute position, ignoring the limit.
    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).copied()
    }

    /// Builds an error tagged with the current position.
    pub fn error(&self, message: impl Into<String>) -> ScannerError {
        ScannerError::new(message, self.pos)
    }

    pub fn error_at(&self, message: impl Into<String>, pos: usize) -> ScannerError {
        ScannerError::new(message, pos)
    }
}

pub fn is_number(ch: char) -> bool {
    ch.is_ascii_digit()
}

pub fn is_alpha(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

pub fn is_alpha_numeric(ch: char) -> bool {
    is_number(ch) || is_alpha(ch)
}

/// Alpha or underscore.
pub fn is_alpha_word(ch: char) -> bool {
    ch == '_' || is_alpha(ch)
}

pub fn is_alpha_numeric_word(ch: char) -> bool {
    is_number(ch) || is_alpha_word(ch)
}

/// Space, tab or non-breaking space.
pub fn is_white_space(ch: char) -> bool {
    ch == ' ' || ch == '\t' || ch == '\u{a0}'
}

/// Whitespace including line breaks.
pub fn is_space(ch: char) -> bool {
    is_white_space(ch) || ch == '\n' || ch == '\r'
}

pub fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\''
}

const ESCAPE: char = '\\';

/// Consumes a `'single'` or `"double"` quoted string including the quotes.
///
/// On success `start` is moved to the opening quote so `current()` returns the
/// whole literal. An unterminated string restores `pos` and, when `throws` is
/// set, reports an error instead of returning `false`.
pub fn eat_quoted(scanner: &mut Scanner, throws: bool) -> Result<bool, ScannerError> {
    let start = scanner.pos;
    let Some(quote) = scanner.peek() else {
        return Ok(false);
    };

    if scanner.eat(is_quote) {
        while let Some(ch) = scanner.bump() {
            if ch == quote {
                scanner.start = start;
                return Ok(true);
            }
            if ch == ESCAPE {
                scanner.bump();
            }
        }

        scanner.pos = start;
        if throws {
            return Err(scanner.error("Unable to consume quoted string"));
        }
    }

    Ok(false)
}

/// Consumes a balanced `open`..`close` pair, skipping quoted strings and
/// escaped characters inside it.
pub fn eat_pair(
    scanner: &mut Scanner,
    open: char,
    close: char,
    throws: bool,
) -> Result<bool, ScannerError> {
    let start = scanner.pos;
    if !scanner.eat(open) {
        return Ok(false);
    }

    let mut stack = 1;
    while !scanner.eof() {
        if eat_quoted(scanner, false)? {
            continue;
        }

        match scanner.bump() {
            Some(ch) if ch == open => stack += 1,
            Some(ch) if ch == close => {
                stack -= 1;
                if stack == 0 {
                    scanner.start = start;
                    return Ok(true);
                }
            }
            Some(ESCAPE) => {
                scanner.bump();
            }
            _ => {}
        }
    }

    scanner.pos = start;
    if throws {
        return Err(scanner.error(format!("Unable to find matching pair for {open}")));
    }
    Ok(false)
}
