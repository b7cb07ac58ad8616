//! Tabstop fields: `$1`, `${1}` and `${1:placeholder}`.
//!
//! [`parse`] strips fields out of a string and remembers where they were;
//! [`mark`] puts them back with any token format the caller wants. Host
//! editors use this to translate the engine's output into their own snippet
//! syntax, and the output stage uses it to renumber fields.

use serde::Serialize;

use crate::error::ScannerError;
use crate::scanner::{Scanner, is_number};

const DOLLAR: char = '$';
const COLON: char = ':';
const ESCAPE: char = '\\';
const OPEN_BRACE: char = '{';
const CLOSE_BRACE: char = '}';

/// A single tabstop found in a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub index: usize,
    pub placeholder: String,
    /// Character offset in the *clean* (field-free) string.
    pub location: usize,
}

impl Field {
    pub fn new(index: usize, placeholder: impl Into<String>, location: usize) -> Self {
        Self {
            index,
            placeholder: placeholder.into(),
            location,
        }
    }

    fn end(&self) -> usize {
        self.location + self.placeholder.chars().count()
    }
}

/// Result of [`parse`]: the field-free text plus the fields that were in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldString {
    pub value: String,
    pub fields: Vec<Field>,
}

impl FieldString {
    /// Re-inserts fields using the default `${index:placeholder}` token.
    pub fn mark(&self) -> String {
        mark(&self.value, &self.fields, default_token)
    }

    pub fn mark_with<F>(&self, token: F) -> String
    where
        F: Fn(usize, &str) -> String,
    {
        mark(&self.value, &self.fields, token)
    }
}

/// Finds fields in `text`.
///
/// An escaped `\$` is passed through (backslash included) and never starts a
/// field. Placeholders may contain balanced braces; an unbalanced `{` inside a
/// placeholder is an error.
pub fn parse(text: &str) -> Result<FieldString, ScannerError> {
    let mut stream = Scanner::new(text);
    let mut fields = Vec::new();
    let mut clean = String::new();
    let mut clean_len = 0;
    let mut offset = 0;

    while !stream.eof() {
        let pos = stream.pos;

        if stream.eat(ESCAPE) {
            stream.bump();
        } else if let Some(field) = consume_field(&mut stream, clean_len + pos - offset)? {
            let prefix = stream.substring(offset, pos);
            clean_len += prefix.chars().count() + field.placeholder.chars().count();
            clean.push_str(&prefix);
            clean.push_str(&field.placeholder);
            fields.push(field);
            offset = stream.pos;
        } else {
            stream.bump();
        }
    }

    clean.push_str(&stream.substring(offset, stream.end));
    Ok(FieldString {
        value: clean,
        fields,
    })
}

/// Wraps each field range of `text` with the token produced by `token`.
///
/// Fields are emitted ordered by their end position and then by their order
/// in `fields`, so several fields at the same location keep the order the
/// caller gave them. Field ranges must not overlap.
pub fn mark<F>(text: &str, fields: &[Field], token: F) -> String
where
    F: Fn(usize, &str) -> String,
{
    let chars: Vec<char> = text.chars().collect();
    let mut ordered: Vec<(usize, &Field)> = fields.iter().enumerate().collect();
    ordered.sort_by(|(ao, a), (bo, b)| a.end().cmp(&b.end()).then(ao.cmp(bo)));

    let slice = |from: usize, to: usize| -> String {
        let to = to.min(chars.len());
        if from >= to {
            String::new()
        } else {
            chars[from..to].iter().collect()
        }
    };

    let mut out = String::new();
    let mut offset = 0;
    for (_, field) in ordered {
        let placeholder = slice(field.location, field.end());
        out.push_str(&slice(offset, field.location));
        out.push_str(&token(field.index, &placeholder));
        offset = field.end();
    }

    out.push_str(&slice(offset, chars.len()));
    out
}

/// `${index:placeholder}`, or `${index}` when the placeholder is empty.
pub fn default_token(index: usize, placeholder: &str) -> String {
    if placeholder.is_empty() {
        format!("${{{index}}}")
    } else {
        format!("${{{index}:{placeholder}}}")
    }
}

/// Adds `offset` to every non-zero field index in `text` and returns the
/// rewritten text with the highest index found before shifting. `${0}` marks
/// the final caret position and keeps its index.
pub fn shift_indices(text: &str, offset: usize) -> Result<(String, usize), ScannerError> {
    let mut parsed = parse(text)?;
    let max = parsed.fields.iter().map(|f| f.index).max().unwrap_or(0);
    if offset > 0 {
        for field in parsed.fields.iter_mut().filter(|f| f.index > 0) {
            field.index += offset;
        }
    }
    Ok((parsed.mark(), max))
}

/// Consumes `$index`, `${index}` or `${index:placeholder}` at the current
/// position. Restores the position and returns `None` when there is no field.
fn consume_field(stream: &mut Scanner, location: usize) -> Result<Option<Field>, ScannerError> {
    let start = stream.pos;

    if stream.eat(DOLLAR) {
        if let Some(index) = consume_index(stream) {
            return Ok(Some(Field::new(index, "", location)));
        }

        if stream.eat(OPEN_BRACE)
            && let Some(index) = consume_index(stream)
        {
            let mut placeholder = String::new();
            if stream.eat(COLON) {
                placeholder = consume_placeholder(stream)?;
            }

            if stream.eat(CLOSE_BRACE) {
                return Ok(Some(Field::new(index, placeholder, location)));
            }
        }
    }

    stream.pos = start;
    Ok(None)
}

fn consume_placeholder(stream: &mut Scanner) -> Result<String, ScannerError> {
    let mut stack = Vec::new();
    stream.start = stream.pos;

    while let Some(ch) = stream.peek() {
        if ch == OPEN_BRACE {
            stack.push(stream.pos);
        } else if ch == CLOSE_BRACE {
            if stack.pop().is_none() {
                break;
            }
        }
        stream.bump();
    }

    if let Some(pos) = stack.pop() {
        stream.pos = pos;
        return Err(stream.error("Unable to find matching \"}\" for curly brace"));
    }

    Ok(stream.current())
}

fn consume_index(stream: &mut Scanner) -> Option<usize> {
    stream.start = stream.pos;
    if stream.eat_while(is_number) {
        stream.current().parse().ok()
    } else {
        None
    }
}
