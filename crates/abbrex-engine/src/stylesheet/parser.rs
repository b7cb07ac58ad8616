//! Parser for stylesheet abbreviations such as `p10-20`, `bd1-s-blue`,
//! `c#f.5`, `-wm-trf` or `m0+p10!`.

use serde::Serialize;

use super::value::{Color, CssValue};
use crate::error::{ExpandError, ScannerError};
use crate::scanner::{
    Scanner, eat_quoted, is_alpha, is_alpha_numeric_word, is_alpha_word, is_number, is_white_space,
};

/// Vendor prefix request written in front of a property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum Prefixes {
    #[default]
    None,
    /// `-prop`: every configured prefix that supports the property.
    All,
    /// `-wm-prop`: only the listed prefix letters.
    Explicit(Vec<char>),
}

/// One `+`-separated item of a stylesheet abbreviation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CssProperty {
    /// Snippet or property shorthand; `None` when the item is a bare value.
    pub name: Option<String>,
    pub prefixes: Prefixes,
    pub value: Vec<CssValue>,
    pub important: bool,
}

/// Parses a stylesheet abbreviation. `vendor_letters` lists the characters
/// that may appear in an explicit prefix list (`-wm-`).
pub fn parse(abbr: &str, vendor_letters: &str) -> Result<Vec<CssProperty>, ExpandError> {
    let mut stream = Scanner::new(abbr.trim());
    let mut properties = Vec::new();

    while !stream.eof() {
        let prefixes = consume_prefixes(&mut stream, vendor_letters);
        let name = consume_ident(&mut stream);
        let value = consume_value(&mut stream)?;
        let important = stream.eat('!');

        properties.push(CssProperty {
            name,
            prefixes,
            value,
            important,
        });

        if !stream.eat('+') {
            break;
        }
    }

    if !stream.eof() {
        return Err(stream.error("Unexpected character").into());
    }

    Ok(properties)
}

fn consume_prefixes(stream: &mut Scanner, vendor_letters: &str) -> Prefixes {
    let pos = stream.pos;
    if stream.peek() != Some('-') || !stream.char_at(pos + 1).is_some_and(is_alpha) {
        return Prefixes::None;
    }

    let mut letters = Vec::new();
    let mut cursor = pos + 1;
    while let Some(ch) = stream.char_at(cursor).filter(|ch| vendor_letters.contains(*ch)) {
        letters.push(ch);
        cursor += 1;
    }

    if !letters.is_empty()
        && stream.char_at(cursor) == Some('-')
        && stream.char_at(cursor + 1).is_some_and(is_alpha)
    {
        stream.pos = cursor + 1;
        return Prefixes::Explicit(letters);
    }

    stream.pos = pos + 1;
    Prefixes::All
}

fn consume_ident(stream: &mut Scanner) -> Option<String> {
    stream.start = stream.pos;
    stream.eat_while(|ch: char| matches!(ch, '@' | '$' | '!'));
    stream.eat_while(is_alpha_word);
    (stream.start != stream.pos).then(|| stream.current())
}

fn consume_value(stream: &mut Scanner) -> Result<Vec<CssValue>, ScannerError> {
    let mut values = Vec::new();

    while !stream.eof() {
        stream.eat(':');

        let token = match consume_number(stream) {
            Some(number) => Some(number),
            None => consume_color(stream)?,
        };

        let token = match token {
            Some(token) => {
                // a dash after a unit-less number or a color separates values
                if matches!(token, CssValue::Color(_)) || token.is_unitless_number() {
                    stream.eat('-');
                }
                Some(token)
            }
            None => {
                stream.eat('-');
                match consume_quoted(stream)? {
                    Some(quoted) => Some(quoted),
                    None => consume_keyword_or_function(stream, true)?,
                }
            }
        };

        match token {
            Some(token) => values.push(token),
            None => break,
        }
    }

    Ok(values)
}

/// `-?digits(.digits)?` followed by `%` or an alpha unit. A lone dash or a
/// dot without digits is not consumed.
fn consume_number(stream: &mut Scanner) -> Option<CssValue> {
    let start = stream.pos;
    stream.start = start;
    stream.eat('-');
    let after_sign = stream.pos;

    stream.eat_while(is_number);
    let before_dot = stream.pos;
    if stream.eat('.') && !stream.eat_while(is_number) {
        stream.pos = before_dot;
    }

    if stream.pos == after_sign {
        stream.pos = start;
        return None;
    }

    let value = stream.current().parse::<f64>().ok()?;
    stream.start = stream.pos;
    if !stream.eat('%') {
        stream.eat_while(is_alpha_word);
    }

    Some(CssValue::number(value, stream.current()))
}

fn consume_color(stream: &mut Scanner) -> Result<Option<CssValue>, ScannerError> {
    if stream.peek() != Some('#') {
        return Ok(None);
    }

    stream.bump();
    stream.start = stream.pos;
    if !stream.eat('t') {
        stream.eat_while(|ch: char| ch.is_ascii_hexdigit());
    }
    let body = stream.current();

    stream.start = stream.pos;
    if stream.eat('.') && !stream.eat_while(is_number) {
        return Err(stream.error("Unexpected character for alpha value of color"));
    }
    let alpha = stream.current();

    Ok(Some(CssValue::Color(Color::from_hex(&body, &alpha))))
}

fn consume_quoted(stream: &mut Scanner) -> Result<Option<CssValue>, ScannerError> {
    let Some(quote) = stream.peek() else {
        return Ok(None);
    };
    if !eat_quoted(stream, true)? {
        return Ok(None);
    }

    let raw = stream.current();
    let len = raw.chars().count();
    let value: String = raw.chars().skip(1).take(len.saturating_sub(2)).collect();
    Ok(Some(CssValue::QuotedString { value, quote }))
}

/// A keyword, or a function call when the keyword is followed by `(`.
///
/// Short keywords (inside an abbreviation) are alpha-only so `bd1-s-blue`
/// splits on dashes; inside argument lists keywords may contain digits and
/// dashes.
fn consume_keyword_or_function(
    stream: &mut Scanner,
    short: bool,
) -> Result<Option<CssValue>, ScannerError> {
    let Some(keyword) = consume_keyword(stream, short) else {
        return Ok(None);
    };

    match consume_arguments(stream)? {
        Some(args) => Ok(Some(CssValue::FunctionCall { name: keyword, args })),
        None => Ok(Some(CssValue::Keyword(keyword))),
    }
}

fn consume_keyword(stream: &mut Scanner, short: bool) -> Option<String> {
    let is_full = |ch: char| is_alpha_numeric_word(ch) || ch == '-';

    stream.start = stream.pos;
    if stream.eat('$') || stream.eat('@') {
        stream.eat_while(is_full);
    } else if short {
        stream.eat_while(is_alpha_word);
    } else {
        stream.eat_while(is_full);
    }

    (stream.start != stream.pos).then(|| stream.current())
}

fn consume_arguments(stream: &mut Scanner) -> Result<Option<Vec<Vec<CssValue>>>, ScannerError> {
    if !stream.eat('(') {
        return Ok(None);
    }

    let mut args = Vec::new();
    while !stream.eof() {
        if let Some(arg) = consume_argument(stream)? {
            args.push(arg);
            continue;
        }

        stream.eat_while(is_white_space);
        if stream.eat(')') {
            return Ok(Some(args));
        }
        if !stream.eat(',') {
            break;
        }
    }

    Err(stream.error("Expected , or )"))
}

fn consume_argument(stream: &mut Scanner) -> Result<Option<Vec<CssValue>>, ScannerError> {
    let mut values = Vec::new();

    while !stream.eof() {
        stream.eat_while(is_white_space);

        let token = match consume_number(stream) {
            Some(number) => Some(number),
            None => match consume_color(stream)? {
                Some(color) => Some(color),
                None => match consume_quoted(stream)? {
                    Some(quoted) => Some(quoted),
                    None => consume_keyword_or_function(stream, false)?,
                },
            },
        };

        match token {
            Some(token) => values.push(token),
            None => break,
        }
    }

    Ok((!values.is_empty()).then_some(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(abbr: &str) -> Vec<CssProperty> {
        parse(abbr, "wmso").unwrap()
    }

    fn values(abbr: &str) -> Vec<String> {
        p(abbr)[0].value.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn numbers_split_on_dash_after_unitless_values() {
        let props = p("p10-20");
        assert_eq!(props[0].name.as_deref(), Some("p"));
        assert_eq!(
            props[0].value,
            vec![CssValue::number(10.0, ""), CssValue::number(20.0, "")]
        );
    }

    #[test]
    fn negative_numbers() {
        assert_eq!(values("m-10"), vec!["-10"]);
        assert_eq!(values("m10px-5"), vec!["10px", "-5"]);
        assert_eq!(values("m-10--20"), vec!["-10", "-20"]);
    }

    #[test]
    fn fractions_and_units() {
        assert_eq!(p("lh1.5")[0].value, vec![CssValue::number(1.5, "")]);
        assert_eq!(p("w.5")[0].value, vec![CssValue::number(0.5, "")]);
        assert_eq!(p("w100p")[0].value, vec![CssValue::number(100.0, "p")]);
        assert_eq!(p("w100%")[0].value, vec![CssValue::number(100.0, "%")]);
    }

    #[test]
    fn keywords_and_colors() {
        assert_eq!(values("bd1-s-blue"), vec!["1", "s", "blue"]);
        assert_eq!(values("c#f.5"), vec!["rgba(255, 255, 255, 0.5)"]);
        assert_eq!(values("bd1-#0-s"), vec!["1", "#000000", "s"]);
        assert_eq!(values("pos-a"), vec!["a"]);
    }

    #[test]
    fn colon_separates_values() {
        assert_eq!(values("p:10:a"), vec!["10", "a"]);
    }

    #[test]
    fn variables() {
        assert_eq!(values("c$main"), vec!["$main"]);
        assert_eq!(values("c-@link-color"), vec!["@link-color"]);
    }

    #[test]
    fn important_and_multiple_properties() {
        let props = p("pos-a!+m0");
        assert_eq!(props.len(), 2);
        assert!(props[0].important);
        assert_eq!(props[1].name.as_deref(), Some("m"));
        assert!(!props[1].important);
    }

    #[test]
    fn ident_prefixes() {
        assert_eq!(p("@m")[0].name.as_deref(), Some("@m"));
        assert_eq!(p("!")[0].name.as_deref(), Some("!"));
    }

    #[test]
    fn vendor_prefixes() {
        let props = p("-trf");
        assert_eq!(props[0].prefixes, Prefixes::All);
        assert_eq!(props[0].name.as_deref(), Some("trf"));

        let props = p("-wm-trf");
        assert_eq!(props[0].prefixes, Prefixes::Explicit(vec!['w', 'm']));
        assert_eq!(props[0].name.as_deref(), Some("trf"));

        let props = p("-transform");
        assert_eq!(props[0].prefixes, Prefixes::All);
        assert_eq!(props[0].name.as_deref(), Some("transform"));
    }

    #[test]
    fn function_calls() {
        let props = p("trf-scale(2, 1.5)");
        assert_eq!(
            props[0].value,
            vec![CssValue::FunctionCall {
                name: "scale".into(),
                args: vec![
                    vec![CssValue::number(2.0, "")],
                    vec![CssValue::number(1.5, "")]
                ],
            }]
        );

        assert_eq!(values("bg-url('a.png')"), vec!["url('a.png')"]);
        assert_eq!(values("c-rgba(0, 0, 0, 0.5)"), vec!["rgba(0, 0, 0, 0.5)"]);
        assert_eq!(
            values("trf-translate(var(x), 2px)"),
            vec!["translate(var(x), 2px)"]
        );
    }

    #[test]
    fn quoted_value() {
        assert_eq!(
            p("ff\"Arial\"")[0].value,
            vec![CssValue::QuotedString {
                value: "Arial".into(),
                quote: '"'
            }]
        );
    }

    #[test]
    fn errors() {
        let message = |abbr: &str| parse(abbr, "wmso").unwrap_err().to_string();
        assert_eq!(message("c#f.x"), "Unexpected character for alpha value of color at 5");
        assert_eq!(message("p10%%"), "Unexpected character at 5");
        assert_eq!(message("trf-scale(2"), "Expected , or ) at 12");
    }
}
