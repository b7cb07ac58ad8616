use std::fmt;

use serde::Serialize;

/// One token of a stylesheet value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CssValue {
    /// `10`, `-1.5em`, `100%`. `unit` is stored as written, before aliases
    /// are expanded.
    Number { value: f64, unit: String },
    Color(Color),
    /// Keyword, shorthand or `$`/`@` preprocessor variable.
    Keyword(String),
    QuotedString { value: String, quote: char },
    FunctionCall { name: String, args: Vec<Vec<CssValue>> },
}

impl CssValue {
    pub fn keyword(value: impl Into<String>) -> Self {
        CssValue::Keyword(value.into())
    }

    pub fn number(value: f64, unit: impl Into<String>) -> Self {
        CssValue::Number {
            value,
            unit: unit.into(),
        }
    }

    #[must_use]
    pub fn is_unitless_number(&self) -> bool {
        matches!(self, CssValue::Number { unit, .. } if unit.is_empty())
    }
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssValue::Number { value, unit } => write!(f, "{}{unit}", format_number(*value)),
            CssValue::Color(color) => write!(f, "{color}"),
            CssValue::Keyword(value) => f.write_str(value),
            CssValue::QuotedString { value, quote } => write!(f, "{quote}{value}{quote}"),
            CssValue::FunctionCall { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(&join_values(arg))?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Space-separated rendering of a value sequence.
pub fn join_values(values: &[CssValue]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prints at most four fractional digits and drops trailing zeros, so `5.0`
/// prints as `5` and `0.33333` as `0.3333`.
pub fn format_number(value: f64) -> String {
    let fixed = format!("{value:.4}");
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// RGBA color parsed from `#` shorthand.
///
/// # Invariants
///
/// - `a` is within `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
    /// Source text without the leading `#`, alpha suffix included.
    pub raw: String,
}

impl Color {
    /// Builds a color from the hex body (`fc0`, `t`, `1`, ...) and an
    /// optional `.alpha` suffix (`.5`).
    ///
    /// Body lengths: empty is black, one digit repeats (`#1` → `#111111`),
    /// two digits repeat as a pair, three digits double each, anything longer
    /// is read as six digits, repeating the body when it is short.
    pub fn from_hex(body: &str, alpha: &str) -> Self {
        let mut a = if alpha.is_empty() {
            1.0
        } else {
            alpha.parse::<f64>().unwrap_or(1.0).clamp(0.0, 1.0)
        };

        let (r, g, b) = if body == "t" {
            a = 0.0;
            (String::from("0"), String::from("0"), String::from("0"))
        } else {
            let chars: Vec<char> = body.chars().collect();
            match chars.len() {
                0 => ("0".into(), "0".into(), "0".into()),
                1 => {
                    let pair = format!("{0}{0}", chars[0]);
                    (pair.clone(), pair.clone(), pair)
                }
                2 => (body.to_string(), body.to_string(), body.to_string()),
                3 => (
                    format!("{0}{0}", chars[0]),
                    format!("{0}{0}", chars[1]),
                    format!("{0}{0}", chars[2]),
                ),
                _ => {
                    let doubled: Vec<char> = chars.iter().chain(chars.iter()).copied().collect();
                    let take = |from: usize| doubled[from..from + 2].iter().collect::<String>();
                    (take(0), take(2), take(4))
                }
            }
        };

        let channel = |hex: &str| u8::from_str_radix(hex, 16).unwrap_or(0);
        Self {
            r: channel(&r),
            g: channel(&g),
            b: channel(&b),
            a,
            raw: format!("{body}{alpha}"),
        }
    }

    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0 && self.a == 0.0
    }

    /// `#rrggbb`, or `#rgb` when `short` is set and every channel allows it.
    pub fn to_hex(&self, short: bool) -> String {
        let channels = [self.r, self.g, self.b];
        let digits: String = if short && channels.iter().all(|c| c % 17 == 0) {
            channels.iter().map(|c| format!("{:x}", c >> 4)).collect()
        } else {
            channels.iter().map(|c| format!("{c:02x}")).collect()
        };
        format!("#{digits}")
    }

    /// `rgb(r, g, b)` for opaque colors, `rgba(r, g, b, a)` otherwise.
    pub fn to_rgb(&self) -> String {
        if self.a == 1.0 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                format_alpha(self.a)
            )
        }
    }

    /// `transparent`, a hex value when fully opaque, otherwise `rgba(...)`.
    pub fn to_css(&self, short_hex: bool) -> String {
        if self.is_transparent() {
            "transparent".to_string()
        } else if self.a == 1.0 {
            self.to_hex(short_hex)
        } else {
            self.to_rgb()
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css(false))
    }
}

fn format_alpha(a: f64) -> String {
    let fixed = format!("{a:.8}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("0", "", "#000000")]
    #[case("123", "", "#112233")]
    #[case("ffcc00", "", "#ffcc00")]
    #[case("fc0", ".5", "rgba(255, 204, 0, 0.5)")]
    #[case("t", "", "transparent")]
    #[case("", "", "#000000")]
    #[case("1", "", "#111111")]
    #[case("12", "", "#121212")]
    #[case("1234", "", "#123412")]
    fn color_to_css(#[case] body: &str, #[case] alpha: &str, #[case] expected: &str) {
        assert_eq!(Color::from_hex(body, alpha).to_css(false), expected);
    }

    #[test]
    fn short_and_long_hex_are_equal() {
        let short = Color::from_hex("fff", "");
        let long = Color::from_hex("ffffff", "");
        assert_eq!((short.r, short.g, short.b, short.a), (255, 255, 255, 1.0));
        assert_eq!((long.r, long.g, long.b, long.a), (255, 255, 255, 1.0));
        assert_eq!(Color::from_hex("fff", ".5").a, 0.5);
    }

    #[rstest]
    #[case("123", "#123")]
    #[case("0", "#000")]
    #[case("ffcc00", "#fc0")]
    #[case("ffcc01", "#ffcc01")]
    fn short_hex(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(Color::from_hex(body, "").to_hex(true), expected);
    }

    #[test]
    fn rgb_output() {
        assert_eq!(Color::from_hex("123", "").to_rgb(), "rgb(17, 34, 51)");
        assert_eq!(Color::from_hex("123", ".3").to_rgb(), "rgba(17, 34, 51, 0.3)");
    }

    #[test]
    fn transparent_black_with_alpha_is_not_transparent() {
        assert_eq!(Color::from_hex("0", ".5").to_css(false), "rgba(0, 0, 0, 0.5)");
    }

    #[rstest]
    #[case(5.0, "5")]
    #[case(1.5, "1.5")]
    #[case(-0.0, "0")]
    #[case(0.333333, "0.3333")]
    #[case(100.0, "100")]
    fn number_formatting(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_number(value), expected);
    }

    #[test]
    fn function_call_display() {
        let value = CssValue::FunctionCall {
            name: "rgb".into(),
            args: vec![
                vec![CssValue::number(1.0, "")],
                vec![CssValue::number(2.0, ""), CssValue::keyword("a")],
            ],
        };
        assert_eq!(value.to_string(), "rgb(1, 2 a)");
    }
}
