//! Turns parsed stylesheet properties into declarations.
//!
//! Each property is looked up in the snippet registry (exact hit first, then
//! fuzzy), and its value tokens are resolved against the keywords the
//! snippet offers. A name with no snippet at all is printed literally.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::parser::{CssProperty, Prefixes};
use super::value::{CssValue, format_number};
use crate::error::ExpandError;
use crate::fields;
use crate::options::StylesheetOptions;
use crate::registry::{Registry, find_best_match};

static PROPERTY_SNIPPET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z-]+)(?:\s*:\s*([^\n\r;]+?);*)?$").unwrap());

/// A stylesheet snippet value, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssSnippet {
    /// `position:relative|absolute`: a property and its value alternatives.
    Property {
        property: String,
        alternatives: Vec<String>,
    },
    /// Anything else, inserted as written (`!important`, `@media ...`).
    Raw(String),
}

impl CssSnippet {
    pub fn parse(value: &str) -> Self {
        match PROPERTY_SNIPPET.captures(value) {
            Some(caps) => CssSnippet::Property {
                property: caps[1].to_string(),
                alternatives: caps
                    .get(2)
                    .map(|m| {
                        m.as_str()
                            .split('|')
                            .map(|alt| alt.trim().to_string())
                            .filter(|alt| !alt.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            None => CssSnippet::Raw(value.to_string()),
        }
    }
}

/// Value word offered by a property snippet. `key` is what abbreviations are
/// scored against, `text` what replaces them.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Keyword {
    key: String,
    text: String,
}

fn collect_keywords(alternatives: &[String]) -> Vec<Keyword> {
    let mut keywords: Vec<Keyword> = Vec::new();
    for alt in alternatives {
        let clean = fields::parse(alt).map(|f| f.value).unwrap_or_else(|_| alt.clone());
        for token in split_tokens(&clean) {
            let key = token.split('(').next().unwrap_or(token).trim().to_string();
            if !key.is_empty() && !keywords.iter().any(|k| k.key == key) {
                keywords.push(Keyword {
                    key,
                    text: token.to_string(),
                });
            }
        }
    }
    keywords
}

/// Splits on whitespace outside parentheses.
fn split_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if ch.is_whitespace() && depth == 0 {
            if let Some(from) = start.take() {
                tokens.push(&text[from..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(from) = start {
        tokens.push(&text[from..]);
    }
    tokens
}

/// Part of `abbr` left over once its characters are matched, in order,
/// against `key`: `posa` against `pos` leaves `a`.
fn unmatched_part(abbr: &str, key: &str) -> String {
    let key: Vec<char> = key.chars().collect();
    let mut last = 0;
    for (i, ch) in abbr.char_indices() {
        match key[last.min(key.len())..].iter().position(|&k| k == ch) {
            Some(found) => last += found + 1,
            None => return abbr[i..].to_string(),
        }
    }
    String::new()
}

pub struct CssResolver<'a> {
    snippets: &'a Registry,
    options: &'a StylesheetOptions,
}

impl<'a> CssResolver<'a> {
    pub fn new(snippets: &'a Registry, options: &'a StylesheetOptions) -> Self {
        Self { snippets, options }
    }

    /// Declarations for every property, one per line. Field indices of
    /// later properties are shifted past those of earlier ones.
    pub fn resolve(&self, properties: &[CssProperty]) -> Result<String, ExpandError> {
        let mut lines = Vec::new();
        let mut offset = 0;

        for property in properties {
            let text = self.resolve_property(property);
            let (text, max) = fields::shift_indices(&text, offset).map_err(|err| {
                ExpandError::Field {
                    message: err.message,
                    pos: err.pos,
                }
            })?;
            offset += max;
            lines.push(text);
        }

        Ok(lines.join("\n"))
    }

    fn resolve_property(&self, property: &CssProperty) -> String {
        let Some(name) = property.name.as_deref() else {
            return self.with_important(self.render_values(&property.value, None, &[]), property);
        };

        let snippet = self.snippets.resolve(name).or_else(|| {
            if self.options.fuzzy_search {
                self.snippets.find_best_match(name, self.options.fuzzy_min_score)
            } else {
                None
            }
        });

        let Some(snippet) = snippet else {
            debug!("no stylesheet snippet for {name:?}, using it literally");
            let value = if property.value.is_empty() {
                "${1}".to_string()
            } else {
                self.render_values(&property.value, Some(name), &[])
            };
            return self.declarations(property, name, &self.with_important(value, property));
        };

        match CssSnippet::parse(&snippet.render(name)) {
            CssSnippet::Raw(text) => text,
            CssSnippet::Property {
                property: css_name,
                alternatives,
            } => {
                let keywords = collect_keywords(&alternatives);
                let value = if property.value.is_empty() {
                    default_value(name, snippet.key.as_str(), &alternatives, &keywords)
                } else {
                    self.render_values(&property.value, Some(&css_name), &keywords)
                };
                self.declarations(property, &css_name, &self.with_important(value, property))
            }
        }
    }

    fn with_important(&self, value: String, property: &CssProperty) -> String {
        if property.important {
            format!("{value} !important")
        } else {
            value
        }
    }

    fn render_values(
        &self,
        values: &[CssValue],
        property: Option<&str>,
        keywords: &[Keyword],
    ) -> String {
        values
            .iter()
            .map(|value| self.render_value(value, property, keywords))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn render_value(&self, value: &CssValue, property: Option<&str>, keywords: &[Keyword]) -> String {
        match value {
            CssValue::Keyword(word) if word.starts_with(['$', '@']) => word.clone(),
            CssValue::Keyword(word) => {
                if let Some(keyword) = find_best_match(word, keywords, |k| k.key.as_str(), 0.0) {
                    keyword.text.clone()
                } else if let Some(alias) = self.options.keyword_aliases.get(word) {
                    alias.clone()
                } else {
                    word.clone()
                }
            }
            CssValue::Number { value, unit } => {
                let unit = if !unit.is_empty() {
                    self.options
                        .unit_aliases
                        .get(unit)
                        .map_or(unit.as_str(), String::as_str)
                } else if *value == 0.0 || property.is_some_and(|p| self.options.is_unitless(p)) {
                    ""
                } else if value.fract() == 0.0 {
                    self.options.int_unit.as_str()
                } else {
                    self.options.float_unit.as_str()
                };
                format!("{}{unit}", format_number(*value))
            }
            CssValue::Color(color) => color.to_css(self.options.short_hex),
            CssValue::QuotedString { .. } | CssValue::FunctionCall { .. } => value.to_string(),
        }
    }

    /// One line per requested vendor prefix, then the plain declaration.
    fn declarations(&self, property: &CssProperty, name: &str, value: &str) -> String {
        let line = |prefix: &str| {
            format!(
                "{prefix}{name}{}{value}{}",
                self.options.between, self.options.after
            )
        };

        let vendors: Vec<&str> = match &property.prefixes {
            Prefixes::None => Vec::new(),
            Prefixes::All => {
                let supporting: Vec<&str> = self
                    .options
                    .vendor_prefixes
                    .iter()
                    .filter(|p| p.properties.is_empty() || p.supports(name))
                    .map(|p| p.name.as_str())
                    .collect();
                if supporting.is_empty() {
                    self.options
                        .vendor_prefixes
                        .iter()
                        .map(|p| p.name.as_str())
                        .collect()
                } else {
                    supporting
                }
            }
            Prefixes::Explicit(letters) => letters
                .iter()
                .filter_map(|&letter| self.options.vendor(letter))
                .map(|p| p.name.as_str())
                .collect(),
        };

        vendors
            .into_iter()
            .map(|vendor| line(&format!("-{vendor}-")))
            .chain(std::iter::once(line("")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Value used when the abbreviation carries none: a keyword named by the
/// unmatched tail of the abbreviation, else the first alternative as fields.
fn default_value(abbr: &str, key: &str, alternatives: &[String], keywords: &[Keyword]) -> String {
    let rest = unmatched_part(abbr, key);
    if !rest.is_empty()
        && let Some(keyword) = find_best_match(&rest, keywords, |k| k.key.as_str(), 0.0)
    {
        return keyword.text.clone();
    }

    let Some(first) = alternatives.first() else {
        return "${1}".to_string();
    };

    let has_fields = fields::parse(first).is_ok_and(|parsed| !parsed.fields.is_empty());
    if has_fields {
        first.clone()
    } else {
        split_tokens(first)
            .into_iter()
            .enumerate()
            .map(|(i, token)| format!("${{{}:{token}}}", i + 1))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
