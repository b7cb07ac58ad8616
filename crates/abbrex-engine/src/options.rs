//! Tunable expansion options.
//!
//! Every field has a default, so a partial TOML table deserializes into a
//! complete [`Options`] value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Ceiling for a single multiplier and for the product of nested ones.
    pub max_repeat: usize,
    /// Deepest element nesting a markup abbreviation may open.
    pub max_depth: usize,
    pub markup: MarkupOptions,
    pub stylesheet: StylesheetOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_repeat: 1000,
            max_depth: crate::markup::DEFAULT_MAX_DEPTH,
            markup: MarkupOptions::default(),
            stylesheet: StylesheetOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupOptions {
    pub fuzzy_search: bool,
    pub fuzzy_min_score: f64,
    pub bem_element_separator: String,
    pub bem_modifier_separator: String,
    /// Template inserted before an element by the `c` filter. Empty by
    /// default.
    pub comment_before: String,
    /// Template inserted after an element by the `c` filter. `[#ID]` and
    /// `[.CLASS]` sections are dropped when the element has no such value.
    pub comment_after: String,
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self {
            fuzzy_search: false,
            fuzzy_min_score: 0.3,
            bem_element_separator: "__".to_string(),
            bem_modifier_separator: "_".to_string(),
            comment_before: String::new(),
            comment_after: "\n<!-- /[#ID][.CLASS] -->".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesheetOptions {
    pub fuzzy_search: bool,
    pub fuzzy_min_score: f64,
    /// Text between property name and value.
    pub between: String,
    /// Text after the value.
    pub after: String,
    pub int_unit: String,
    pub float_unit: String,
    pub unit_aliases: BTreeMap<String, String>,
    pub unitless_properties: Vec<String>,
    pub keyword_aliases: BTreeMap<String, String>,
    pub short_hex: bool,
    pub vendor_prefixes: Vec<VendorPrefix>,
}

impl Default for StylesheetOptions {
    fn default() -> Self {
        let pairs = |items: &[(&str, &str)]| -> BTreeMap<String, String> {
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };

        Self {
            fuzzy_search: true,
            fuzzy_min_score: 0.3,
            between: ": ".to_string(),
            after: ";".to_string(),
            int_unit: "px".to_string(),
            float_unit: "em".to_string(),
            unit_aliases: pairs(&[("e", "em"), ("p", "%"), ("x", "ex"), ("r", "rem")]),
            unitless_properties: [
                "z-index",
                "line-height",
                "opacity",
                "font-weight",
                "zoom",
                "flex-grow",
                "flex-shrink",
                "order",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            keyword_aliases: pairs(&[
                ("a", "auto"),
                ("i", "inherit"),
                ("s", "solid"),
                ("da", "dashed"),
                ("do", "dotted"),
                ("t", "transparent"),
            ]),
            short_hex: true,
            vendor_prefixes: vec![
                VendorPrefix::new('w', "webkit"),
                VendorPrefix::new('m', "moz"),
                VendorPrefix::new('s', "ms"),
                VendorPrefix::new('o', "o"),
            ],
        }
    }
}

impl StylesheetOptions {
    /// Letters usable in an explicit `-wm-prop` prefix list.
    pub fn vendor_letters(&self) -> String {
        self.vendor_prefixes.iter().map(|p| p.letter).collect()
    }

    pub fn vendor(&self, letter: char) -> Option<&VendorPrefix> {
        self.vendor_prefixes.iter().find(|p| p.letter == letter)
    }

    #[must_use]
    pub fn is_unitless(&self, property: &str) -> bool {
        self.unitless_properties.iter().any(|p| p == property)
    }
}

/// A vendor prefix such as `-webkit-`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorPrefix {
    pub letter: char,
    pub name: String,
    /// Properties this vendor needs a prefix for. Empty means all of them.
    #[serde(default)]
    pub properties: Vec<String>,
}

impl VendorPrefix {
    pub fn new(letter: char, name: impl Into<String>) -> Self {
        Self {
            letter,
            name: name.into(),
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn supports(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }
}
