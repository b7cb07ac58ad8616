//! Output profiles: how the serializers print a tree.
//!
//! A [`Profile`] is read-only during an expansion. Named base profiles come
//! from [`Profile::named`] and user tweaks are layered on with
//! [`Profile::apply`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::UnknownName;
use crate::fields::default_token;

/// Custom field printer: receives the field index and placeholder.
pub type FieldFn = Arc<dyn Fn(usize, &str) -> String + Send + Sync>;

const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "applet", "b", "basefont", "bdo", "big", "br", "button", "cite",
    "code", "del", "dfn", "em", "font", "i", "iframe", "img", "input", "ins", "kbd", "label",
    "map", "object", "q", "s", "samp", "select", "small", "span", "strike", "strong", "sub",
    "sup", "textarea", "tt", "u", "var",
];

const EMPTY_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "br", "col", "command", "embed", "frame", "hr", "img", "input",
    "isindex", "keygen", "link", "meta", "param", "source", "track", "wbr",
];

const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "contenteditable",
    "seamless",
    "async",
    "autofocus",
    "autoplay",
    "checked",
    "controls",
    "defer",
    "disabled",
    "formnovalidate",
    "hidden",
    "ismap",
    "loop",
    "multiple",
    "muted",
    "novalidate",
    "readonly",
    "required",
    "reversed",
    "selected",
    "typemustmatch",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    #[default]
    AsIs,
    Lower,
    Upper,
}

impl Case {
    pub fn apply(self, text: &str) -> String {
        match self {
            Case::AsIs => text.to_string(),
            Case::Lower => text.to_lowercase(),
            Case::Upper => text.to_uppercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quotes {
    #[default]
    Double,
    Single,
}

impl Quotes {
    pub fn char(self) -> char {
        match self {
            Quotes::Double => '"',
            Quotes::Single => '\'',
        }
    }
}

/// When tags go on their own line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagNewline {
    /// Block elements break, inline ones stay on the line.
    #[default]
    Decide,
    Always,
    /// No formatting at all.
    Never,
}

/// Closing style of void elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfClosing {
    /// `<br>`
    #[default]
    Html,
    /// `<br/>`
    Xml,
    /// `<br />`
    Xhtml,
}

impl SelfClosing {
    pub fn marker(self) -> &'static str {
        match self {
            SelfClosing::Html => "",
            SelfClosing::Xml => "/",
            SelfClosing::Xhtml => " /",
        }
    }
}

/// Serializable field styles; [`FieldOutput::Custom`] is code-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStyle {
    /// Fields are dropped, placeholders stay.
    #[default]
    Plain,
    /// `${1:placeholder}` tabstops for editors that understand them.
    Tabstops,
}

#[derive(Clone, Default)]
pub enum FieldOutput {
    #[default]
    Plain,
    Tabstops,
    Custom(FieldFn),
}

impl FieldOutput {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(usize, &str) -> String + Send + Sync + 'static,
    {
        FieldOutput::Custom(Arc::new(f))
    }

    pub fn format(&self, index: usize, placeholder: &str) -> String {
        match self {
            FieldOutput::Plain => placeholder.to_string(),
            FieldOutput::Tabstops => default_token(index, placeholder),
            FieldOutput::Custom(f) => f(index, placeholder),
        }
    }

    #[must_use]
    pub fn is_plain(&self) -> bool {
        matches!(self, FieldOutput::Plain)
    }
}

impl fmt::Debug for FieldOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldOutput::Plain => f.write_str("Plain"),
            FieldOutput::Tabstops => f.write_str("Tabstops"),
            FieldOutput::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl From<FieldStyle> for FieldOutput {
    fn from(style: FieldStyle) -> Self {
        match style {
            FieldStyle::Plain => FieldOutput::Plain,
            FieldStyle::Tabstops => FieldOutput::Tabstops,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub indent: String,
    pub tag_case: Case,
    pub attribute_case: Case,
    pub attribute_quotes: Quotes,
    pub tag_newline: TagNewline,
    /// Number of adjacent inline siblings that forces each onto its own line.
    /// Zero disables the rule.
    pub inline_break: usize,
    pub self_closing: SelfClosing,
    /// Print boolean attributes as `disabled` instead of `disabled="disabled"`.
    pub compact_boolean_attributes: bool,
    pub boolean_attributes: Vec<String>,
    pub inline_elements: Vec<String>,
    pub empty_elements: Vec<String>,
    /// Add caret fields to empty attributes and elements.
    pub place_cursor: bool,
    pub fields: FieldOutput,
}

impl Default for Profile {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(ToString::to_string).collect();
        Self {
            name: "html".to_string(),
            indent: "\t".to_string(),
            tag_case: Case::AsIs,
            attribute_case: Case::AsIs,
            attribute_quotes: Quotes::Double,
            tag_newline: TagNewline::Decide,
            inline_break: 3,
            self_closing: SelfClosing::Html,
            compact_boolean_attributes: false,
            boolean_attributes: owned(BOOLEAN_ATTRIBUTES),
            inline_elements: owned(INLINE_ELEMENTS),
            empty_elements: owned(EMPTY_ELEMENTS),
            place_cursor: true,
            fields: FieldOutput::Plain,
        }
    }
}

impl Profile {
    /// Built-in profile by name: `html`, `xhtml`, `xml` or `plain`.
    pub fn named(name: &str) -> Result<Self, UnknownName> {
        let base = Self::default();
        let profile = match name {
            "html" => base,
            "xhtml" => Self {
                self_closing: SelfClosing::Xhtml,
                compact_boolean_attributes: false,
                ..base
            },
            "xml" => Self {
                tag_newline: TagNewline::Always,
                self_closing: SelfClosing::Xml,
                ..base
            },
            "plain" => Self {
                tag_newline: TagNewline::Never,
                indent: String::new(),
                place_cursor: false,
                ..base
            },
            _ => return Err(UnknownName::new("profile", name)),
        };
        Ok(Self {
            name: name.to_string(),
            ..profile
        })
    }

    /// Returns a copy with every set override applied.
    pub fn apply(&self, overrides: &ProfileOverrides) -> Self {
        let mut profile = self.clone();
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(value) = &overrides.$field {
                    profile.$field = value.clone();
                })*
            };
        }
        set!(
            indent,
            tag_case,
            attribute_case,
            attribute_quotes,
            tag_newline,
            inline_break,
            self_closing,
            compact_boolean_attributes,
            boolean_attributes,
            inline_elements,
            empty_elements,
            place_cursor
        );
        if let Some(style) = overrides.fields {
            profile.fields = style.into();
        }
        profile
    }

    pub fn tag_name(&self, name: &str) -> String {
        self.tag_case.apply(name)
    }

    pub fn attribute_name(&self, name: &str) -> String {
        self.attribute_case.apply(name)
    }

    pub fn quote(&self) -> char {
        self.attribute_quotes.char()
    }

    pub fn self_closing_marker(&self) -> &'static str {
        self.self_closing.marker()
    }

    #[must_use]
    pub fn is_inline(&self, name: &str) -> bool {
        contains_ignore_case(&self.inline_elements, name)
    }

    #[must_use]
    pub fn is_empty_element(&self, name: &str) -> bool {
        contains_ignore_case(&self.empty_elements, name)
    }

    #[must_use]
    pub fn is_boolean_attribute(&self, name: &str) -> bool {
        contains_ignore_case(&self.boolean_attributes, name)
    }

    pub fn field(&self, index: usize, placeholder: &str) -> String {
        self.fields.format(index, placeholder)
    }
}

impl FromStr for Profile {
    type Err = UnknownName;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::named(name)
    }
}

fn contains_ignore_case(list: &[String], name: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(name))
}

/// Partial profile, as read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileOverrides {
    pub indent: Option<String>,
    pub tag_case: Option<Case>,
    pub attribute_case: Option<Case>,
    pub attribute_quotes: Option<Quotes>,
    pub tag_newline: Option<TagNewline>,
    pub inline_break: Option<usize>,
    pub self_closing: Option<SelfClosing>,
    pub compact_boolean_attributes: Option<bool>,
    pub boolean_attributes: Option<Vec<String>>,
    pub inline_elements: Option<Vec<String>>,
    pub empty_elements: Option<Vec<String>>,
    pub place_cursor: Option<bool>,
    pub fields: Option<FieldStyle>,
}

impl ProfileOverrides {
    /// Layers `other` on top of `self`; values set in `other` win.
    pub fn merge(&mut self, other: &ProfileOverrides) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field.clone();
                })*
            };
        }
        take!(
            indent,
            tag_case,
            attribute_case,
            attribute_quotes,
            tag_newline,
            inline_break,
            self_closing,
            compact_boolean_attributes,
            boolean_attributes,
            inline_elements,
            empty_elements,
            place_cursor,
            fields
        );
    }
}
