//! Output filters.
//!
//! A filter receives the whole [`OutputTree`] and fills in or rewrites the
//! `start`, `end`, `content` and `padding` of its nodes. Every markup
//! expansion runs `_format` and then exactly one serializer (`html` or
//! `haml`); the rest are opt-in post-processors requested with an
//! abbreviation suffix such as `ul>li|bem|c`.

mod bem;
mod comment;
mod format;
mod haml;
mod html;
mod text;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;

use crate::error::{ExpandError, UnknownName};
use crate::options::MarkupOptions;
use crate::profile::Profile;
use crate::registry::Registry;
use crate::tree::{ElementKind, NodeId, OutputNode, OutputTree};

static FILTER_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\|([\w|\-]+)$").unwrap());

/// `${name}` reference to a variable or attribute.
pub(crate) static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][\w\-]*)\}").unwrap());

static TAGS_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[\w:\-]+[^>]*>").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Line breaks and indentation.
    Format,
    Html,
    Haml,
    Bem,
    /// Comment after elements with an id or class.
    Comment,
    /// Escapes `&`, `<` and `>`.
    Escape,
    /// Drops formatting line breaks.
    SingleLine,
}

impl Filter {
    pub const ALL: [Filter; 7] = [
        Filter::Format,
        Filter::Html,
        Filter::Haml,
        Filter::Bem,
        Filter::Comment,
        Filter::Escape,
        Filter::SingleLine,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Filter::Format => "_format",
            Filter::Html => "html",
            Filter::Haml => "haml",
            Filter::Bem => "bem",
            Filter::Comment => "c",
            Filter::Escape => "e",
            Filter::SingleLine => "s",
        }
    }

    #[must_use]
    pub fn is_serializer(self) -> bool {
        matches!(self, Filter::Html | Filter::Haml)
    }

    pub fn apply(self, tree: &mut OutputTree, ctx: &mut FilterContext<'_>) -> Result<(), ExpandError> {
        debug!("filter {}", self.name());
        match self {
            Filter::Format => format::format(tree, ctx),
            Filter::Html => return html::html(tree, ctx),
            Filter::Haml => return haml::haml(tree, ctx),
            Filter::Bem => return bem::bem(tree, ctx),
            Filter::Comment => comment::comment(tree, ctx),
            Filter::Escape => text::escape(tree),
            Filter::SingleLine => text::single_line(tree),
        }
        Ok(())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Filter {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::ALL
            .into_iter()
            .find(|filter| filter.name() == s)
            .ok_or_else(|| UnknownName::new("filter", s))
    }
}

/// Per-expansion state shared by the filters.
pub struct FilterContext<'a> {
    pub profile: &'a Profile,
    pub options: &'a MarkupOptions,
    /// `${lang}`-style variables for text snippets.
    pub variables: &'a Registry,
    /// Indentation level of the whole expansion.
    pub level: usize,
    /// Highest field index handed out so far.
    pub tabstops: usize,
    /// Serializer of the current pipeline.
    pub serializer: Filter,
    /// Whether the serializer already ran, so later filters that change
    /// attributes have to run it again.
    pub serialized: bool,
}

impl<'a> FilterContext<'a> {
    pub fn new(profile: &'a Profile, options: &'a MarkupOptions, variables: &'a Registry) -> Self {
        Self {
            profile,
            options,
            variables,
            level: 0,
            tabstops: 0,
            serializer: Filter::Html,
            serialized: false,
        }
    }
}

/// Ordered list of filters for one expansion.
///
/// `_format` comes first, then the serializer. A requested `html` or `haml`
/// replaces the syntax default; `bem` runs right after the serializer and
/// the remaining post-processors follow in the order they were requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub serializer: Filter,
    pub post: Vec<Filter>,
}

impl Pipeline {
    pub fn new(serializer: Filter, requested: &[Filter]) -> Self {
        let serializer = requested
            .iter()
            .rev()
            .copied()
            .find(|f| f.is_serializer())
            .unwrap_or(serializer);

        let mut post: Vec<Filter> = Vec::new();
        if requested.contains(&Filter::Bem) {
            post.push(Filter::Bem);
        }
        for &filter in requested {
            if filter.is_serializer() || filter == Filter::Format || post.contains(&filter) {
                continue;
            }
            post.push(filter);
        }

        Self { serializer, post }
    }

    pub fn filters(&self) -> Vec<Filter> {
        let mut filters = vec![Filter::Format, self.serializer];
        filters.extend(&self.post);
        filters
    }

    pub fn run(&self, tree: &mut OutputTree, ctx: &mut FilterContext<'_>) -> Result<(), ExpandError> {
        ctx.serializer = self.serializer;
        ctx.serialized = false;
        debug!("filters: {:?}", self.filters());
        for filter in self.filters() {
            filter.apply(tree, ctx)?;
            if filter == self.serializer {
                ctx.serialized = true;
            }
        }
        Ok(())
    }
}

/// Splits a trailing `|name|name` filter list off an abbreviation.
///
/// Unknown names are logged and dropped.
pub fn split_filters(abbr: &str) -> (&str, Vec<Filter>) {
    let Some(caps) = FILTER_SUFFIX.captures(abbr) else {
        return (abbr, Vec::new());
    };
    let (Some(whole), Some(names)) = (caps.get(0), caps.get(1)) else {
        return (abbr, Vec::new());
    };

    let filters = names
        .as_str()
        .split('|')
        .filter(|name| !name.is_empty())
        .filter_map(|name| match name.parse::<Filter>() {
            Ok(filter) => Some(filter),
            Err(err) => {
                warn!("{err}, skipping");
                None
            }
        })
        .collect();
    (&abbr[..whole.start()], filters)
}

/// Prefixes every line after the first with `pad`.
pub fn pad_string(text: &str, pad: &str) -> String {
    if pad.is_empty() || !text.contains('\n') {
        return text.to_string();
    }
    text.split('\n').collect::<Vec<_>>().join(&format!("\n{pad}"))
}

/// Indentation of the line a node starts on.
fn outer_padding(tree: &OutputTree, id: NodeId, ctx: &FilterContext<'_>) -> String {
    match tree.parent(id) {
        Some(parent) if parent != OutputTree::ROOT => tree.node(parent).padding.clone(),
        _ => ctx.profile.indent.repeat(ctx.level),
    }
}

#[must_use]
fn is_inline(node: &OutputNode, profile: &Profile) -> bool {
    match &node.kind {
        ElementKind::Text | ElementKind::Group => true,
        ElementKind::Snippet(_) => false,
        ElementKind::Tag => node.name.as_deref().is_none_or(|name| profile.is_inline(name)),
    }
}

#[must_use]
fn is_block(node: &OutputNode, profile: &Profile) -> bool {
    !is_inline(node, profile)
}

/// Void element or explicit `/`.
#[must_use]
fn is_unary(tree: &OutputTree, id: NodeId, profile: &Profile) -> bool {
    let node = tree.node(id);
    if node.self_closing {
        return true;
    }
    !tree.has_children(id) && node.tag_name().is_some_and(|name| profile.is_empty_element(name))
}

#[must_use]
fn has_tags_in_content(node: &OutputNode) -> bool {
    node.text.as_deref().is_some_and(|text| TAGS_IN_TEXT.is_match(text))
}

#[must_use]
fn has_block_children(tree: &OutputTree, id: NodeId, profile: &Profile) -> bool {
    let node = tree.node(id);
    (has_tags_in_content(node) && is_block(node, profile))
        || tree
            .children(id)
            .iter()
            .any(|&child| is_block(tree.node(child), profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn filter_names_round_trip() {
        for filter in Filter::ALL {
            assert_eq!(filter.name().parse::<Filter>(), Ok(filter));
        }
        assert_eq!(
            "xsl".parse::<Filter>(),
            Err(UnknownName::new("filter", "xsl"))
        );
    }

    #[test]
    fn suffix_is_split_off() {
        assert_eq!(split_filters("ul>li|bem|c"), ("ul>li", vec![Filter::Bem, Filter::Comment]));
        assert_eq!(split_filters("p|nope|e"), ("p", vec![Filter::Escape]));
        assert_eq!(split_filters("a[title=x|y]"), ("a[title=x|y]", vec![]));
    }

    #[test]
    fn pipeline_order() {
        let pipeline = Pipeline::new(Filter::Html, &[Filter::Escape, Filter::Bem, Filter::Escape]);
        assert_eq!(
            pipeline.filters(),
            vec![Filter::Format, Filter::Html, Filter::Bem, Filter::Escape]
        );

        let pipeline = Pipeline::new(Filter::Html, &[Filter::Haml, Filter::Format]);
        assert_eq!(pipeline.filters(), vec![Filter::Format, Filter::Haml]);
    }

    #[test]
    fn pads_following_lines() {
        assert_eq!(pad_string("a\nb\nc", "\t"), "a\n\tb\n\tc");
        assert_eq!(pad_string("a", "\t"), "a");
        assert_eq!(pad_string("a\nb", ""), "a\nb");
    }
}
