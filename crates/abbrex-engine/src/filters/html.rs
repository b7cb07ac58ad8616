//! HTML/XML serializer.

use log::trace;
use regex::Captures;

use super::{FilterContext, VARIABLE, is_unary, outer_padding, pad_string};
use crate::error::ExpandError;
use crate::fields;
use crate::profile::Profile;
use crate::tree::{ElementKind, NodeId, OutputNode, OutputTree, SLOT};

const CHILD: &str = "${child}";

/// Hands out node-local caret fields: `${1}`, `${2}`, ...
#[derive(Debug, Default)]
pub(super) struct Carets(usize);

impl Carets {
    pub(super) fn starting_after(index: usize) -> Self {
        Self(index)
    }

    pub(super) fn next_index(&mut self) -> usize {
        self.0 += 1;
        self.0
    }

    pub(super) fn next(&mut self) -> String {
        format!("${{{}}}", self.next_index())
    }
}

pub(super) fn html(tree: &mut OutputTree, ctx: &mut FilterContext<'_>) -> Result<(), ExpandError> {
    ctx.tabstops = 0;
    for id in tree.ids() {
        let pad = outer_padding(tree, id, ctx);
        let (open, close) = match &tree.node(id).kind {
            ElementKind::Tag => tag(tree, id, ctx.profile),
            ElementKind::Snippet(template) => snippet(tree.node(id), template, &pad, ctx),
            ElementKind::Text | ElementKind::Group => (String::new(), String::new()),
        };
        trace!("html node {id}: {open:?} {close:?}");

        let node = tree.node_mut(id);
        node.start = node.start.replacen(SLOT, &open, 1);
        node.end = node.end.replacen(SLOT, &close, 1);
        renumber(node, &mut ctx.tabstops)?;
    }
    Ok(())
}

fn tag(tree: &OutputTree, id: NodeId, profile: &Profile) -> (String, String) {
    let node = tree.node(id);
    let name = profile.tag_name(node.name.as_deref().unwrap_or_default());
    let mut carets = Carets::starting_after(written_field(node));
    let attrs = attributes(node, profile, &mut carets);

    if is_unary(tree, id, profile) {
        return (format!("<{name}{attrs}{}>", profile.self_closing_marker()), String::new());
    }

    let mut open = format!("<{name}{attrs}>");
    if profile.place_cursor && !tree.has_children(id) && node.content.is_empty() {
        open.push_str(&carets.next());
    }
    (open, format!("</{name}>"))
}

fn attributes(node: &OutputNode, profile: &Profile, carets: &mut Carets) -> String {
    let quote = profile.quote();
    let mut out = String::new();

    for attr in &node.attributes {
        let Some(name) = attr.name.as_deref() else {
            continue;
        };
        let value = attr.value.as_deref().unwrap_or_default();
        if attr.implied && value.is_empty() {
            continue;
        }

        let attr_name = profile.attribute_name(name);
        if value.is_empty() && (attr.boolean || profile.is_boolean_attribute(name)) {
            if profile.compact_boolean_attributes {
                out.push_str(&format!(" {attr_name}"));
            } else {
                out.push_str(&format!(" {attr_name}={quote}{attr_name}{quote}"));
            }
            continue;
        }

        let value = if value.is_empty() && profile.place_cursor {
            carets.next()
        } else {
            value.to_string()
        };
        out.push_str(&format!(" {attr_name}={quote}{value}{quote}"));
    }
    out
}

/// Both halves of a text snippet around `${child}`, with `${name}`
/// variables filled in.
pub(super) fn snippet(
    node: &OutputNode,
    template: &str,
    pad: &str,
    ctx: &FilterContext<'_>,
) -> (String, String) {
    let (before, after) = template.split_once(CHILD).unwrap_or((template, ""));

    let mut carets = Carets::starting_after(max_field(template));

    let mut fill = |text: &str| {
        let text = VARIABLE.replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            if let Some(value) = node.attribute_value(name) {
                return value.to_string();
            }
            if let Some(variable) = ctx.variables.resolve(name) {
                return variable.render(name);
            }
            format!("${{{}:{name}}}", carets.next_index())
        });
        pad_string(&text, pad)
    };

    let open = fill(before);
    let close = fill(after);
    (open, close)
}

/// Highest field index already present in the attribute values or content
/// of `node`.
pub(super) fn written_field(node: &OutputNode) -> usize {
    node.attributes
        .iter()
        .filter_map(|attr| attr.value.as_deref())
        .chain([node.content.as_str()])
        .map(max_field)
        .max()
        .unwrap_or(0)
}

/// Highest field index written in `text`.
pub(super) fn max_field(text: &str) -> usize {
    fields::parse(text)
        .map(|parsed| parsed.fields.iter().map(|f| f.index).max().unwrap_or(0))
        .unwrap_or(0)
}

/// Moves the fields of a node past everything handed out so far.
pub(super) fn renumber(node: &mut OutputNode, tabstops: &mut usize) -> Result<(), ExpandError> {
    let offset = *tabstops;
    let mut local = 0;
    for slot in [&mut node.start, &mut node.end, &mut node.content] {
        let (text, max) = fields::shift_indices(slot, offset).map_err(|err| ExpandError::Field {
            message: err.message,
            pos: err.pos,
        })?;
        *slot = text;
        local = local.max(max);
    }
    *tabstops += local;
    Ok(())
}
