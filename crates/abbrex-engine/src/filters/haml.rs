//! HAML serializer: `%tag#id.class{:attr => "value"}` with nesting by
//! indentation only.

use super::html::{Carets, renumber, snippet, written_field};
use super::{FilterContext, is_unary, outer_padding};
use crate::error::ExpandError;
use crate::profile::{Profile, SelfClosing};
use crate::tree::{ElementKind, NodeId, OutputNode, OutputTree, SLOT};

pub(super) fn haml(tree: &mut OutputTree, ctx: &mut FilterContext<'_>) -> Result<(), ExpandError> {
    ctx.tabstops = 0;
    for id in tree.ids() {
        let pad = outer_padding(tree, id, ctx);
        let open = match &tree.node(id).kind {
            ElementKind::Tag => tag(tree, id, ctx.profile),
            ElementKind::Snippet(template) => snippet(tree.node(id), template, &pad, ctx).0,
            ElementKind::Text | ElementKind::Group => String::new(),
        };

        let node = tree.node_mut(id);
        node.start = node.start.replacen(SLOT, &open, 1);
        node.end = node.end.replacen(SLOT, "", 1);
        renumber(node, &mut ctx.tabstops)?;
    }
    Ok(())
}

fn tag(tree: &OutputTree, id: NodeId, profile: &Profile) -> String {
    let node = tree.node(id);
    let name = profile.tag_name(node.name.as_deref().unwrap_or_default());
    let mut carets = Carets::starting_after(written_field(node));
    let (short, hash) = attributes(node, profile, &mut carets);

    let mut out = String::new();
    if name != "div" || short.is_empty() || !hash.is_empty() {
        out.push('%');
        out.push_str(&name);
    }
    out.push_str(&short);
    if !hash.is_empty() {
        out.push_str(&format!("{{{}}}", hash.join(", ")));
    }
    if profile.self_closing != SelfClosing::Html && is_unary(tree, id, profile) {
        out.push('/');
    }
    if !node.content.is_empty() {
        out.push(' ');
    }
    out
}

/// `#id.class` shorthand plus the `:name => "value"` pairs of everything else.
fn attributes(node: &OutputNode, profile: &Profile, carets: &mut Carets) -> (String, Vec<String>) {
    let quote = profile.quote();
    let mut short = String::new();
    let mut hash = Vec::new();

    for attr in &node.attributes {
        let Some(name) = attr.name.as_deref() else {
            continue;
        };
        let value = attr.value.as_deref().unwrap_or_default();
        if attr.implied && value.is_empty() {
            continue;
        }

        if name.eq_ignore_ascii_case("id") && !value.is_empty() {
            short.push_str(&format!("#{value}"));
            continue;
        }
        if name.eq_ignore_ascii_case("class") && !value.is_empty() {
            short.push('.');
            short.push_str(&value.split_whitespace().collect::<Vec<_>>().join("."));
            continue;
        }

        let attr_name = profile.attribute_name(name);
        if value.is_empty() && (attr.boolean || profile.is_boolean_attribute(name)) {
            hash.push(format!(":{attr_name} => true"));
            continue;
        }

        let value = if value.is_empty() && profile.place_cursor {
            carets.next()
        } else {
            value.to_string()
        };
        hash.push(format!(":{attr_name} => {quote}{value}{quote}"));
    }

    (short, hash)
}
