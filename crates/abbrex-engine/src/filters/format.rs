//! `_format`: where line breaks go and how deep each node is indented.
//!
//! Block elements start on their own line and close on their own line when
//! they hold other blocks. Inline elements stay on the parent's line unless
//! a run of `inline_break` of them sits next to each other, in which case
//! every one of them gets a line.

use log::trace;

use super::{
    Filter, FilterContext, has_block_children, has_tags_in_content, is_block, is_inline, is_unary,
    outer_padding, pad_string,
};
use crate::profile::{Profile, TagNewline};
use crate::tree::{ElementKind, NodeId, OutputTree, SLOT};

struct Layout {
    start: String,
    end: String,
    /// Padding for lines inside the node.
    padding: String,
    content_padding: String,
}

pub(super) fn format(tree: &mut OutputTree, ctx: &FilterContext<'_>) {
    for id in tree.ids() {
        let pad = outer_padding(tree, id, ctx);
        let layout = if ctx.serializer == Filter::Haml {
            indented_layout(tree, id, ctx.profile, pad)
        } else {
            layout(tree, id, ctx.profile, pad)
        };
        trace!("format node {id}: {:?} / {:?}", layout.start, layout.end);

        let node = tree.node_mut(id);
        node.content = pad_string(node.text.as_deref().unwrap_or_default(), &layout.content_padding);
        node.start = layout.start;
        node.end = layout.end;
        node.padding = layout.padding;
    }
}

fn layout(tree: &OutputTree, id: NodeId, profile: &Profile, pad: String) -> Layout {
    let node = tree.node(id);
    let newlines = profile.tag_newline != TagNewline::Never;
    let nl_pad = format!("\n{pad}");
    let mut start = SLOT.to_string();
    let mut end = SLOT.to_string();

    match &node.kind {
        ElementKind::Snippet(template) => {
            let parent = tree.parent(id).unwrap_or(OutputTree::ROOT);
            if newlines
                && !tree.is_very_first_child(id)
                && (parent == OutputTree::ROOT || !is_inline(tree.node(parent), profile))
            {
                start = format!("{nl_pad}{SLOT}");
            }
            let padding = format!("{pad}{}", snippet_indent(template, &profile.indent));
            Layout {
                start,
                end,
                content_padding: padding.clone(),
                padding,
            }
        }
        ElementKind::Text | ElementKind::Group => Layout {
            start,
            end,
            padding: pad.clone(),
            content_padding: pad,
        },
        ElementKind::Tag => {
            let inner = format!("{pad}{}", profile.indent);
            if newlines {
                let parent = tree.parent(id).unwrap_or(OutputTree::ROOT);
                let force = profile.tag_newline == TagNewline::Always && tree.has_children(id);
                let first_in_snippet = matches!(tree.node(parent).kind, ElementKind::Snippet(_))
                    && tree.previous_sibling(id).is_none();

                if should_add_line_break(tree, id, profile) {
                    if !tree.is_very_first_child(id) && !first_in_snippet {
                        start = format!("{nl_pad}{start}");
                    }
                    if has_block_children(tree, id, profile)
                        || should_break_child(tree, id, profile)
                        || (force && !is_unary(tree, id, profile))
                    {
                        end = format!("{nl_pad}{end}");
                    }
                    if has_tags_in_content(node) {
                        start = format!("{start}\n{inner}");
                    }
                } else if is_inline(node, profile)
                    && has_block_children(tree, parent, profile)
                    && !tree.is_very_first_child(id)
                {
                    start = format!("{nl_pad}{start}");
                } else if is_inline(node, profile) && has_block_children(tree, id, profile) {
                    end = format!("{nl_pad}{end}");
                }
            }
            Layout {
                start,
                end,
                content_padding: inner.clone(),
                padding: inner,
            }
        }
    }
}

/// Indentation-only layout: every node after the first starts a new line
/// and nothing needs closing.
fn indented_layout(tree: &OutputTree, id: NodeId, profile: &Profile, pad: String) -> Layout {
    let start = if tree.is_very_first_child(id) {
        SLOT.to_string()
    } else {
        format!("\n{pad}{SLOT}")
    };
    let inner = format!("{pad}{}", profile.indent);
    Layout {
        start,
        end: SLOT.to_string(),
        content_padding: inner.clone(),
        padding: inner,
    }
}

/// Extra indentation of `${child}` inside a snippet template: the leading
/// whitespace of its line when the template breaks lines before it.
fn snippet_indent<'a>(template: &'a str, indent: &'a str) -> &'a str {
    let before = template.split("${child}").next().unwrap_or_default();
    match before.rsplit_once('\n') {
        Some((_, last)) => {
            let trimmed = last.trim_start();
            &last[..last.len() - trimmed.len()]
        }
        None => indent,
    }
}

fn should_add_line_break(tree: &OutputTree, id: NodeId, profile: &Profile) -> bool {
    if profile.tag_newline == TagNewline::Always || is_block(tree.node(id), profile) {
        return true;
    }
    tree.parent(id)
        .is_some_and(|parent| should_format_inline(tree, parent, profile))
}

fn should_break_child(tree: &OutputTree, id: NodeId, profile: &Profile) -> bool {
    tree.children(id)
        .first()
        .is_some_and(|&first| should_add_line_break(tree, first, profile))
}

/// `inline_break` or more consecutive inline tags among the children.
fn should_format_inline(tree: &OutputTree, id: NodeId, profile: &Profile) -> bool {
    if profile.inline_break == 0 {
        return false;
    }
    let mut run = 0;
    for &child in tree.children(id) {
        let node = tree.node(child);
        if node.kind == ElementKind::Text || !is_inline(node, profile) {
            run = 0;
        } else {
            run += 1;
        }
        if run >= profile.inline_break {
            return true;
        }
    }
    false
}
