//! Expands repeats of a resolved tree into concrete output nodes.

use std::borrow::Cow;

use super::numbering::{Counter, replace_numbering, replace_repeater};
use super::output::{NodeId, OutputNode, OutputTree};
use super::{ElementKind, ResolvedElement};
use crate::error::ExpandError;

/// Builds the output tree for `root`.
///
/// `text` is pasted content: with a bare `*` in the abbreviation every
/// non-empty line gets its own copy, otherwise the whole text goes into the
/// deepest element (or wherever `$#` is written). The product of nested
/// repeat counts may not exceed `max_repeat`.
pub fn rollout(
    root: &ResolvedElement,
    text: Option<&str>,
    max_repeat: usize,
) -> Result<OutputTree, ExpandError> {
    let mut root = Cow::Borrowed(root);
    let text = text.map(str::trim).filter(|t| !t.is_empty());

    let mut lines = Vec::new();
    if let Some(text) = text {
        let root = root.to_mut();
        if root.find_line_repeat_mut().is_some() {
            lines = text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect();
        } else if !replace_in_tree(root, text) {
            wrap(root, text);
        }
    }

    let mut state = Rollout {
        tree: OutputTree::new(),
        lines,
        max_repeat,
    };
    for child in &root.children {
        state.emit(OutputTree::ROOT, child, None, 1)?;
    }
    Ok(state.tree)
}

struct Rollout {
    tree: OutputTree,
    lines: Vec<String>,
    max_repeat: usize,
}

impl Rollout {
    fn emit(
        &mut self,
        parent: NodeId,
        node: &ResolvedElement,
        repeater: Option<Counter>,
        multiplier: usize,
    ) -> Result<(), ExpandError> {
        let line_repeat = node.repeat.is_some_and(|r| r.implicit);
        let count = match node.repeat {
            Some(repeat) if repeat.implicit => self.lines.len().max(1),
            Some(repeat) => repeat.count,
            None => 1,
        };

        let total = multiplier.saturating_mul(count);
        if total > self.max_repeat {
            return Err(ExpandError::LimitExceeded {
                count: total,
                limit: self.max_repeat,
            });
        }

        for i in 0..count {
            let counter = match node.repeat {
                Some(_) => Some(Counter {
                    value: i + 1,
                    total: count,
                }),
                None => repeater,
            };

            let source = if line_repeat {
                let line = self.lines.get(i).cloned().unwrap_or_default();
                let mut copy = node.clone();
                if !replace_in_tree(&mut copy, &line) && !line.is_empty() {
                    append_text(copy.deepest_mut(), &line);
                }
                Cow::Owned(copy)
            } else {
                Cow::Borrowed(node)
            };

            let id = match source.kind {
                ElementKind::Group => parent,
                _ => self.tree.push(parent, output_node(&source, counter)),
            };
            for child in &source.children {
                self.emit(id, child, counter, total)?;
            }
        }

        Ok(())
    }
}

fn output_node(node: &ResolvedElement, counter: Option<Counter>) -> OutputNode {
    let number = |text: &str| match counter {
        Some(counter) => replace_numbering(text, counter),
        None => text.to_string(),
    };

    let mut out = OutputNode::new(node.kind.clone());
    out.name = node.name.as_deref().map(number);
    out.attributes = node
        .attributes
        .iter()
        .map(|attr| {
            let mut attr = attr.clone();
            attr.name = attr.name.as_deref().map(number);
            attr.value = attr.value.as_deref().map(number);
            attr
        })
        .collect();
    out.text = node.text.as_deref().map(number);
    out.self_closing = node.self_closing;
    out.counter = counter.map_or(1, |c| c.value);
    out
}

/// Replaces `$#` anywhere in the subtree; reports whether any was found.
fn replace_in_tree(node: &mut ResolvedElement, value: &str) -> bool {
    let mut replaced = false;
    node.walk_mut(&mut |item| {
        let mut swap = |slot: &mut Option<String>| {
            if let Some(new) = slot.as_deref().and_then(|text| replace_repeater(text, value)) {
                *slot = Some(new);
                replaced = true;
            }
        };
        swap(&mut item.name);
        swap(&mut item.text);
        for attr in &mut item.attributes {
            swap(&mut attr.value);
        }
    });
    replaced
}

fn append_text(node: &mut ResolvedElement, text: &str) {
    let joined = match node.text.take() {
        Some(existing) => existing + text,
        None => text.to_string(),
    };
    node.text = Some(joined);
}

/// Puts wrapped text into the deepest element of the last top-level node.
fn wrap(root: &mut ResolvedElement, text: &str) {
    if root.children.is_empty() {
        root.children.push(ResolvedElement {
            kind: ElementKind::Text,
            name: None,
            attributes: Vec::new(),
            text: Some(text.to_string()),
            repeat: None,
            self_closing: false,
            children: Vec::new(),
            is_root: false,
        });
        return;
    }
    append_text(root.deepest_mut(), text);
}
