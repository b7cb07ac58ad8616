//! BEM class expansion.
//!
//! Class names written relative to an ancestor get the ancestor's block (and
//! element, for modifiers) prepended: inside `.menu`, `.__item` becomes
//! `menu__item` and `._active` becomes `menu_active`. A leading `-` is
//! shorthand for one element separator. A qualified name like
//! `block__elem_mod` produces both `block__elem` and `block__elem_mod`.

use std::collections::HashMap;
use std::sync::LazyLock;

use log::trace;
use regex::Regex;

use super::{Filter, FilterContext};
use crate::error::ExpandError;
use crate::options::MarkupOptions;
use crate::tree::{ElementKind, NodeId, OutputTree};

static BLOCK_WITH_DASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]-").unwrap());

/// Block, element and modifier a node ended up with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Bem {
    block: String,
    element: String,
    modifier: String,
}

pub(super) fn bem(tree: &mut OutputTree, ctx: &mut FilterContext<'_>) -> Result<(), ExpandError> {
    let mut names: HashMap<NodeId, Bem> = HashMap::new();

    for id in tree.ids() {
        if matches!(tree.node(id).kind, ElementKind::Snippet(_)) {
            continue;
        }

        let classes = tree.node(id).attribute_value("class").unwrap_or_default();
        let classes = normalize(classes, ctx.options);
        let mut own = Bem {
            block: guess_block(&classes),
            ..Bem::default()
        };

        let scope = Scope {
            tree,
            names: &names,
            options: ctx.options,
        };
        let mut result: Vec<String> = Vec::new();
        for class in &classes {
            for name in scope.expand(class, id, &mut own) {
                if !result.contains(&name) {
                    result.push(name);
                }
            }
        }
        trace!("bem {id}: {classes:?} -> {result:?}");

        if !result.is_empty() {
            tree.node_mut(id).set_attribute_value("class", result.join(" "));
        }
        names.insert(id, own);
    }

    if ctx.serialized {
        let serializer = ctx.serializer;
        Filter::Format.apply(tree, ctx)?;
        serializer.apply(tree, ctx)?;
    }
    Ok(())
}

/// Splits the class list and turns leading `-` runs into element separators.
fn normalize(classes: &str, options: &MarkupOptions) -> Vec<String> {
    classes
        .split_whitespace()
        .map(|class| {
            let rest = class.trim_start_matches('-');
            let dashes = class.len() - rest.len();
            format!("{}{rest}", options.bem_element_separator.repeat(dashes))
        })
        .collect()
}

fn guess_block(classes: &[String]) -> String {
    classes
        .iter()
        .find(|class| BLOCK_WITH_DASH.is_match(class))
        .or_else(|| {
            classes
                .iter()
                .find(|class| class.starts_with(|c: char| c.is_ascii_alphabetic()))
        })
        .cloned()
        .unwrap_or_default()
}

/// What class expansion can see: the tree and the names of nodes already
/// processed (every ancestor, since nodes are visited parents first).
struct Scope<'a> {
    tree: &'a OutputTree,
    names: &'a HashMap<NodeId, Bem>,
    options: &'a MarkupOptions,
}

impl Scope<'_> {
    fn expand(&self, class: &str, id: NodeId, own: &mut Bem) -> Vec<String> {
        let element_sep = self.options.bem_element_separator.as_str();
        let modifier_sep = self.options.bem_modifier_separator.as_str();

        let name = self.inherit(class, element_sep, false, id, own);
        let name = self.inherit(&name, modifier_sep, true, id, own);

        let (block, element, modifier) = if let Some((block, rest)) = name.split_once(element_sep) {
            let mut parts: Vec<&str> = rest.split(element_sep).collect();
            let last = parts.pop().unwrap_or_default();
            let (element_tail, modifier) = last.split_once(modifier_sep).unwrap_or((last, ""));
            parts.push(element_tail);
            (block.to_string(), parts.join(element_sep), modifier.to_string())
        } else if let Some((block, modifier)) = name.split_once(modifier_sep) {
            (block.to_string(), String::new(), modifier.to_string())
        } else {
            return vec![name];
        };

        let block = if block.is_empty() { own.block.clone() } else { block };
        let mut prefix = block.clone();
        if !element.is_empty() {
            prefix = format!("{prefix}{element_sep}{element}");
        }
        let mut result = vec![prefix.clone()];
        if !modifier.is_empty() {
            result.push(format!("{prefix}{modifier_sep}{modifier}"));
        }

        *own = Bem {
            block,
            element,
            modifier,
        };
        result
    }

    /// Resolves a leading run of `separator` against the ancestor that many
    /// levels up.
    fn inherit(&self, name: &str, separator: &str, is_modifier: bool, id: NodeId, own: &Bem) -> String {
        if separator.is_empty() || !name.starts_with(separator) {
            return name.to_string();
        }
        let clean = name.trim_start_matches(separator);
        let mut depth = (name.len() - clean.len()) / separator.len();

        let mut donor = id;
        while depth > 0
            && let Some(parent) = self.tree.parent(donor)
        {
            donor = parent;
            depth -= 1;
        }
        let donor = self.names.get(&donor).unwrap_or(own);

        let mut prefix = donor.block.clone();
        if is_modifier && !donor.element.is_empty() {
            prefix = format!("{prefix}{}{}", self.options.bem_element_separator, donor.element);
        }
        format!("{prefix}{separator}{clean}")
    }
}
