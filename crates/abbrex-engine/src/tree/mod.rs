//! From parsed abbreviation to concrete output tree.
//!
//! [`Resolver`] matches abbreviation nodes against the snippet registries and
//! produces a [`ResolvedElement`] tree. [`rollout`] then expands repeats into
//! an [`OutputTree`] that the filters format and serialize.

mod implicit;
mod numbering;
mod output;
mod resolve;
mod rollout;

use serde::Serialize;

use crate::markup::{Attribute, Repeat};

pub use implicit::implicit_tag;
pub use numbering::{Counter, replace_numbering, replace_repeater};
pub use output::{NodeId, OutputNode, OutputTree, SLOT};
pub use resolve::Resolver;
pub use rollout::rollout;

/// What an element prints as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ElementKind {
    Tag,
    /// Text snippet; holds the template with its `${child}` marker.
    Snippet(String),
    /// Bare `{text}` with no tag around it.
    Text,
    /// Repeated `(...)` group. Rollout splices its children into the parent.
    Group,
}

/// Abbreviation node after snippet lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedElement {
    pub kind: ElementKind,
    /// Tag name for tags, snippet name for snippets.
    pub name: Option<String>,
    pub attributes: Vec<Attribute>,
    pub text: Option<String>,
    pub repeat: Option<Repeat>,
    pub self_closing: bool,
    pub children: Vec<ResolvedElement>,
    /// Synthetic container of a whole expansion.
    pub is_root: bool,
}

impl ResolvedElement {
    pub fn root(children: Vec<ResolvedElement>) -> Self {
        Self {
            kind: ElementKind::Group,
            name: None,
            attributes: Vec::new(),
            text: None,
            repeat: None,
            self_closing: false,
            children,
            is_root: true,
        }
    }

    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.is_named(name))
            .and_then(|a| a.value.as_deref())
    }

    /// Deepest last descendant, or the element itself.
    pub fn deepest_mut(&mut self) -> &mut ResolvedElement {
        let mut node = self;
        while !node.children.is_empty() {
            let last = node.children.len() - 1;
            node = &mut node.children[last];
        }
        node
    }

    /// Visits the element and all its descendants, parents first.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut ResolvedElement)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    /// First descendant (or self) repeated by a bare `*`.
    pub fn find_line_repeat_mut(&mut self) -> Option<&mut ResolvedElement> {
        if self.repeat.is_some_and(|r| r.implicit) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(ResolvedElement::find_line_repeat_mut)
    }
}
