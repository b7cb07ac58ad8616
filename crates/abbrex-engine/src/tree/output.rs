//! Concrete output tree.
//!
//! Nodes live in a flat arena owned by [`OutputTree`]; parent and sibling
//! links are plain indices, so filters can walk in any direction while the
//! tree stays the single owner of every node.

use super::ElementKind;
use crate::markup::Attribute;

/// Marker in `start`/`end` where a serializer puts the tag text. The
/// formatter wraps it in line breaks and indentation first.
pub const SLOT: &str = "%s";

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct OutputNode {
    pub kind: ElementKind,
    pub name: Option<String>,
    pub attributes: Vec<Attribute>,
    pub text: Option<String>,
    pub self_closing: bool,
    /// 1-based position among the copies of the nearest repeater.
    pub counter: usize,
    pub start: String,
    pub end: String,
    pub content: String,
    /// Indentation for lines inside this node.
    pub padding: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl OutputNode {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            name: None,
            attributes: Vec::new(),
            text: None,
            self_closing: false,
            counter: 1,
            start: String::new(),
            end: String::new(),
            content: String::new(),
            padding: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.is_named(name))
            .and_then(|a| a.value.as_deref())
    }

    /// Sets a named attribute, replacing any previous value.
    pub fn set_attribute_value(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|a| a.is_named(name)) {
            Some(attr) => attr.value = Some(value),
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    pub fn tag_name(&self) -> Option<&str> {
        match self.kind {
            ElementKind::Tag => self.name.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputTree {
    nodes: Vec<OutputNode>,
}

impl Default for OutputTree {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputTree {
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![OutputNode::new(ElementKind::Group)],
        }
    }

    pub fn push(&mut self, parent: NodeId, mut node: OutputNode) -> NodeId {
        let id = self.nodes.len();
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &OutputNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut OutputNode {
        &mut self.nodes[id]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    #[must_use]
    pub fn has_children(&self, id: NodeId) -> bool {
        !self.nodes[id].children.is_empty()
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, index))
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        index.checked_sub(1).map(|i| self.children(parent)[i])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// First child of the root: the element that starts the output.
    #[must_use]
    pub fn is_very_first_child(&self, id: NodeId) -> bool {
        self.parent(id) == Some(Self::ROOT) && self.previous_sibling(id).is_none()
    }

    /// Every node below `id` in document order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            result.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        result
    }

    /// Every node except the root, in document order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.descendants(Self::ROOT)
    }

    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenates `start`, `content`, children and `end` of every node.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for &child in self.children(Self::ROOT) {
            self.render_node(child, &mut out);
        }
        out
    }

    fn render_node(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];
        out.push_str(&node.start);
        out.push_str(&node.content);
        for &child in &node.children {
            self.render_node(child, out);
        }
        out.push_str(&node.end);
    }
}
