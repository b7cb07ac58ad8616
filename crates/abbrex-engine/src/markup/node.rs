use serde::Serialize;

/// A single `[name=value]` entry of an abbreviation node.
///
/// `name` is `None` for a default (nameless) attribute such as `a[foo.html]`;
/// the resolver hands its value to the first empty attribute of the matched
/// snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: Option<String>,
    pub value: Option<String>,
    /// `[disabled.]`: output as a bare attribute name.
    pub boolean: bool,
    /// `[!title]`: dropped from output when it ends up without a value.
    pub implied: bool,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Attribute with a name and no value, e.g. `href` in `a[href]`.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

/// Multiplier of a node: `*3` or a bare `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Repeat {
    pub count: usize,
    /// Bare `*`: the count comes from the lines of pasted text.
    pub implicit: bool,
}

/// Node of a parsed markup abbreviation.
///
/// # Invariants
///
/// - A node with a [`Repeat`] is repeating, whatever its count.
/// - A node with no name, attributes, text, repeat or self-closing flag is
///   structural only and gets spliced out by [`squash`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AbbreviationNode {
    pub name: Option<String>,
    pub attributes: Vec<Attribute>,
    pub text: Option<String>,
    pub repeat: Option<Repeat>,
    pub self_closing: bool,
    pub children: Vec<AbbreviationNode>,
}

impl AbbreviationNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Number of copies rollout emits. Implicit repeats report 1 until text
    /// lines are distributed.
    #[must_use]
    pub fn count(&self) -> usize {
        self.repeat.map_or(1, |r| r.count)
    }

    #[must_use]
    pub fn is_repeating(&self) -> bool {
        self.repeat.is_some()
    }

    #[must_use]
    pub fn is_line_repeat(&self) -> bool {
        self.repeat.is_some_and(|r| r.implicit)
    }

    /// True for nodes that carry nothing but children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_group() && self.repeat.is_none() && !self.self_closing
    }

    /// No name, attributes or text; may still carry a repeat.
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.name.is_none() && self.attributes.is_empty() && self.text.is_none()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is_named(name))
    }

    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(|a| a.value.as_deref())
    }

    /// Adds an attribute, joining `class` values with a space and letting
    /// any other named attribute overwrite an earlier one in place.
    pub fn set_attribute(&mut self, attr: Attribute) {
        let Some(name) = attr.name.as_deref() else {
            self.attributes.push(attr);
            return;
        };

        if let Some(existing) = self.attributes.iter_mut().find(|a| a.is_named(name)) {
            if name == "class" {
                existing.value = join_class(existing.value.take(), attr.value);
            } else {
                *existing = attr;
            }
        } else {
            self.attributes.push(attr);
        }
    }

    /// Appends a class name to the `class` attribute.
    pub fn add_class(&mut self, class: &str) {
        if !class.is_empty() {
            self.set_attribute(Attribute::new("class", class));
        }
    }

    /// Deepest last descendant, or the node itself when it has no children.
    pub fn deepest_mut(&mut self) -> &mut AbbreviationNode {
        let mut node = self;
        while !node.children.is_empty() {
            let last = node.children.len() - 1;
            node = &mut node.children[last];
        }
        node
    }
}

fn join_class(a: Option<String>, b: Option<String>) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => Some(format!("{a} {b}")),
        (Some(a), Some(b)) if a.is_empty() => Some(b),
        (a, None) => a,
        (None, b) => b,
        (a, _) => a,
    }
}

/// Splices out structural-only nodes, promoting their children.
///
/// Splicing can expose further empty nodes, so each child list is re-checked
/// until it is stable. Squashing a squashed tree is a no-op.
pub fn squash(node: &mut AbbreviationNode) {
    loop {
        let mut changed = false;
        let children = std::mem::take(&mut node.children);
        for child in children {
            if child.is_empty() {
                changed = true;
                node.children.extend(child.children);
            } else {
                node.children.push(child);
            }
        }
        if !changed {
            break;
        }
    }

    for child in &mut node.children {
        squash(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn class_attributes_concatenate() {
        let mut node = AbbreviationNode::named("div");
        node.add_class("a");
        node.add_class("b");
        node.set_attribute(Attribute::new("class", "c"));
        assert_eq!(node.attribute_value("class"), Some("a b c"));
        assert_eq!(node.attributes.len(), 1);
    }

    #[test]
    fn other_attributes_overwrite_in_place() {
        let mut node = AbbreviationNode::named("a");
        node.set_attribute(Attribute::empty("href"));
        node.set_attribute(Attribute::new("title", "t"));
        node.set_attribute(Attribute::new("href", "/x"));
        assert_eq!(node.attributes[0], Attribute::new("href", "/x"));
        assert_eq!(node.attributes[1].name.as_deref(), Some("title"));
    }

    #[test]
    fn nameless_attributes_are_kept() {
        let mut node = AbbreviationNode::named("a");
        node.set_attribute(Attribute {
            value: Some("x".into()),
            ..Attribute::default()
        });
        node.set_attribute(Attribute {
            value: Some("y".into()),
            ..Attribute::default()
        });
        assert_eq!(node.attributes.len(), 2);
    }

    #[test]
    fn squash_promotes_children_of_nested_empty_nodes() {
        let mut root = AbbreviationNode {
            children: vec![AbbreviationNode {
                children: vec![
                    AbbreviationNode {
                        children: vec![AbbreviationNode::named("a")],
                        ..Default::default()
                    },
                    AbbreviationNode::named("b"),
                ],
                ..Default::default()
            }],
            ..Default::default()
        };

        squash(&mut root);
        let names: Vec<_> = root.children.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec![Some("a".to_string()), Some("b".to_string())]);

        let once = root.clone();
        squash(&mut root);
        assert_eq!(root, once);
    }

    #[test]
    fn repeating_groups_survive_squash() {
        let mut root = AbbreviationNode {
            children: vec![AbbreviationNode {
                repeat: Some(Repeat {
                    count: 2,
                    implicit: false,
                }),
                children: vec![AbbreviationNode::named("a")],
                ..Default::default()
            }],
            ..Default::default()
        };
        squash(&mut root);
        assert_eq!(root.children.len(), 1);
        assert!(root.children[0].is_group());
        assert_eq!(root.children[0].count(), 2);
    }

    #[test]
    fn deepest_follows_last_children() {
        let mut node = AbbreviationNode::named("ul");
        node.children.push(AbbreviationNode::named("li"));
        node.children[0].children.push(AbbreviationNode::named("a"));
        node.children[0].children.push(AbbreviationNode::named("b"));
        assert_eq!(node.deepest_mut().name.as_deref(), Some("b"));
    }
}
