//! Snippet resolution for markup abbreviations.
//!
//! Resolution runs in two passes. The first replaces every node whose name
//! is an abbreviation snippet (`a` -> `a[href]`, `menu` -> `ul.menu>li`)
//! with the parsed snippet, merging the node into the snippet's deepest
//! element. The second classifies what is left into tags, text snippets,
//! bare text and repeated groups, filling in implicit tag names.

use std::mem;

use log::debug;

use super::implicit::implicit_tag;
use super::{ElementKind, ResolvedElement};
use crate::error::ExpandError;
use crate::markup::{self, AbbreviationNode};
use crate::options::MarkupOptions;
use crate::profile::Profile;
use crate::registry::{Registry, Snippet};

pub struct Resolver<'a> {
    pub abbreviations: &'a Registry,
    pub snippets: &'a Registry,
    pub profile: &'a Profile,
    pub options: &'a MarkupOptions,
    pub max_repeat: usize,
}

impl<'a> Resolver<'a> {
    pub fn resolve(&self, mut root: AbbreviationNode) -> Result<ResolvedElement, ExpandError> {
        let mut stack = Vec::new();
        let children = self.expand_children(mem::take(&mut root.children), &mut stack)?;
        let children = children
            .into_iter()
            .map(|child| self.classify(child, None))
            .collect();
        Ok(ResolvedElement::root(children))
    }

    fn expand_children(
        &self,
        children: Vec<AbbreviationNode>,
        stack: &mut Vec<String>,
    ) -> Result<Vec<AbbreviationNode>, ExpandError> {
        let mut result = Vec::with_capacity(children.len());
        for mut child in children {
            child.children = self.expand_children(mem::take(&mut child.children), stack)?;
            result.extend(self.expand_node(child, stack)?);
        }
        Ok(result)
    }

    /// Replaces `node` with the content of its abbreviation snippet, if any.
    fn expand_node(
        &self,
        node: AbbreviationNode,
        stack: &mut Vec<String>,
    ) -> Result<Vec<AbbreviationNode>, ExpandError> {
        let Some(name) = node.name.as_deref() else {
            return Ok(vec![node]);
        };
        let Some(snippet) = self.lookup(name) else {
            return Ok(vec![node]);
        };

        let key = snippet.key.as_str().to_string();
        if stack.contains(&key) {
            // a snippet that mentions its own name (`a` -> `a[href]`)
            return Ok(vec![node]);
        }

        let source = snippet.render(name);
        debug!("abbreviation {name:?} -> {source:?}");
        let mut tree = markup::parse(&source, self.max_repeat)?;

        stack.push(key);
        let expanded = self.expand_children(mem::take(&mut tree.children), stack);
        stack.pop();
        tree.children = expanded?;

        if tree.children.is_empty() {
            return Ok(vec![node]);
        }

        let deepest = tree.deepest_mut();
        *deepest = merge(mem::take(deepest), node);
        Ok(tree.children)
    }

    fn lookup(&self, name: &str) -> Option<&'a Snippet> {
        if let Some(snippet) = self.abbreviations.resolve(name) {
            return Some(snippet);
        }

        let variant = if name.contains(':') {
            name.replace(':', "-")
        } else {
            name.replace('-', ":")
        };
        if variant != name
            && let Some(snippet) = self.abbreviations.resolve(&variant)
        {
            return Some(snippet);
        }

        if self.options.fuzzy_search {
            return self
                .abbreviations
                .find_best_match(name, self.options.fuzzy_min_score);
        }
        None
    }

    fn classify(&self, node: AbbreviationNode, parent: Option<&str>) -> ResolvedElement {
        let AbbreviationNode {
            name,
            attributes,
            text,
            repeat,
            self_closing,
            children,
        } = node;

        let (kind, name) = match name {
            Some(name) => match self.snippets.resolve(&name) {
                Some(snippet) => {
                    debug!("text snippet {name:?}");
                    (ElementKind::Snippet(snippet.render(&name)), Some(name))
                }
                None => (ElementKind::Tag, Some(name)),
            },
            None if attributes.iter().any(|a| a.name.is_some()) => {
                let tag = implicit_tag(parent, self.profile);
                (ElementKind::Tag, Some(tag.to_string()))
            }
            None if text.is_some() => (ElementKind::Text, None),
            None => (ElementKind::Group, None),
        };

        let scope = match kind {
            ElementKind::Tag => name.as_deref(),
            ElementKind::Group | ElementKind::Text => parent,
            ElementKind::Snippet(_) => None,
        };
        let children = children
            .into_iter()
            .map(|child| self.classify(child, scope))
            .collect();

        ResolvedElement {
            kind,
            name,
            attributes,
            text,
            repeat,
            self_closing,
            children,
            is_root: false,
        }
    }
}

/// Merges an abbreviation node into the element its snippet resolved to.
///
/// The snippet element supplies the name; everything the user wrote wins
/// over snippet defaults, except `class`, which accumulates. A nameless
/// attribute value (`a['page.html']`) fills the first empty snippet attribute.
fn merge(target: AbbreviationNode, node: AbbreviationNode) -> AbbreviationNode {
    let mut snippet_attributes = target.attributes;
    let mut own_attributes = Vec::with_capacity(node.attributes.len());

    for attr in node.attributes {
        if attr.name.is_some() {
            own_attributes.push(attr);
            continue;
        }
        match snippet_attributes
            .iter_mut()
            .find(|a| a.name.is_some() && a.value.is_none())
        {
            Some(slot) => slot.value = attr.value,
            None => debug!("no attribute to take default value {:?}", attr.value),
        }
    }

    let mut merged = AbbreviationNode {
        name: target.name,
        attributes: Vec::new(),
        text: node.text.or(target.text),
        repeat: node.repeat.or(target.repeat),
        self_closing: node.self_closing || target.self_closing,
        children: node.children,
    };
    for attr in snippet_attributes.into_iter().chain(own_attributes) {
        merged.set_attribute(attr);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Attribute;
    use crate::registry::Storage;
    use pretty_assertions::assert_eq;

    struct Fixture {
        abbreviations: Registry,
        snippets: Registry,
        profile: Profile,
        options: MarkupOptions,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                abbreviations: Registry::from_levels([Storage::from_pairs([
                    ("a", "a[href]"),
                    ("img", "img[src alt]/"),
                    ("menu", "ul.menu>li"),
                    ("btn", "button.btn[type=button]"),
                    ("loop", "loop>loop"),
                    ("xsl:when", "xsl:when[test]"),
                ])]),
                snippets: Registry::from_levels([Storage::from_pairs([(
                    "cc:ie",
                    "<!--[if IE]>${child}<![endif]-->",
                )])]),
                profile: Profile::default(),
                options: MarkupOptions::default(),
            }
        }

        fn resolve(&self, abbr: &str) -> ResolvedElement {
            let resolver = Resolver {
                abbreviations: &self.abbreviations,
                snippets: &self.snippets,
                profile: &self.profile,
                options: &self.options,
                max_repeat: 1000,
            };
            resolver.resolve(markup::parse(abbr, 1000).unwrap()).unwrap()
        }
    }

    fn summary(node: &ResolvedElement) -> String {
        let mut out = match &node.kind {
            ElementKind::Tag => node.name.clone().unwrap_or_default(),
            ElementKind::Snippet(_) => format!("@{}", node.name.clone().unwrap_or_default()),
            ElementKind::Text => format!("{{{}}}", node.text.clone().unwrap_or_default()),
            ElementKind::Group => "()".to_string(),
        };
        for attr in &node.attributes {
            out.push_str(&format!(
                "[{}={}]",
                attr.name.clone().unwrap_or_default(),
                attr.value.clone().unwrap_or_default()
            ));
        }
        if !node.children.is_empty() {
            let children: Vec<_> = node.children.iter().map(summary).collect();
            out.push_str(&format!(">({})", children.join("+")));
        }
        out
    }

    fn resolved(abbr: &str) -> String {
        let root = Fixture::new().resolve(abbr);
        root.children.iter().map(summary).collect::<Vec<_>>().join("+")
    }

    #[test]
    fn snippet_supplies_default_attributes() {
        assert_eq!(resolved("a"), "a[href=]");
        assert_eq!(resolved("a[href=#x]"), "a[href=#x]");
        assert_eq!(resolved("a['page.html']"), "a[href=page.html]");
    }

    #[test]
    fn own_classes_accumulate() {
        assert_eq!(resolved("btn.big"), "button[class=btn big][type=button]");
    }

    #[test]
    fn children_go_to_the_deepest_snippet_node() {
        assert_eq!(resolved("menu"), "ul[class=menu]>(li)");
        assert_eq!(resolved("menu.x>a"), "ul[class=menu]>(li[class=x]>(a[href=]))");
    }

    #[test]
    fn self_closing_comes_from_snippet() {
        let root = Fixture::new().resolve("img");
        assert!(root.children[0].self_closing);
    }

    #[test]
    fn self_referencing_snippets_stop() {
        assert_eq!(resolved("loop"), "loop>(loop)");
    }

    #[test]
    fn dash_colon_variants() {
        assert_eq!(resolved("xsl-when"), "xsl:when[test=]");
    }

    #[test]
    fn implicit_tags_follow_parent() {
        assert_eq!(resolved("ul>.item"), "ul>(li[class=item])");
        assert_eq!(resolved("em>.x"), "em>(span[class=x])");
        assert_eq!(resolved("#main"), "div[id=main]");
    }

    #[test]
    fn text_snippets_and_text_nodes() {
        assert_eq!(resolved("cc:ie>p"), "@cc:ie>(p)");
        assert_eq!(resolved("{hello}"), "{hello}");
        assert_eq!(resolved("(a+b)*2"), "()>(a[href=]+b)");
    }

    #[test]
    fn merge_prefers_own_values() {
        let mut target = AbbreviationNode::named("input");
        target.attributes = vec![Attribute::new("type", "text"), Attribute::empty("name")];
        target.self_closing = true;
        let mut node = AbbreviationNode::named("inp");
        node.attributes = vec![Attribute::new("type", "email")];
        node.text = Some("x".into());

        let merged = merge(target, node);
        assert_eq!(merged.name.as_deref(), Some("input"));
        assert_eq!(merged.attribute_value("type"), Some("email"));
        assert_eq!(merged.attribute("name"), Some(&Attribute::empty("name")));
        assert!(merged.self_closing);
        assert_eq!(merged.text.as_deref(), Some("x"));
    }
}
