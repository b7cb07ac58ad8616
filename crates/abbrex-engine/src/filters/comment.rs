//! `c`: comments around block elements that carry an id or a class.
//!
//! Templates use `[#ID]` and `[.CLASS]` placeholders; each disappears when
//! the element has no such attribute.

use super::{FilterContext, is_block, outer_padding, pad_string};
use crate::profile::TagNewline;
use crate::tree::{ElementKind, OutputNode, OutputTree};

pub(super) fn comment(tree: &mut OutputTree, ctx: &FilterContext<'_>) {
    if ctx.profile.tag_newline == TagNewline::Never {
        return;
    }

    for id in tree.ids() {
        let node = tree.node(id);
        if node.kind != ElementKind::Tag || !is_block(node, ctx.profile) {
            continue;
        }
        let id_value = node.attribute_value("id").unwrap_or_default();
        let class_value = node.attribute_value("class").unwrap_or_default();
        if id_value.trim().is_empty() && class_value.trim().is_empty() {
            continue;
        }

        let pad = outer_padding(tree, id, ctx);
        let before = pad_string(&fill(&ctx.options.comment_before, node), &pad);
        let after = pad_string(&fill(&ctx.options.comment_after, node), &pad);

        let node = tree.node_mut(id);
        if !before.is_empty()
            && let Some(pos) = node.start.find('<')
        {
            node.start.insert_str(pos, &before);
        }
        if let Some(pos) = node.end.find('>') {
            node.end.insert_str(pos + 1, &after);
        }
    }
}

fn fill(template: &str, node: &OutputNode) -> String {
    let id = node
        .attribute_value("id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| format!("#{id}"))
        .unwrap_or_default();
    let classes: Vec<&str> = node
        .attribute_value("class")
        .unwrap_or_default()
        .split_whitespace()
        .collect();
    let class = if classes.is_empty() {
        String::new()
    } else {
        format!(".{}", classes.join("."))
    };
    template.replace("[#ID]", &id).replace("[.CLASS]", &class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Filter;
    use crate::markup::Attribute;
    use crate::options::MarkupOptions;
    use crate::profile::Profile;
    use crate::registry::Registry;
    use pretty_assertions::assert_eq;

    fn tag(name: &str, attributes: Vec<Attribute>) -> OutputNode {
        OutputNode {
            name: Some(name.into()),
            attributes,
            ..OutputNode::new(ElementKind::Tag)
        }
    }

    fn run(mut tree: OutputTree, options: &MarkupOptions) -> String {
        let profile = Profile::default();
        let variables = Registry::new();
        let mut ctx = FilterContext::new(&profile, options, &variables);
        for filter in [Filter::Format, Filter::Html, Filter::Comment] {
            filter.apply(&mut tree, &mut ctx).unwrap();
        }
        tree.render()
    }

    #[test]
    fn comment_after_block_with_id_and_class() {
        let mut tree = OutputTree::new();
        let div = tree.push(
            OutputTree::ROOT,
            tag("div", vec![Attribute::new("id", "main"), Attribute::new("class", "a b")]),
        );
        tree.push(div, tag("p", vec![Attribute::new("class", "x")]));
        tree.push(div, tag("span", vec![Attribute::new("class", "y")]));
        assert_eq!(
            run(tree, &MarkupOptions::default()),
            "<div id=\"main\" class=\"a b\">\n\
             \t<p class=\"x\">${1}</p>\n\
             \t<!-- /.x -->\n\
             \t<span class=\"y\">${2}</span>\n\
             </div>\n\
             <!-- /#main.a.b -->"
        );
    }

    #[test]
    fn before_template() {
        let mut tree = OutputTree::new();
        tree.push(OutputTree::ROOT, tag("div", vec![Attribute::new("id", "x")]));
        let options = MarkupOptions {
            comment_before: "<!-- [#ID] -->\n".into(),
            comment_after: String::new(),
            ..MarkupOptions::default()
        };
        assert_eq!(run(tree, &options), "<!-- #x -->\n<div id=\"x\">${1}</div>");
    }

    #[test]
    fn plain_elements_are_left_alone() {
        let mut tree = OutputTree::new();
        tree.push(OutputTree::ROOT, tag("div", vec![]));
        assert_eq!(run(tree, &MarkupOptions::default()), "<div>${1}</div>");
    }
}
