//! Text post-processors: `e` (escape) and `s` (single line).

use std::sync::LazyLock;

use regex::Regex;

use crate::tree::OutputTree;

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+[ \t]*").unwrap());

/// Escapes `&`, `<` and `>` so the output can be pasted as text.
pub(super) fn escape(tree: &mut OutputTree) {
    let escape = |text: &str| html_escape::encode_text(text).into_owned();
    for id in tree.ids() {
        let node = tree.node_mut(id);
        node.start = escape(&node.start);
        node.end = escape(&node.end);
        node.content = escape(&node.content);
    }
}

/// Removes line breaks together with the indentation that follows them.
pub(super) fn single_line(tree: &mut OutputTree) {
    for id in tree.ids() {
        let node = tree.node_mut(id);
        node.start = LINE_BREAK.replace_all(&node.start, "").into_owned();
        node.end = LINE_BREAK.replace_all(&node.end, "").into_owned();
    }
}
