//! Recursive-descent parser for markup abbreviations such as
//! `ul#nav>li.item$*3>a[href=#]{Link}`.
//!
//! Nodes are first collected in a flat arena so `^` can climb to a parent and
//! `(...)` groups can be built detached and attached (or spliced) on close.
//! The finished arena is folded into an owned [`AbbreviationNode`] tree.

use super::node::{AbbreviationNode, Attribute, Repeat, squash};
use crate::error::{ExpandError, ScannerError};
use crate::scanner::{Scanner, eat_pair, eat_quoted, is_number, is_quote, is_space, is_white_space};

const ROOT: usize = 0;

/// Default ceiling for element nesting, see [`parse_with_limits`].
pub const DEFAULT_MAX_DEPTH: usize = 100;

struct Slot {
    node: AbbreviationNode,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Nesting level the node was opened at; the root is 0.
    depth: usize,
}

#[derive(Default)]
struct Arena {
    slots: Vec<Slot>,
}

impl Arena {
    fn new() -> Self {
        let mut arena = Self::default();
        arena.detached(AbbreviationNode::default(), 0);
        arena
    }

    fn detached(&mut self, node: AbbreviationNode, depth: usize) -> usize {
        self.slots.push(Slot {
            node,
            parent: None,
            children: Vec::new(),
            depth,
        });
        self.slots.len() - 1
    }

    /// Level of a new node opened under `ctx`.
    fn child_depth(&self, ctx: usize, max_depth: usize) -> Result<usize, ExpandError> {
        let depth = self.slots[ctx].depth + 1;
        if depth > max_depth {
            return Err(ExpandError::DepthExceeded {
                depth,
                limit: max_depth,
            });
        }
        Ok(depth)
    }

    fn append(&mut self, parent: usize, child: usize) {
        self.slots[child].parent = Some(parent);
        self.slots[parent].children.push(child);
    }

    /// Moves every child of `from` to the end of `to`.
    fn adopt_children(&mut self, to: usize, from: usize) {
        let children = std::mem::take(&mut self.slots[from].children);
        for child in children {
            self.append(to, child);
        }
    }

    fn parent(&self, id: usize) -> Option<usize> {
        self.slots[id].parent
    }

    fn build(&mut self, id: usize) -> AbbreviationNode {
        let children = std::mem::take(&mut self.slots[id].children);
        let mut node = std::mem::take(&mut self.slots[id].node);
        node.children = children.into_iter().map(|child| self.build(child)).collect();
        node
    }
}

struct OpenGroup {
    node: usize,
    ctx: usize,
    pos: usize,
}

/// Parses a markup abbreviation into a tree rooted at a nameless container.
///
/// Repeat counts above `max_repeat` abort with [`ExpandError::LimitExceeded`].
/// The returned tree is already squashed.
pub fn parse(abbr: &str, max_repeat: usize) -> Result<AbbreviationNode, ExpandError> {
    parse_with_limits(abbr, max_repeat, DEFAULT_MAX_DEPTH)
}

/// Like [`parse`], and also refuses elements or groups nested deeper than
/// `max_depth` with [`ExpandError::DepthExceeded`].
pub fn parse_with_limits(
    abbr: &str,
    max_repeat: usize,
    max_depth: usize,
) -> Result<AbbreviationNode, ExpandError> {
    let mut stream = Scanner::new(abbr.trim());
    let mut arena = Arena::new();
    let mut groups: Vec<OpenGroup> = Vec::new();
    let mut ctx = ROOT;

    while !stream.eof() {
        if stream.eat('(') {
            let depth = arena.child_depth(ctx, max_depth)?;
            let group = arena.detached(AbbreviationNode::default(), depth);
            groups.push(OpenGroup {
                node: group,
                ctx,
                pos: stream.pos - 1,
            });
            ctx = group;
            continue;
        }

        if stream.eat(')') {
            let Some(open) = groups.pop() else {
                return Err(stream
                    .error_at("Unexpected \")\" group end", stream.pos - 1)
                    .into());
            };

            ctx = open.ctx;
            if let Some(repeat) = consume_repeat(&mut stream, max_repeat)? {
                arena.slots[open.node].node.repeat = Some(repeat);
                arena.append(ctx, open.node);
            } else {
                arena.adopt_children(ctx, open.node);
            }
            stream.eat('+');
            continue;
        }

        let node = consume_element(&mut stream, max_repeat)?;
        let depth = arena.child_depth(ctx, max_depth)?;
        let id = arena.detached(node, depth);
        arena.append(ctx, id);

        if stream.eat('+') {
            continue;
        }
        if stream.eat('>') {
            ctx = id;
            continue;
        }
        while stream.eat('^') {
            ctx = arena.parent(ctx).unwrap_or(ctx);
        }
    }

    if let Some(open) = groups.pop() {
        return Err(stream.error_at("Expected group close", open.pos).into());
    }

    let mut root = arena.build(ROOT);
    squash(&mut root);
    Ok(root)
}

fn consume_element(stream: &mut Scanner, max_repeat: usize) -> Result<AbbreviationNode, ExpandError> {
    let start = stream.pos;
    let mut node = AbbreviationNode::default();

    if let Some(name) = consume_name(stream) {
        if !is_valid_element_name(&name) {
            return Err(ExpandError::InvalidAbbreviation { name, pos: start });
        }
        node.name = Some(name);
    }

    while !stream.eof() {
        if stream.eat('.') {
            let class = consume_name(stream).unwrap_or_default();
            node.add_class(&class);
        } else if stream.eat('#') {
            let id = consume_name(stream).unwrap_or_default();
            node.set_attribute(Attribute::new("id", id));
        } else if stream.eat('/') {
            if node.is_group() {
                return Err(stream
                    .error_at("Unexpected self-closing indicator", stream.pos - 1)
                    .into());
            }
            node.self_closing = true;
            if let Some(repeat) = consume_repeat(stream, max_repeat)? {
                node.repeat = Some(repeat);
            }
            break;
        } else if let Some(attrs) = consume_attributes(stream)? {
            for attr in attrs {
                node.set_attribute(attr);
            }
        } else if let Some(text) = consume_text(stream)? {
            match node.text.as_mut() {
                Some(existing) => existing.push_str(&text),
                None => node.text = Some(text),
            }
        } else if let Some(repeat) = consume_repeat(stream, max_repeat)? {
            node.repeat = Some(repeat);
        } else {
            break;
        }
    }

    if stream.pos == start {
        let found = stream.peek().map(String::from).unwrap_or_default();
        return Err(stream
            .error(format!("Unable to consume abbreviation node, unexpected {found}"))
            .into());
    }

    Ok(node)
}

fn is_name(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | ':' | '$' | '@' | '!' | '%')
}

/// Element names are word characters plus `-$:@!`; `%` is accepted by the
/// tokenizer only so it can be reported.
fn is_valid_element_name(name: &str) -> bool {
    name.chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | ':' | '$' | '@' | '!'))
}

fn is_attribute_name(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | ':' | '$' | '@' | '!' | '.')
}

fn consume_name(stream: &mut Scanner) -> Option<String> {
    stream.start = stream.pos;
    stream.eat_while(is_name).then(|| stream.current())
}

/// `*N` or a bare `*` (line repeat).
fn consume_repeat(stream: &mut Scanner, max_repeat: usize) -> Result<Option<Repeat>, ExpandError> {
    if !stream.eat('*') {
        return Ok(None);
    }

    stream.start = stream.pos;
    if !stream.eat_while(is_number) {
        return Ok(Some(Repeat {
            count: 1,
            implicit: true,
        }));
    }

    let count = stream.current().parse::<usize>().unwrap_or(usize::MAX);
    if count > max_repeat {
        return Err(ExpandError::LimitExceeded {
            count,
            limit: max_repeat,
        });
    }

    Ok(Some(Repeat {
        count,
        implicit: false,
    }))
}

/// `{text}` with nested braces. `\{` and `\}` produce literal braces; other
/// escapes are kept for the numbering pass.
fn consume_text(stream: &mut Scanner) -> Result<Option<String>, ScannerError> {
    let start = stream.pos;
    if !stream.eat('{') {
        return Ok(None);
    }

    let mut depth = 1;
    let mut text = String::new();
    while let Some(ch) = stream.bump() {
        match ch {
            '\\' => match stream.peek() {
                Some(brace @ ('{' | '}')) => {
                    stream.bump();
                    text.push(brace);
                }
                _ => text.push(ch),
            },
            '{' => {
                depth += 1;
                text.push(ch);
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some(text));
                }
                text.push(ch);
            }
            _ => text.push(ch),
        }
    }

    Err(stream.error_at("Unable to find closing } for text start", start))
}

fn consume_attributes(stream: &mut Scanner) -> Result<Option<Vec<Attribute>>, ScannerError> {
    let start = stream.pos;
    if !stream.eat('[') {
        return Ok(None);
    }

    let mut attrs = Vec::new();
    loop {
        stream.eat_while(is_white_space);
        if stream.eat(']') {
            return Ok(Some(attrs));
        }
        if stream.eof() {
            break;
        }
        match consume_attribute(stream)? {
            Some(attr) => attrs.push(attr),
            None => return Err(stream.error("Expected attribute name")),
        }
    }

    Err(stream.error_at("Expected closing \"]\" brace", start))
}

fn consume_attribute(stream: &mut Scanner) -> Result<Option<Attribute>, ScannerError> {
    stream.start = stream.pos;
    if stream.eat_while(is_attribute_name) {
        let raw = stream.current();
        let mut attr = Attribute::default();
        let mut name = raw.as_str();
        if let Some(rest) = name.strip_prefix('!') {
            attr.implied = true;
            name = rest;
        }
        if let Some(rest) = name.strip_suffix('.') {
            attr.boolean = true;
            name = rest;
        }
        attr.name = Some(name.to_string());

        if stream.eat('=') {
            attr.value = Some(consume_literal(stream)?.unwrap_or_default());
        }
        return Ok(Some(attr));
    }

    Ok(consume_literal(stream)?.map(|value| Attribute {
        value: Some(value),
        ..Attribute::default()
    }))
}

/// Quoted string, `{expression}` or an unquoted run that may contain
/// balanced `[]` and `()`.
fn consume_literal(stream: &mut Scanner) -> Result<Option<String>, ScannerError> {
    if stream.peek().is_some_and(is_quote) {
        eat_quoted(stream, true)?;
        let raw = stream.current();
        let inner: String = raw.chars().skip(1).take(raw.chars().count().saturating_sub(2)).collect();
        return Ok(Some(unescape(&inner)));
    }

    if stream.peek() == Some('{') {
        eat_pair(stream, '{', '}', true)?;
        let raw = stream.substring(stream.start + 1, stream.pos - 1);
        return Ok(Some(raw));
    }

    let mut stack: Vec<char> = Vec::new();
    let mut value = String::new();
    while let Some(ch) = stream.peek() {
        match ch {
            '\\' => {
                stream.bump();
                if let Some(escaped) = stream.bump() {
                    value.push(escaped);
                }
                continue;
            }
            '[' | '(' => stack.push(ch),
            ']' | ')' => {
                let open = if ch == ']' { '[' } else { '(' };
                if stack.last() != Some(&open) {
                    break;
                }
                stack.pop();
            }
            _ if is_space(ch) || is_quote(ch) || ch == '=' => {
                if stack.is_empty() {
                    break;
                }
            }
            _ => {}
        }
        value.push(ch);
        stream.bump();
    }

    Ok((!value.is_empty()).then_some(value))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(abbr: &str) -> AbbreviationNode {
        parse(abbr, 1000).unwrap()
    }

    fn names(node: &AbbreviationNode) -> Vec<String> {
        node.children
            .iter()
            .map(|c| c.name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn siblings_and_children() {
        let root = p("a+b>c+d");
        assert_eq!(names(&root), vec!["a", "b"]);
        assert_eq!(names(&root.children[1]), vec!["c", "d"]);
    }

    #[test]
    fn climb_up() {
        let root = p("a>b>c^d^^e");
        assert_eq!(names(&root), vec!["a", "e"]);
        assert_eq!(names(&root.children[0]), vec!["b", "d"]);
        assert_eq!(names(&root.children[0].children[0]), vec!["c"]);
    }

    #[test]
    fn climb_never_leaves_the_root() {
        let root = p("a^^^b");
        assert_eq!(names(&root), vec!["a", "b"]);
    }

    #[test]
    fn id_classes_and_attributes() {
        let root = p("div#main.a.b[title=\"Hello world\" data-x=1 disabled.]");
        let div = &root.children[0];
        assert_eq!(div.attribute_value("id"), Some("main"));
        assert_eq!(div.attribute_value("class"), Some("a b"));
        assert_eq!(div.attribute_value("title"), Some("Hello world"));
        assert_eq!(div.attribute_value("data-x"), Some("1"));
        let disabled = div.attribute("disabled").unwrap();
        assert!(disabled.boolean);
        assert_eq!(disabled.value, None);
    }

    #[test]
    fn duplicate_id_overwrites() {
        let root = p("a#x#y");
        assert_eq!(root.children[0].attribute_value("id"), Some("y"));
        assert_eq!(root.children[0].attributes.len(), 1);
    }

    #[test]
    fn implied_and_default_attributes() {
        let root = p("a[!title 'foo.html' {b c}]");
        let attrs = &root.children[0].attributes;
        assert!(attrs[0].implied);
        assert_eq!(attrs[0].name.as_deref(), Some("title"));
        assert_eq!(attrs[1].name, None);
        assert_eq!(attrs[1].value.as_deref(), Some("foo.html"));
        assert_eq!(attrs[2].value.as_deref(), Some("b c"));
    }

    #[test]
    fn unquoted_values_keep_nested_brackets() {
        let root = p("a[href=x[1](2)]");
        assert_eq!(root.children[0].attribute_value("href"), Some("x[1](2)"));
    }

    #[test]
    fn expression_value() {
        let root = p("button[onclick={go(1)}]");
        assert_eq!(root.children[0].attribute_value("onclick"), Some("go(1)"));
    }

    #[test]
    fn text_with_nested_and_escaped_braces() {
        let root = p("p{a {b} \\} c}");
        assert_eq!(root.children[0].text.as_deref(), Some("a {b} } c"));
    }

    #[test]
    fn text_only_node() {
        let root = p("{hello}+a");
        assert_eq!(root.children[0].name, None);
        assert_eq!(root.children[0].text.as_deref(), Some("hello"));
    }

    #[test]
    fn repeat_counts() {
        let root = p("li*3+li*");
        assert_eq!(root.children[0].count(), 3);
        assert!(!root.children[0].is_line_repeat());
        assert!(root.children[1].is_line_repeat());
        assert_eq!(root.children[1].count(), 1);
    }

    #[test]
    fn self_closing_with_repeat() {
        let root = p("img/*2");
        assert!(root.children[0].self_closing);
        assert_eq!(root.children[0].count(), 2);
    }

    #[test]
    fn groups_without_repeat_are_spliced() {
        let root = p("(a>b)+c");
        assert_eq!(names(&root), vec!["a", "c"]);
        assert_eq!(names(&root.children[0]), vec!["b"]);
    }

    #[test]
    fn repeated_group_is_kept() {
        let root = p("ul>(li>a)*2");
        let ul = &root.children[0];
        assert_eq!(ul.children.len(), 1);
        let group = &ul.children[0];
        assert!(group.is_group());
        assert_eq!(group.count(), 2);
        assert_eq!(names(group), vec!["li"]);
    }

    #[test]
    fn nested_groups() {
        let root = p("((a)+(b))*2+c");
        assert_eq!(root.children.len(), 2);
        assert_eq!(names(&root.children[0]), vec!["a", "b"]);
        assert_eq!(root.children[1].name.as_deref(), Some("c"));
    }

    #[test]
    fn input_is_trimmed() {
        assert_eq!(names(&p("  a  ")), vec!["a"]);
    }

    #[test]
    fn invalid_name() {
        let err = parse("div%", 1000).unwrap_err();
        assert_eq!(
            err,
            ExpandError::InvalidAbbreviation {
                name: "div%".into(),
                pos: 0
            }
        );
    }

    #[test]
    fn syntax_errors() {
        let message = |abbr: &str| match parse(abbr, 1000).unwrap_err() {
            ExpandError::Syntax { message, .. } => message,
            other => panic!("unexpected error {other:?}"),
        };
        assert_eq!(message("(a"), "Expected group close");
        assert_eq!(message("a)"), "Unexpected \")\" group end");
        assert_eq!(message("a{b"), "Unable to find closing } for text start");
        assert_eq!(message("a[b"), "Expected closing \"]\" brace");
        assert_eq!(message("a[=]"), "Expected attribute name");
        assert_eq!(message("a[b='c]"), "Unable to consume quoted string");
        assert_eq!(message("/"), "Unexpected self-closing indicator");
        assert_eq!(message("a b"), "Unable to consume abbreviation node, unexpected  ");
    }

    #[test]
    fn error_positions() {
        let err = parse("a+(b", 1000).unwrap_err();
        assert_eq!(err.to_string(), "Expected group close at 3");
    }

    #[test]
    fn repeat_limit() {
        let err = parse("a*5000", 1000).unwrap_err();
        assert_eq!(
            err,
            ExpandError::LimitExceeded {
                count: 5000,
                limit: 1000
            }
        );
        let err = parse("a*99999999999999999999999", 1000).unwrap_err();
        assert!(matches!(err, ExpandError::LimitExceeded { .. }));
    }

    #[test]
    fn non_ascii_names_are_rejected() {
        assert_eq!(
            parse("p>é", 1000).unwrap_err(),
            ExpandError::InvalidAbbreviation {
                name: "é".into(),
                pos: 2
            }
        );
    }

    #[test]
    fn deep_nesting_is_refused() {
        let deep = "b>".repeat(10_000) + "b";
        assert_eq!(
            parse(&deep, 1000).unwrap_err(),
            ExpandError::DepthExceeded {
                depth: 101,
                limit: 100
            }
        );

        let groups = "(".repeat(10_000) + "b" + &")".repeat(10_000);
        assert!(matches!(
            parse(&groups, 1000),
            Err(ExpandError::DepthExceeded { limit: 100, .. })
        ));
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let abbr = "b>".repeat(4) + "b";
        assert!(parse_with_limits(&abbr, 1000, 5).is_ok());
        assert!(matches!(
            parse_with_limits(&(abbr + ">b"), 1000, 5),
            Err(ExpandError::DepthExceeded { depth: 6, limit: 5 })
        ));
    }
}
