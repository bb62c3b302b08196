//! Tree builder: tokens in, [`Tree`] out.
//!
//! This is a forgiving builder for already-sanitized fragments, not a full
//! HTML5 tree construction algorithm. It knows about void elements, closes an
//! open `<p>` or `<li>` when the next one starts, ignores end tags that match
//! nothing, and decodes entities in text and attribute values.

use crate::{
    error::HtmlError,
    lexer::{TokenKind, tokenize},
    tree::{Attribute, NodeId, Tree},
};

/// Maximum element nesting accepted before giving up.
pub const MAX_DEPTH: usize = 256;

/// Elements that never have children or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Start tags that implicitly close an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "p",
    "div",
    "ul",
    "ol",
    "li",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "pre",
    "blockquote",
    "table",
    "hr",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parse an HTML fragment into a [`Tree`].
pub fn parse(html: &str) -> Result<Tree, HtmlError> {
    let mut builder = TreeBuilder::new();
    for token in tokenize(html)? {
        match token.kind {
            TokenKind::Text => builder.text(token.text),
            TokenKind::Comment => builder.comment(token.text),
            TokenKind::Declaration => {}
            TokenKind::StartTag => builder.start_tag(token.text)?,
            TokenKind::EndTag => builder.end_tag(token.text),
        }
    }
    Ok(builder.finish())
}

struct TreeBuilder {
    tree: Tree,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        let tree = Tree::new();
        let root = tree.root();
        Self {
            tree,
            open: vec![root],
        }
    }

    fn current(&self) -> NodeId {
        // open always holds at least the root
        self.open[self.open.len() - 1]
    }

    fn text(&mut self, raw: &str) {
        let decoded = html_escape::decode_html_entities(raw);
        let current = self.current();
        self.tree.append_text(current, &decoded);
    }

    fn comment(&mut self, raw: &str) {
        let inner = raw
            .strip_prefix("<!--")
            .and_then(|s| s.strip_suffix("-->"))
            .unwrap_or(raw);
        let id = self.tree.create_comment(inner);
        let current = self.current();
        self.tree.append_child(current, id);
    }

    fn start_tag(&mut self, raw: &str) -> Result<(), HtmlError> {
        let (name, attrs, self_closing) = parse_start_tag(raw);
        self.close_implied(&name);

        let id = self.tree.create_element(name.as_str(), attrs);
        let current = self.current();
        self.tree.append_child(current, id);

        if !self_closing && !is_void(&name) {
            // root does not count towards the depth
            if self.open.len() > MAX_DEPTH {
                return Err(HtmlError::TooDeep { limit: MAX_DEPTH });
            }
            self.open.push(id);
        }
        Ok(())
    }

    fn end_tag(&mut self, raw: &str) {
        let name = tag_name(raw.trim_start_matches("</"));
        // Skip the root at index 0; unmatched end tags are dropped.
        let matched = self
            .open
            .iter()
            .skip(1)
            .rposition(|&id| self.tree.tag(id) == Some(name.as_str()));
        if let Some(pos) = matched {
            self.open.truncate(pos + 1);
        }
    }

    fn close_implied(&mut self, incoming: &str) {
        if CLOSES_PARAGRAPH.contains(&incoming) && self.tree.tag(self.current()) == Some("p") {
            self.open.pop();
        }
        if incoming == "li" {
            // close the nearest open <li> unless a nested list sits above it
            let mut close_at = None;
            for (depth, &id) in self.open.iter().enumerate().rev() {
                match self.tree.tag(id) {
                    Some("li") => {
                        close_at = Some(depth);
                        break;
                    }
                    Some("ul") | Some("ol") | None => break,
                    _ => {}
                }
            }
            if let Some(depth) = close_at {
                self.open.truncate(depth);
            }
        }
    }

    fn finish(self) -> Tree {
        self.tree
    }
}

/// Lower-cased tag name at the start of `s`.
fn tag_name(s: &str) -> String {
    s.chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Split `<name a="1" b>` into name, attributes and the self-closing flag.
fn parse_start_tag(raw: &str) -> (String, Vec<Attribute>, bool) {
    let inner = raw.trim_start_matches('<').trim_end_matches('>');
    let self_closing = inner.trim_end().ends_with('/');
    let inner = inner.trim_end().trim_end_matches('/');

    let name = tag_name(inner);
    let attrs_str = &inner[name.len()..];
    (name, parse_attributes(attrs_str), self_closing)
}

/// Parse attributes from a string, respecting quoted values.
///
/// Handles `key="v"`, `key='v'`, `key=v` and bare `key`. Names are
/// lower-cased, values entity-decoded, and only the first occurrence of a
/// name is kept.
fn parse_attributes(attrs_str: &str) -> Vec<Attribute> {
    let mut result: Vec<Attribute> = Vec::new();
    let mut chars = attrs_str.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace() || *c == '/') {
            chars.next();
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c.is_whitespace() || c == '/' {
                break;
            }
            key.push(c);
            chars.next();
        }
        if key.is_empty() {
            break;
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        if chars.peek() == Some(&'=') {
            chars.next();
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            match chars.peek().copied() {
                Some(q @ ('"' | '\'')) => {
                    chars.next();
                    for c in chars.by_ref() {
                        if c == q {
                            break;
                        }
                        value.push(c);
                    }
                }
                _ => {
                    while let Some(&c) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        value.push(c);
                        chars.next();
                    }
                }
            }
        }

        let key = key.to_ascii_lowercase();
        if !result.iter().any(|a| a.name == key) {
            let value = html_escape::decode_html_entities(&value).into_owned();
            result.push(Attribute::new(key, value));
        }
    }

    result
}
