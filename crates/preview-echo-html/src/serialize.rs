use std::fmt::Write;

use crate::{
    parser::is_void,
    tree::{NodeId, NodeKind, Tree},
};

/// Serialize the whole fragment (the root's children).
pub fn to_html(tree: &Tree) -> String {
    inner_html(tree, tree.root())
}

/// Serialize the children of `id`.
pub fn inner_html(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    for &child in tree.children(id) {
        write_node(tree, child, &mut out);
    }
    out
}

/// Serialize `id` itself, including its own tags.
pub fn outer_html(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out);
    out
}

fn write_node(tree: &Tree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        NodeKind::Document => {
            for &child in tree.children(id) {
                write_node(tree, child, out);
            }
        }
        NodeKind::Text(text) => out.push_str(&html_escape::encode_text(text)),
        NodeKind::Comment(text) => {
            let _ = write!(out, "<!--{text}-->");
        }
        NodeKind::Element { tag, attrs } => {
            out.push('<');
            out.push_str(tag);
            for attr in attrs {
                let _ = write!(
                    out,
                    " {}=\"{}\"",
                    attr.name,
                    html_escape::encode_double_quoted_attribute(&attr.value)
                );
            }
            out.push('>');
            if is_void(tag) {
                return;
            }
            for &child in tree.children(id) {
                write_node(tree, child, out);
            }
            let _ = write!(out, "</{tag}>");
        }
    }
}
