//! DOM tree to HTML string serialization.

use crate::dom::dom_tree::{Document, Node, NodeHandle};

/// Void elements are emitted without a closing tag, in the
/// non-self-closing notation the rich-content target expects.
const VOID_ELEMENTS: &[&str] = &[
    "meta", "img", "br", "hr", "input", "link", "area", "base", "col", "embed", "param", "source",
    "track", "wbr",
];

/// Serializes the whole document, doctype included when present.
pub fn serialize_document(document: &Document) -> String {
    let mut out = String::new();
    if let Some(doctype) = &*document.doctype.borrow() {
        out.push_str(&format!("<!DOCTYPE {}>", doctype.name));
    }
    serialize_node(&document.root, &mut out);
    out
}

fn serialize_node(node: &NodeHandle, out: &mut String) {
    match &*node.borrow() {
        Node::DocumentRoot(root) => {
            for child in &root.children {
                serialize_node(child, out);
            }
        }
        Node::Element(elem) => {
            out.push('<');
            out.push_str(&elem.tag);
            for (key, value) in &elem.attributes {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                return;
            }
            for child in &elem.children {
                serialize_node(child, out);
            }
            out.push_str("</");
            out.push_str(&elem.tag);
            out.push('>');
        }
        Node::Text(text) => out.push_str(&escape_text(text)),
    }
}

/// Escapes element text content. Non-breaking spaces are written as
/// `&nbsp;` entities so the downstream editor keeps code indentation.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\u{A0}' => escaped.push_str("&nbsp;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\u{A0}' => escaped.push_str("&nbsp;"),
            other => escaped.push(other),
        }
    }
    escaped
}
