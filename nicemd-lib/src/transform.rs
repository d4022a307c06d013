//! Structural normalization of rendered Markdown HTML into the
//! rich-content editor shape: container promotion, heading
//! decomposition, code-block decoration and list-item wrapping.
//!
//! This stage only rearranges the tree; cascade resolution happens
//! afterwards in `style::inline`.

use crate::dom::dom_tree::{self, Document, ElementNode, Node, NodeHandle};
use crate::style::css_matcher::ANCHOR_ID;
use crate::style::nice_css::DeclarationMap;
use std::rc::Rc;

pub const DATA_TOOL: &str = "data-tool";
pub const DATA_TOOL_VALUE: &str = "mdnice编辑器";
const DATA_WEBSITE: &str = "data-website";
const DATA_WEBSITE_VALUE: &str = "https://www.mdnice.com";

/// Editor defaults that are not part of any theme stylesheet.
const DEFAULT_PRE_STYLE: &str =
    "border-radius: 5px; box-shadow: rgba(0, 0, 0, 0.55) 0px 2px 10px; text-align: left;";
const DEFAULT_CODE_STYLE: &str = "overflow-x: auto; padding: 16px; color: #abb2bf; \
     padding-top: 15px; background: #282c34; border-radius: 5px; display: -webkit-box; \
     font-family: Consolas, Monaco, Menlo, monospace; font-size: 12px;";
const DECORATOR_STYLE: &str = "display: block; \
     background: url(https://files.mdnice.com/user/3441/876cad08-0422-409d-bb5a-08afec5da8ee.svg); \
     height: 30px; width: 100%; background-size: 40px; background-repeat: no-repeat; \
     background-color: #282c34; margin-bottom: -7px; border-radius: 5px; \
     background-position: 10px 10px;";

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];
const DATA_TOOL_TAGS: [&str; 5] = ["p", "ul", "ol", "blockquote", "hr"];

/// Normalizes the parsed render output in place.
pub fn to_nice_format(document: &Document) {
    promote_container(document);
    decorate_headings(document);
    decorate_code_blocks(document);
    wrap_list_items(document);
    prune_empty_nodes(document);
    stamp_data_tool(document);
}

/// `<div id="nice">` becomes the semantic `<section>` wrapper carrying
/// the editor attributes.
fn promote_container(document: &Document) {
    let Some(container) = document.find_element(|e| e.id() == Some(ANCHOR_ID)) else {
        log::debug!("no #{} container in rendered output", ANCHOR_ID);
        return;
    };
    if let Node::Element(ref mut elem) = *container.borrow_mut() {
        if elem.tag == "div" {
            elem.rename("section");
        }
        elem.set_attr(DATA_TOOL, DATA_TOOL_VALUE);
        elem.set_attr(DATA_WEBSITE, DATA_WEBSITE_VALUE);
    };
}

/// Headings are decomposed into the fixed three-span pattern. The
/// prefix and suffix spans are zero-width theme hooks; the original
/// heading markup moves inside the content span.
fn decorate_headings(document: &Document) {
    for tag in HEADING_TAGS {
        for heading in collect_elements(document, |e| e.tag == tag) {
            if subtree_has(&heading, &|e: &ElementNode| {
                e.tag == "span" && e.has_class("content")
            }) {
                continue;
            }
            let old_children = element_children(&heading);

            let prefix = make_span("prefix", Some("display: none;"));
            let content = make_span("content", None);
            let suffix = make_span("suffix", Some("display: none;"));
            dom_tree::replace_children(&content, old_children);
            dom_tree::replace_children(&heading, vec![prefix, content, suffix]);

            if let Node::Element(ref mut elem) = *heading.borrow_mut() {
                if elem.attr(DATA_TOOL).is_none() {
                    elem.set_attr(DATA_TOOL, DATA_TOOL_VALUE);
                }
            }
        }
    }
}

/// Code blocks get the `pre.custom` decoration structure: default
/// inline styles, a top decorator bar, `code.hljs`, and code text
/// rewritten so newlines become `<br>` and spaces become `&nbsp;`.
fn decorate_code_blocks(document: &Document) {
    for pre in collect_elements(document, |e| e.tag == "pre" && !e.has_class("custom")) {
        let Some(code) = find_descendant(&pre, &|e: &ElementNode| e.tag == "code") else {
            continue;
        };

        if let Node::Element(ref mut elem) = *pre.borrow_mut() {
            elem.add_class("custom");
            elem.set_attr(DATA_TOOL, DATA_TOOL_VALUE);
            let style = match elem.attr("style") {
                Some(existing) if !existing.is_empty() => {
                    format!("{}; {}", existing, DEFAULT_PRE_STYLE)
                }
                _ => DEFAULT_PRE_STYLE.to_string(),
            };
            elem.set_attr("style", &style);
        }

        if let Node::Element(ref mut elem) = *code.borrow_mut() {
            elem.set_attr("class", "hljs");
            let cleaned = elem
                .attr("style")
                .map(clean_code_style)
                .unwrap_or_default();
            let style = if cleaned.is_empty() {
                DEFAULT_CODE_STYLE.to_string()
            } else {
                format!("{}; {}", cleaned, DEFAULT_CODE_STYLE)
            };
            elem.set_attr("style", &style);
        }

        rewrite_code_text(&code);

        let decorator = make_span_with_style(DECORATOR_STYLE);
        if let Node::Element(ref mut deco) = *decorator.borrow_mut() {
            deco.parent = Some(Rc::downgrade(&pre));
        }
        if let Node::Element(ref mut elem) = *pre.borrow_mut() {
            elem.children.insert(0, decorator);
        }
    }
}

/// Drops color/background declarations whose value starts with a
/// digit; a following theme rule would otherwise merge garbage like
/// `color: 14px` into the block.
fn clean_code_style(style: &str) -> String {
    let parsed = DeclarationMap::parse(style);
    let mut cleaned = DeclarationMap::default();
    for (key, value) in parsed.iter() {
        let suspicious = matches!(key, "color" | "background" | "background-color")
            && value.chars().next().is_some_and(|c| c.is_ascii_digit());
        if !suspicious {
            cleaned.set(key, value);
        }
    }
    cleaned.to_style_string()
}

/// Rewrites every text node under `node`: real newlines become `<br>`
/// elements and spaces become non-breaking spaces. Working per text
/// node keeps highlight spans intact.
fn rewrite_code_text(node: &NodeHandle) {
    let old_children = element_children(node);
    let mut new_children = Vec::new();
    for child in old_children {
        let text = match &*child.borrow() {
            Node::Text(t) => Some(t.clone()),
            _ => None,
        };
        match text {
            Some(text) => {
                for (i, line) in text.split('\n').enumerate() {
                    if i > 0 {
                        new_children.push(dom_tree::new_element("br"));
                    }
                    if !line.is_empty() {
                        new_children.push(dom_tree::new_text(&line.replace(' ', "\u{A0}")));
                    }
                }
            }
            None => {
                rewrite_code_text(&child);
                new_children.push(child);
            }
        }
    }
    dom_tree::replace_children(node, new_children);
}

/// Non-empty list items get their content wrapped in a `<section>`.
fn wrap_list_items(document: &Document) {
    for li in collect_elements(document, |e| e.tag == "li") {
        if subtree_has(&li, &|e: &ElementNode| e.tag == "section") {
            continue;
        }
        let children = element_children(&li);
        let has_content = children.iter().any(|child| match &*child.borrow() {
            Node::Element(_) => true,
            Node::Text(t) => !t.trim().is_empty(),
            Node::DocumentRoot(_) => false,
        });
        if !has_content {
            continue;
        }
        let section = dom_tree::new_element("section");
        dom_tree::replace_children(&section, children);
        dom_tree::replace_children(&li, vec![section]);
    }
}

/// Removes empty sections, then empty list items, so the downstream
/// editor never renders blank entries.
fn prune_empty_nodes(document: &Document) {
    for tag in ["section", "li"] {
        let empties: Vec<NodeHandle> = collect_elements(document, |e| e.tag == tag)
            .into_iter()
            .filter(|handle| {
                // The anchor container itself is exempt even when the
                // input document was empty.
                let is_anchor = match &*handle.borrow() {
                    Node::Element(elem) => elem.id() == Some(ANCHOR_ID),
                    _ => false,
                };
                !is_anchor && is_empty_subtree(handle)
            })
            .collect();
        if !empties.is_empty() {
            remove_nodes(&document.root, &empties);
        }
    }
}

fn stamp_data_tool(document: &Document) {
    for tag in DATA_TOOL_TAGS {
        for handle in collect_elements(document, |e| e.tag == tag) {
            if let Node::Element(ref mut elem) = *handle.borrow_mut() {
                if elem.attr(DATA_TOOL).is_none() {
                    elem.set_attr(DATA_TOOL, DATA_TOOL_VALUE);
                }
            }
        }
    }
}

fn make_span(class: &str, style: Option<&str>) -> NodeHandle {
    let span = dom_tree::new_element("span");
    if let Node::Element(ref mut elem) = *span.borrow_mut() {
        elem.set_attr("class", class);
        if let Some(style) = style {
            elem.set_attr("style", style);
        }
    }
    span
}

fn make_span_with_style(style: &str) -> NodeHandle {
    let span = dom_tree::new_element("span");
    if let Node::Element(ref mut elem) = *span.borrow_mut() {
        elem.set_attr("style", style);
    }
    span
}

fn element_children(node: &NodeHandle) -> Vec<NodeHandle> {
    match &*node.borrow() {
        Node::Element(elem) => elem.children.clone(),
        Node::DocumentRoot(root) => root.children.clone(),
        Node::Text(_) => Vec::new(),
    }
}

fn collect_elements<F: Fn(&ElementNode) -> bool>(document: &Document, pred: F) -> Vec<NodeHandle> {
    fn walk<F: Fn(&ElementNode) -> bool>(node: &NodeHandle, pred: &F, found: &mut Vec<NodeHandle>) {
        let children = match &*node.borrow() {
            Node::DocumentRoot(root) => root.children.clone(),
            Node::Element(elem) => {
                if pred(elem) {
                    found.push(Rc::clone(node));
                }
                elem.children.clone()
            }
            Node::Text(_) => return,
        };
        for child in &children {
            walk(child, pred, found);
        }
    }
    let mut found = Vec::new();
    walk(&document.root, &pred, &mut found);
    found
}

fn find_descendant<F: Fn(&ElementNode) -> bool>(node: &NodeHandle, pred: &F) -> Option<NodeHandle> {
    for child in element_children(node) {
        let matched = match &*child.borrow() {
            Node::Element(elem) => pred(elem),
            _ => false,
        };
        if matched {
            return Some(child);
        }
        if let Some(found) = find_descendant(&child, pred) {
            return Some(found);
        }
    }
    None
}

fn subtree_has<F: Fn(&ElementNode) -> bool>(node: &NodeHandle, pred: &F) -> bool {
    find_descendant(node, pred).is_some()
}

fn is_empty_subtree(node: &NodeHandle) -> bool {
    element_children(node).iter().all(|child| match &*child.borrow() {
        Node::Text(t) => t.trim().is_empty(),
        _ => false,
    })
}

fn remove_nodes(node: &NodeHandle, targets: &[NodeHandle]) {
    let children = element_children(node);
    for child in &children {
        remove_nodes(child, targets);
    }
    let retain = |c: &NodeHandle| !targets.iter().any(|t| Rc::ptr_eq(t, c));
    match &mut *node.borrow_mut() {
        Node::DocumentRoot(root) => root.children.retain(retain),
        Node::Element(elem) => elem.children.retain(retain),
        Node::Text(_) => {}
    }
}
