//! HTML parsing into the crate's DOM tree.
//!
//! Uses html5ever as the tokenizer/tree builder and materializes the
//! tree defined in `crate::dom::dom_tree`.

use crate::dom::dom_tree;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    interface::{ElemName, NodeOrText, QuirksMode, TreeSink},
    LocalName, Namespace, QualName,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Creates a DOM tree from the provided HTML content.
///
/// html5ever always produces a full document (html/head/body wrapper);
/// the serialization fixups extract the body content again at the end
/// of the pipeline.
pub fn create_dom_tree(html_content: &str) -> dom_tree::Document {
    let sink = NiceTreeSink::new();
    html5ever::parse_document(sink, Default::default()).one(html_content.to_string())
}

/// TreeSink that builds the `dom_tree` structure during parsing.
pub struct NiceTreeSink {
    document: dom_tree::Document,
    quirks_mode: RefCell<QuirksMode>,
}

impl NiceTreeSink {
    pub fn new() -> Self {
        Self {
            document: dom_tree::new_document(),
            quirks_mode: RefCell::new(QuirksMode::NoQuirks),
        }
    }
}

impl Default for NiceTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal `ElemName` implementation for our element handles.
#[derive(Debug)]
pub struct NiceElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for NiceElemName {
    fn local_name(&self) -> &LocalName {
        &self.local
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }
}

impl TreeSink for NiceTreeSink {
    type Handle = dom_tree::NodeHandle;
    type Output = dom_tree::Document;
    type ElemName<'a>
        = NiceElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.document
    }

    fn parse_error(&self, msg: std::borrow::Cow<'static, str>) {
        log::debug!("html parse error: {}", msg);
    }

    fn get_document(&self) -> Self::Handle {
        self.document.root.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        if let dom_tree::Node::Element(ref elem) = *target.borrow() {
            NiceElemName {
                ns: elem.qual_name.ns.clone(),
                local: elem.qual_name.local.clone(),
            }
        } else {
            panic!("elem_name called on non-element node")
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<html5ever::Attribute>,
        _flags: html5ever::interface::ElementFlags,
    ) -> Self::Handle {
        let mut element = dom_tree::ElementNode::new(&name.local.to_string());
        element.qual_name = name;
        for attr in attrs {
            element.set_attr(&attr.name.local.to_string(), &attr.value);
        }
        Rc::new(RefCell::new(dom_tree::Node::Element(element)))
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        // Comments carry no styling information; keep an empty text node
        // so the tree builder has something to hang on to.
        dom_tree::new_text("")
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Self::Handle {
        dom_tree::new_text(&format!("{} {}", target, data))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let child_handle = match child {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => dom_tree::new_text(&text),
        };
        dom_tree::append_child(parent, child_handle);
    }

    fn append_based_on_parent_node(
        &self,
        _element: &Self::Handle,
        _prev_element: &Self::Handle,
        _child: NodeOrText<Self::Handle>,
    ) {
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        *self.document.doctype.borrow_mut() = Some(dom_tree::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
    }

    fn mark_script_already_started(&self, _node: &Self::Handle) {}

    fn pop(&self, _node: &Self::Handle) {}

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        *self.quirks_mode.borrow_mut() = mode;
    }

    fn append_before_sibling(&self, _sibling: &Self::Handle, _child: NodeOrText<Self::Handle>) {}

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<html5ever::Attribute>) {
        if let dom_tree::Node::Element(ref mut elem) = *target.borrow_mut() {
            for attr in attrs {
                let key = attr.name.local.to_string();
                if elem.attr(&key).is_none() {
                    elem.set_attr(&key, &attr.value);
                }
            }
        }
    }

    fn remove_from_parent(&self, _target: &Self::Handle) {}

    fn reparent_children(&self, _node: &Self::Handle, _new_parent: &Self::Handle) {}
}
