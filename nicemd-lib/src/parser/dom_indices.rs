use std::collections::HashMap;
use std::rc::Rc;

use crate::dom::dom_tree::{Document, Node, NodeHandle};

/// Lookup maps over a parsed document, used by the selector matcher to
/// find candidate elements without re-walking the tree per rule.
///
/// Style application only mutates `style` attributes, never topology,
/// so indices built once per conversion stay valid for the whole pass.
#[derive(Debug, Default)]
pub struct DomIndices {
    /// Maps an element's "id" attribute to the corresponding node.
    pub id_map: HashMap<String, NodeHandle>,
    /// Maps a class name to all nodes carrying that class.
    pub class_map: HashMap<String, Vec<NodeHandle>>,
    /// Maps a lowercase tag name to all nodes with that tag.
    pub tag_map: HashMap<String, Vec<NodeHandle>>,
}

impl DomIndices {
    /// Build the indices for the entire document.
    pub fn build(document: &Document) -> Self {
        let mut indices = DomIndices::default();
        Self::traverse(&document.root, &mut indices);
        indices
    }

    fn traverse(node: &NodeHandle, indices: &mut DomIndices) {
        match &*node.borrow() {
            Node::DocumentRoot(root) => {
                for child in &root.children {
                    Self::traverse(child, indices);
                }
            }
            Node::Element(elem) => {
                indices
                    .tag_map
                    .entry(elem.tag.to_lowercase())
                    .or_default()
                    .push(Rc::clone(node));

                if let Some(id_value) = elem.id() {
                    indices.id_map.insert(id_value.to_string(), Rc::clone(node));
                }
                if let Some(class_attr) = elem.attr("class") {
                    for class in class_attr.split_whitespace() {
                        indices
                            .class_map
                            .entry(class.to_string())
                            .or_default()
                            .push(Rc::clone(node));
                    }
                }
                for child in &elem.children {
                    Self::traverse(child, indices);
                }
            }
            Node::Text(_) => {}
        }
    }
}
