use html5ever::{namespace_url, ns, LocalName, QualName};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub mod dom_tree {
    use super::*;

    pub type NodeHandle = Rc<RefCell<Node>>;

    #[derive(Debug, Clone)]
    pub enum Node {
        DocumentRoot(DocumentRootNode),
        Element(ElementNode),
        Text(String),
    }

    #[derive(Debug, Clone, Default)]
    pub struct DocumentRootNode {
        pub children: Vec<NodeHandle>,
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        pub tag: String,
        pub qual_name: QualName,
        /// Attributes in document order. Names are unique; `set_attr`
        /// overwrites in place so serialization order stays stable.
        pub attributes: Vec<(String, String)>,
        pub children: Vec<NodeHandle>,
        pub parent: Option<Weak<RefCell<Node>>>,
    }

    #[derive(Debug)]
    pub struct Document {
        pub root: NodeHandle,
        pub doctype: RefCell<Option<Doctype>>,
    }

    #[derive(Debug)]
    pub struct Doctype {
        pub name: String,
        pub public_id: String,
        pub system_id: String,
    }

    impl ElementNode {
        pub fn new(tag: &str) -> Self {
            let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
            ElementNode {
                tag: tag.to_string(),
                qual_name,
                attributes: Vec::new(),
                children: Vec::new(),
                parent: None,
            }
        }

        /// Changes the element's tag, keeping attributes and children.
        pub fn rename(&mut self, tag: &str) {
            self.tag = tag.to_string();
            self.qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
        }

        pub fn attr(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }

        pub fn set_attr(&mut self, name: &str, value: &str) {
            if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| k == name) {
                slot.1 = value.to_string();
            } else {
                self.attributes.push((name.to_string(), value.to_string()));
            }
        }

        pub fn id(&self) -> Option<&str> {
            self.attr("id")
        }

        pub fn has_class(&self, class: &str) -> bool {
            self.attr("class")
                .map(|v| v.split_whitespace().any(|c| c == class))
                .unwrap_or(false)
        }

        pub fn add_class(&mut self, class: &str) {
            if self.has_class(class) {
                return;
            }
            match self.attr("class") {
                Some(existing) if !existing.trim().is_empty() => {
                    let merged = format!("{} {}", existing.trim(), class);
                    self.set_attr("class", &merged);
                }
                _ => self.set_attr("class", class),
            }
        }
    }

    impl Document {
        /// Depth-first search for the first element the predicate accepts.
        pub fn find_element<F>(&self, pred: F) -> Option<NodeHandle>
        where
            F: Fn(&ElementNode) -> bool,
        {
            fn walk<F: Fn(&ElementNode) -> bool>(
                node: &NodeHandle,
                pred: &F,
            ) -> Option<NodeHandle> {
                let children = match &*node.borrow() {
                    Node::DocumentRoot(root) => root.children.clone(),
                    Node::Element(elem) => {
                        if pred(elem) {
                            return Some(Rc::clone(node));
                        }
                        elem.children.clone()
                    }
                    Node::Text(_) => return None,
                };
                children.iter().find_map(|child| walk(child, pred))
            }
            walk(&self.root, &pred)
        }
    }

    pub fn new_document() -> Document {
        Document {
            root: Rc::new(RefCell::new(Node::DocumentRoot(DocumentRootNode::default()))),
            doctype: RefCell::new(None),
        }
    }

    pub fn new_element(tag: &str) -> NodeHandle {
        Rc::new(RefCell::new(Node::Element(ElementNode::new(tag))))
    }

    pub fn new_text(text: &str) -> NodeHandle {
        Rc::new(RefCell::new(Node::Text(text.to_string())))
    }

    /// Appends `child` to `parent` and fixes up the child's parent pointer.
    pub fn append_child(parent: &NodeHandle, child: NodeHandle) {
        if let Node::Element(ref mut child_elem) = *child.borrow_mut() {
            child_elem.parent = Some(Rc::downgrade(parent));
        }
        match &mut *parent.borrow_mut() {
            Node::DocumentRoot(root) => root.children.push(child),
            Node::Element(elem) => elem.children.push(child),
            Node::Text(_) => {}
        }
    }

    /// Replaces `parent`'s children wholesale, fixing up parent
    /// pointers of the new element children.
    pub fn replace_children(parent: &NodeHandle, children: Vec<NodeHandle>) {
        for child in &children {
            if let Node::Element(ref mut child_elem) = *child.borrow_mut() {
                child_elem.parent = Some(Rc::downgrade(parent));
            }
        }
        match &mut *parent.borrow_mut() {
            Node::DocumentRoot(root) => root.children = children,
            Node::Element(elem) => elem.children = children,
            Node::Text(_) => {}
        }
    }

    /// True when `node` is `ancestor` or sits anywhere below it.
    pub fn is_self_or_descendant(node: &NodeHandle, ancestor: &NodeHandle) -> bool {
        if Rc::ptr_eq(node, ancestor) {
            return true;
        }
        let mut current = match &*node.borrow() {
            Node::Element(elem) => elem.parent.clone(),
            _ => None,
        };
        while let Some(weak) = current {
            let Some(parent_rc) = weak.upgrade() else {
                break;
            };
            if Rc::ptr_eq(&parent_rc, ancestor) {
                return true;
            }
            current = match &*parent_rc.borrow() {
                Node::Element(elem) => elem.parent.clone(),
                _ => None,
            };
        }
        false
    }
}
