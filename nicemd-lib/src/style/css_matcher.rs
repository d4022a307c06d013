//! Selector specificity and element matching.
//!
//! This is an approximation of CSS selector semantics, not a full
//! engine: only tag/class/id simple selectors are understood, and for
//! combinator selectors only the last component is verified against
//! the tree. The one structural exception is the scope-root prefix
//! (`#nice ...`), which restricts matching to the content subtree.

use crate::dom::dom_tree::{self, ElementNode, NodeHandle};
use crate::parser::dom_indices::DomIndices;
use std::rc::Rc;

/// The fixed anchor id of the content wrapper. Rule-driven styling is
/// confined to this element and its subtree.
pub const ANCHOR_ID: &str = "nice";

/// The anchor's own selector; a rule with exactly this selector
/// targets the anchor element itself.
pub const ANCHOR_SELECTOR: &str = "#nice";

/// A simple selector component: optional tag plus required class and
/// id tokens. Attribute selectors and sibling combinators are out of
/// scope for this engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub classes: Vec<String>,
    pub ids: Vec<String>,
}

impl CompoundSelector {
    /// A compound with no tag, class or id never matches anything;
    /// this guards against accidental universal matches.
    pub fn is_empty(&self) -> bool {
        self.tag.is_none() && self.classes.is_empty() && self.ids.is_empty()
    }
}

/// Parses a compound selector string such as `pre.custom#main`.
pub fn parse_compound_selector(selector: &str) -> CompoundSelector {
    let mut compound = CompoundSelector::default();
    let mut chars = selector.chars().peekable();
    let mut buffer = String::new();

    if let Some(&ch) = chars.peek() {
        if ch.is_ascii_alphanumeric() || ch == '*' {
            while let Some(&ch) = chars.peek() {
                if ch == '#' || ch == '.' {
                    break;
                }
                buffer.push(ch);
                chars.next();
            }
            if !buffer.is_empty() && buffer != "*" {
                compound.tag = Some(buffer.clone());
            }
            buffer.clear();
        }
    }

    while let Some(ch) = chars.next() {
        match ch {
            '#' | '.' => {
                while let Some(&next) = chars.peek() {
                    if next == '#' || next == '.' {
                        break;
                    }
                    buffer.push(next);
                    chars.next();
                }
                if !buffer.is_empty() {
                    if ch == '#' {
                        compound.ids.push(buffer.clone());
                    } else {
                        compound.classes.push(buffer.clone());
                    }
                }
                buffer.clear();
            }
            _ => {}
        }
    }
    compound
}

/// Coarse selector priority, ascending.
///
/// `#` counts 100, `.` counts 10, a leading tag token counts 1, and a
/// descendant/child combinator adds 5. Scoring combinators is a known
/// deviation from real CSS specificity; rules are applied low-to-high
/// with source order as tie-break, so later declarations override
/// earlier ones on the same property.
pub fn selector_priority(selector: &str) -> i32 {
    let mut priority = 0;
    priority += selector.matches('#').count() as i32 * 100;
    priority += selector.matches('.').count() as i32 * 10;
    if selector
        .chars()
        .next()
        .map(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .unwrap_or(false)
    {
        priority += 1;
    }
    if selector.contains(' ') || selector.contains('>') {
        priority += 5;
    }
    priority
}

/// Attribute selectors are unsupported, so any colon in a selector can
/// only introduce a pseudo-class or pseudo-element. Those rules are
/// skipped outright: inline styles cannot express interaction or
/// generated-content semantics.
pub fn has_pseudo(selector: &str) -> bool {
    selector.contains(':')
}

/// True when the element satisfies every component of the compound.
pub fn matches_compound(elem: &ElementNode, compound: &CompoundSelector) -> bool {
    if compound.is_empty() {
        return false;
    }
    if let Some(ref tag) = compound.tag {
        if !elem.tag.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    for id in &compound.ids {
        if elem.id() != Some(id.as_str()) {
            return false;
        }
    }
    for class in &compound.classes {
        if !elem.has_class(class) {
            return false;
        }
    }
    true
}

/// Splits on descendant/child combinators and returns the last simple
/// selector component, the only one matched structurally.
fn last_component(selector: &str) -> Option<&str> {
    selector
        .split(|c: char| c.is_whitespace() || c == '>')
        .filter(|part| !part.is_empty())
        .last()
}

/// Finds the elements a selector applies to, scoped to the anchor.
///
/// Three shapes are distinguished:
/// - exactly `#nice`: targets the anchor element itself;
/// - `#nice <rest>`: the last component of `<rest>`, matched among the
///   anchor's descendants;
/// - anything else: the last component matched anywhere, then filtered
///   to the anchor or its subtree.
pub fn match_selector(
    selector: &str,
    indices: &DomIndices,
    anchor: &NodeHandle,
) -> Vec<NodeHandle> {
    if selector == ANCHOR_SELECTOR {
        return vec![Rc::clone(anchor)];
    }

    let parts: Vec<&str> = selector
        .split(|c: char| c.is_whitespace() || c == '>')
        .filter(|part| !part.is_empty())
        .collect();
    let scoped_to_anchor = parts.len() > 1 && parts[0] == ANCHOR_SELECTOR;

    let component = if scoped_to_anchor {
        parts.last().copied()
    } else {
        last_component(selector)
    };
    let Some(component) = component else {
        return Vec::new();
    };
    let compound = parse_compound_selector(component);
    if compound.is_empty() {
        log::debug!("selector {:?} has no usable component, skipped", selector);
        return Vec::new();
    }

    candidates(&compound, indices)
        .into_iter()
        .filter(|handle| {
            let matched = match &*handle.borrow() {
                dom_tree::Node::Element(elem) => matches_compound(elem, &compound),
                _ => false,
            };
            if !matched {
                return false;
            }
            if scoped_to_anchor {
                // Descendants only; the anchor itself is reachable just
                // through its own selector.
                !Rc::ptr_eq(handle, anchor) && dom_tree::is_self_or_descendant(handle, anchor)
            } else {
                dom_tree::is_self_or_descendant(handle, anchor)
            }
        })
        .collect()
}

/// Pulls candidate handles from the narrowest available index.
fn candidates(compound: &CompoundSelector, indices: &DomIndices) -> Vec<NodeHandle> {
    if let Some(id) = compound.ids.first() {
        return indices.id_map.get(id).map(Rc::clone).into_iter().collect();
    }
    if let Some(class) = compound.classes.first() {
        return indices.class_map.get(class).cloned().unwrap_or_default();
    }
    if let Some(ref tag) = compound.tag {
        return indices.tag_map.get(&tag.to_lowercase()).cloned().unwrap_or_default();
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::dom_tree::Node;
    use crate::parser::nice_html::create_dom_tree;

    #[test]
    fn priority_ranks_id_over_class_over_tag() {
        assert_eq!(selector_priority("#nice"), 100);
        assert_eq!(selector_priority(".content"), 10);
        assert_eq!(selector_priority("p"), 1);
        assert!(selector_priority("#nice h1") > selector_priority("h1"));
        // Combinator bonus: documented deviation from CSS specificity.
        assert_eq!(selector_priority("h1 .content"), 1 + 10 + 5);
    }

    #[test]
    fn compound_parsing_extracts_tag_classes_ids() {
        let compound = parse_compound_selector("pre.custom.wide#main");
        assert_eq!(compound.tag.as_deref(), Some("pre"));
        assert_eq!(compound.classes, vec!["custom", "wide"]);
        assert_eq!(compound.ids, vec!["main"]);
    }

    #[test]
    fn empty_compound_never_matches() {
        let elem = ElementNode::new("div");
        assert!(!matches_compound(&elem, &CompoundSelector::default()));
    }

    #[test]
    fn pseudo_selectors_are_flagged() {
        assert!(has_pseudo("a:hover"));
        assert!(has_pseudo("p::before"));
        assert!(!has_pseudo("#nice pre.custom"));
    }

    fn setup() -> (crate::dom::dom_tree::Document, DomIndices) {
        let doc = create_dom_tree(concat!(
            r#"<p class="out">outside</p>"#,
            r#"<section id="nice"><h2><span class="content">t</span></h2>"#,
            r#"<p class="out">inside</p></section>"#,
        ));
        let indices = DomIndices::build(&doc);
        (doc, indices)
    }

    #[test]
    fn anchor_selector_targets_anchor_itself() {
        let (_doc, indices) = setup();
        let anchor = indices.id_map.get("nice").cloned().unwrap();
        let matched = match_selector("#nice", &indices, &anchor);
        assert_eq!(matched.len(), 1);
        assert!(Rc::ptr_eq(&matched[0], &anchor));
    }

    #[test]
    fn matching_is_confined_to_anchor_subtree() {
        let (_doc, indices) = setup();
        let anchor = indices.id_map.get("nice").cloned().unwrap();
        // Two p.out elements exist; only the one inside #nice matches.
        let matched = match_selector("p.out", &indices, &anchor);
        assert_eq!(matched.len(), 1);
        assert!(dom_tree::is_self_or_descendant(&matched[0], &anchor));
    }

    #[test]
    fn scope_root_prefix_matches_last_component_in_subtree() {
        let (_doc, indices) = setup();
        let anchor = indices.id_map.get("nice").cloned().unwrap();
        let matched = match_selector("#nice h2 .content", &indices, &anchor);
        assert_eq!(matched.len(), 1);
        if let Node::Element(elem) = &*matched[0].borrow() {
            assert!(elem.has_class("content"));
        } else {
            panic!("expected element");
        };
    }
}
