//! Cascade resolution driver: bakes a stylesheet into per-element
//! inline `style` attributes.

use crate::dom::dom_tree::{Document, Node, NodeHandle};
use crate::parser::dom_indices::DomIndices;
use crate::parser::serialize::serialize_document;
use crate::style::css_matcher::{self, ANCHOR_ID};
use crate::style::fixups;
use crate::style::nice_css::{self, DeclarationMap};

/// Class names of the zero-width helper spans around headings. These
/// must end up hidden no matter what the cascade computed for them.
const DECORATIVE_MARKER_CLASSES: [&str; 2] = ["prefix", "suffix"];
const HIDE_DECLARATION: &str = "display: none;";

/// Computes, for every element in the content subtree, the final
/// inline style the cascade would produce, and returns the serialized
/// HTML after the post-serialization fixups.
///
/// Best-effort by design: malformed selectors and unmatched rules are
/// skipped, never surfaced. Deterministic for a given (tree, css)
/// pair.
pub fn apply_inline_styles(document: &Document, css_text: &str) -> String {
    let mut rules = nice_css::parse_rules(css_text);
    // Ascending priority with source order as tie-break; applying
    // low-to-high and letting later declarations override reproduces
    // "last applicable rule wins".
    rules.sort_by(|a, b| {
        let pa = css_matcher::selector_priority(&a.selector);
        let pb = css_matcher::selector_priority(&b.selector);
        pa.cmp(&pb).then(a.source_index.cmp(&b.source_index))
    });

    let indices = DomIndices::build(document);
    match indices.id_map.get(ANCHOR_ID).cloned() {
        Some(anchor) => {
            log::debug!("applying {} rules inside #{}", rules.len(), ANCHOR_ID);
            for rule in &rules {
                if css_matcher::has_pseudo(&rule.selector) {
                    log::trace!("pseudo selector {:?} skipped", rule.selector);
                    continue;
                }
                let matched = css_matcher::match_selector(&rule.selector, &indices, &anchor);
                if matched.is_empty() {
                    log::trace!("selector {:?} matched nothing", rule.selector);
                    continue;
                }
                let declarations = DeclarationMap::parse(&rule.declaration_text);
                if declarations.is_empty() {
                    continue;
                }
                for element in &matched {
                    merge_into_style_attr(element, &declarations);
                }
            }
        }
        None => {
            // No anchor means no content subtree to confine styling
            // to; leave the tree untouched rather than style globally.
            log::debug!("no #{} element found, skipping style application", ANCHOR_ID);
        }
    }

    // Marker spans are hidden regardless of whether any rule applied,
    // anchor or not.
    force_decorative_markers(&indices);

    fixups::apply_fixups(&serialize_document(document))
}

/// Merges rule declarations into an element's existing `style`
/// attribute. First-seen property positions are retained on override.
fn merge_into_style_attr(element: &NodeHandle, declarations: &DeclarationMap) {
    if let Node::Element(ref mut elem) = *element.borrow_mut() {
        let mut merged = elem
            .attr("style")
            .map(DeclarationMap::parse)
            .unwrap_or_default();
        merged.merge(declarations);
        if !merged.is_empty() {
            elem.set_attr("style", &merged.to_style_string());
        }
    }
}

/// Unconditional post-pass: decorative marker spans keep only the hide
/// declaration, discarding everything the cascade contributed.
fn force_decorative_markers(indices: &DomIndices) {
    for class in DECORATIVE_MARKER_CLASSES {
        let Some(handles) = indices.class_map.get(class) else {
            continue;
        };
        for handle in handles {
            if let Node::Element(ref mut elem) = *handle.borrow_mut() {
                if elem.tag == "span" {
                    elem.set_attr("style", HIDE_DECLARATION);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::nice_html::create_dom_tree;
    use pretty_assertions::assert_eq;

    fn style_of(html: &str, tag_open: &str) -> Option<String> {
        let start = html.find(tag_open)?;
        let rest = &html[start..];
        let end = rest.find('>')?;
        let tag = &rest[..end];
        let style_start = tag.find("style=\"")? + "style=\"".len();
        let style_end = tag[style_start..].find('"')? + style_start;
        Some(tag[style_start..style_end].to_string())
    }

    #[test]
    fn class_rule_styles_descendant_id_rule_styles_anchor() {
        let doc = create_dom_tree(r#"<div id="nice"><span class="x">t</span></div>"#);
        let html = apply_inline_styles(&doc, "#nice{color:red} .x{color:blue}");
        assert_eq!(style_of(&html, "<span").as_deref(), Some("color: blue"));
        assert_eq!(style_of(&html, "<div").as_deref(), Some("color: red"));
    }

    #[test]
    fn equal_specificity_later_rule_wins() {
        let doc = create_dom_tree(r#"<div id="nice"><p>t</p></div>"#);
        let html = apply_inline_styles(&doc, "p{margin:1px} p{margin:2px}");
        assert_eq!(style_of(&html, "<p").as_deref(), Some("margin: 2px"));
    }

    #[test]
    fn higher_specificity_wins_regardless_of_source_order() {
        let doc = create_dom_tree(r#"<div id="nice"><p class="big">t</p></div>"#);
        let html = apply_inline_styles(&doc, ".big{font-size:20px} p{font-size:10px}");
        assert_eq!(style_of(&html, "<p").as_deref(), Some("font-size: 20px"));
    }

    #[test]
    fn existing_inline_style_is_merged_in_place() {
        let doc =
            create_dom_tree(r#"<div id="nice"><p style="color:red;;">t</p></div>"#);
        let html = apply_inline_styles(&doc, "p{font-size:12px}");
        assert_eq!(
            style_of(&html, "<p").as_deref(),
            Some("color: red; font-size: 12px")
        );
    }

    #[test]
    fn elements_outside_anchor_are_never_styled() {
        let doc = create_dom_tree(
            r#"<p class="y">out</p><div id="nice"><p class="y">in</p></div>"#,
        );
        let html = apply_inline_styles(&doc, ".y{color:blue}");
        let first_p = style_of(&html, "<p class=\"y\"");
        // The first serialized <p> is the outside one and must carry
        // no style attribute.
        assert_eq!(first_p, None);
        assert!(html.contains(r#"<p class="y" style="color: blue">in</p>"#));
    }

    #[test]
    fn pseudo_selector_rules_are_skipped() {
        let doc = create_dom_tree(r##"<div id="nice"><a href="#x">t</a></div>"##);
        let html = apply_inline_styles(&doc, "a:hover{color:red} a::before{content:'x'}");
        assert_eq!(style_of(&html, "<a"), None);
    }

    #[test]
    fn decorative_markers_keep_only_the_hide_declaration() {
        let doc = create_dom_tree(concat!(
            r#"<div id="nice"><h1><span class="prefix">p</span>"#,
            r#"<span class="content">c</span><span class="suffix">s</span></h1></div>"#,
        ));
        let html = apply_inline_styles(&doc, "span{color:red;font-weight:bold}");
        // The trailing ';' of the hide declaration is trimmed by the
        // style-attribute fixup pass.
        assert_eq!(
            style_of(&html, "<span class=\"prefix\"").as_deref(),
            Some("display: none")
        );
        assert_eq!(
            style_of(&html, "<span class=\"suffix\"").as_deref(),
            Some("display: none")
        );
        assert_eq!(
            style_of(&html, "<span class=\"content\"").as_deref(),
            Some("color: red; font-weight: bold")
        );
    }

    #[test]
    fn markers_are_hidden_even_without_an_anchor() {
        let doc = create_dom_tree(concat!(
            r#"<h1><span class="prefix">p</span>"#,
            r#"<span class="content">c</span></h1>"#,
        ));
        let html = apply_inline_styles(&doc, "span{color:red}");
        assert_eq!(
            style_of(&html, "<span class=\"prefix\"").as_deref(),
            Some("display: none")
        );
        // No anchor, so the rule itself must not have applied.
        assert_eq!(style_of(&html, "<span class=\"content\""), None);
    }

    #[test]
    fn no_matching_rules_leaves_styles_untouched() {
        let doc =
            create_dom_tree(r#"<div id="nice"><p style="color: red">t</p></div>"#);
        let html = apply_inline_styles(&doc, ".absent{color:blue}");
        assert_eq!(style_of(&html, "<p").as_deref(), Some("color: red"));
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let doc = create_dom_tree(r#"<div id="nice"><p class="a">t</p></div>"#);
        let css = "p{margin:1px} .a{margin:2px;color:blue}";
        let once = apply_inline_styles(&doc, css);
        let doc_again = create_dom_tree(&once);
        let twice = apply_inline_styles(&doc_again, css);
        assert_eq!(once, twice);
    }
}
