//! String-level cleanup of the serialized HTML, run after all inline
//! styles are baked in. The steps are ordered and each is idempotent,
//! so re-running the pass on its own output is a no-op.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static RE_SELF_CLOSING_BR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<br\s*/>").unwrap());
static RE_BODY_CONTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body[^>]*>(.*)</body>").unwrap());
static RE_TRAILING_DIV: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</div>\s*$").unwrap());
static RE_REPEATED_SEMICOLONS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r";{2,}").unwrap());
static RE_OPAQUE_RGBA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"rgba\((\d+),\s*(\d+),\s*(\d+),\s*1\)").unwrap());
static RE_CONTENT_UNSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)content:\s*unset;?\s*").unwrap());
static RE_NUMERIC_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([;"])\s*color:\s*-?\d+(?:\.\d+)?(?:px|em|rem|pt|%)?\s*;?"#).unwrap()
});
static RE_STYLE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"style="([^"]*)""#).unwrap());
static RE_LIST_OPEN_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(<(?:ol|ul)[^>]*>)\s+(<li)").unwrap());
static RE_LIST_ITEM_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(</li>)\s+(<li)").unwrap());

/// Corrupt property names produced by historical string-concatenation
/// merges, with the two declarations they glue together. Anything not
/// in this table is left untouched; the intent of an unknown corrupt
/// name is ambiguous, so no generic repair is attempted.
const PROPERTY_REPAIRS: &[(&str, &str, &str)] = &[
    ("border-radius-display", "border-radius", "display"),
    ("padding-top-background", "padding-top", "background"),
];

/// Properties a repair is allowed to produce. Legitimate multi-hyphen
/// names such as `border-top-left-radius` never appear here as repair
/// output and are therefore never rewritten.
const REPAIRABLE_PROPERTIES: &[&str] = &[
    "border-radius",
    "display",
    "padding-top",
    "background",
];

/// Applies all fixups in their required order.
pub fn apply_fixups(html: &str) -> String {
    let mut result = RE_SELF_CLOSING_BR.replace_all(html, "<br>").into_owned();

    // The serializer emits a full document wrapper; only the body
    // content is the conversion result.
    if result.contains("<html") {
        if let Some(caps) = RE_BODY_CONTENT.captures(&result) {
            result = caps[1].trim().to_string();
        }
    }

    // The container div was renamed to a section in the tree, but a
    // generic serializer auto-closing the document may still leave a
    // stray </div> as the final closing tag.
    result = RE_TRAILING_DIV.replace(&result, "</section>").into_owned();

    result = RE_REPEATED_SEMICOLONS.replace_all(&result, ";").into_owned();

    // Fully-opaque rgba collapses to rgb, keeping theme diffs stable.
    result = RE_OPAQUE_RGBA
        .replace_all(&result, "rgb($1, $2, $3)")
        .into_owned();

    // Pseudo-element leftovers have no meaning as inline styles.
    result = RE_CONTENT_UNSET.replace_all(&result, "").into_owned();

    result = RE_STYLE_ATTR
        .replace_all(&result, |caps: &Captures| {
            format!("style=\"{}\"", repair_declarations(&caps[1]))
        })
        .into_owned();

    // A bare numeric value can never be a color; drop the declaration.
    result = RE_NUMERIC_COLOR.replace_all(&result, "$1").into_owned();

    result = RE_STYLE_ATTR
        .replace_all(&result, |caps: &Captures| {
            let trimmed = caps[1].trim_matches(|c: char| c == ';' || c.is_whitespace());
            format!("style=\"{}\"", trimmed)
        })
        .into_owned();

    // Whitespace-only gaps between list boundaries would otherwise be
    // rendered as empty items downstream; nested lists are covered
    // because the replacement is global.
    result = RE_LIST_OPEN_GAP.replace_all(&result, "$1$2").into_owned();
    result = RE_LIST_ITEM_GAP.replace_all(&result, "$1$2").into_owned();

    result
}

/// Rewrites one style attribute value, splitting known corrupt
/// property names back into the two declarations they came from.
fn repair_declarations(value: &str) -> String {
    if !PROPERTY_REPAIRS
        .iter()
        .any(|(corrupt, _, _)| value.contains(corrupt))
    {
        return value.to_string();
    }
    let mut repaired = Vec::new();
    for segment in value.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let Some(colon) = segment.find(':') else {
            repaired.push(segment.to_string());
            continue;
        };
        let name = segment[..colon].trim();
        let decl_value = segment[colon + 1..].trim();
        let repair = PROPERTY_REPAIRS
            .iter()
            .find(|(corrupt, _, _)| *corrupt == name);
        match repair {
            Some((_, first, second))
                if REPAIRABLE_PROPERTIES.contains(first)
                    && REPAIRABLE_PROPERTIES.contains(second) =>
            {
                if let Some((first_value, second_value)) = decl_value.split_once(' ') {
                    log::debug!("repaired corrupt property {:?}", name);
                    repaired.push(format!("{}: {}", first, first_value.trim()));
                    repaired.push(format!("{}: {}", second, second_value.trim()));
                } else {
                    repaired.push(segment.to_string());
                }
            }
            _ => repaired.push(segment.to_string()),
        }
    }
    repaired.join("; ")
}
