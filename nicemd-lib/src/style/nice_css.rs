//! CSS rule extraction and declaration handling.
//!
//! The stylesheet side of the cascade engine deliberately stays
//! string-level: a rule is a selector plus its raw declaration text,
//! scanned out of the theme CSS with a small brace-depth state machine.
//! Selector interpretation happens later in `css_matcher`.

/// One selector/declaration-block pair extracted from a stylesheet.
///
/// A comma-separated selector group yields one `StyleRule` per
/// individual selector, all sharing the declaration text. Source
/// indices are unique and monotonically increasing in parse order,
/// which makes them a stable cascade tie-break key.
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selector: String,
    pub declaration_text: String,
    pub source_index: usize,
}

/// Parses concatenated theme CSS into a flat, ordered rule list.
///
/// Comments are stripped first. At-rules are skipped wholesale so
/// rules nested inside media queries never leak into the flat list;
/// this is why the block scan tracks brace depth instead of taking the
/// first `}`. Empty selectors or bodies are dropped silently.
pub fn parse_rules(css_text: &str) -> Vec<StyleRule> {
    let css = strip_comments(css_text);
    let bytes = css.as_bytes();
    let mut rules = Vec::new();
    let mut source_index = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let Some(brace_rel) = css[i..].find('{') else {
            break;
        };
        let brace_start = i + brace_rel;

        // A ';' before the brace ends a blockless statement such as
        // `@import ...;`; skip it and rescan.
        if let Some(semi_rel) = css[i..brace_start].find(';') {
            i += semi_rel + 1;
            continue;
        }

        let selector_text = css[i..brace_start].trim().to_string();

        // Matching '}' by depth: the body may contain nested blocks
        // when the selector is an at-rule.
        let mut depth = 1usize;
        let mut j = brace_start + 1;
        while j < bytes.len() && depth > 0 {
            match bytes[j] {
                b'{' => depth += 1,
                b'}' => depth -= 1,
                _ => {}
            }
            j += 1;
        }
        if depth != 0 {
            log::debug!("unterminated css block after {:?}", selector_text);
            break;
        }
        let body = css[brace_start + 1..j - 1].trim();
        i = j;

        if selector_text.starts_with('@') {
            continue;
        }
        if selector_text.is_empty() || body.is_empty() {
            continue;
        }
        for raw_selector in selector_text.split(',') {
            let selector = normalize_whitespace(raw_selector);
            if selector.is_empty() {
                continue;
            }
            rules.push(StyleRule {
                selector,
                declaration_text: body.to_string(),
                source_index,
            });
            source_index += 1;
        }
    }
    rules
}

fn strip_comments(css: &str) -> String {
    let mut out = css.to_string();
    while let Some(start) = out.find("/*") {
        match out[start + 2..].find("*/") {
            Some(end_rel) => out.replace_range(start..start + 2 + end_rel + 2, ""),
            None => {
                out.truncate(start);
                break;
            }
        }
    }
    out
}

fn normalize_whitespace(selector: &str) -> String {
    selector.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Ordered property → value mapping with unique keys.
///
/// Insertion order is preserved, except that re-inserting an existing
/// key updates its value in place instead of moving it to the end.
/// This is the unit of merge for both rule declarations and an
/// element's inline `style` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationMap {
    entries: Vec<(String, String)>,
}

impl DeclarationMap {
    /// Parses `prop: value; ...` text. Segments without a colon, and
    /// segments with an empty property or value, are dropped.
    pub fn parse(text: &str) -> Self {
        let mut map = DeclarationMap::default();
        for segment in text.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let Some(colon) = segment.find(':') else {
                continue;
            };
            let key = segment[..colon].trim();
            let value = segment[colon + 1..].trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            map.set(key, value);
        }
        map
    }

    pub fn set(&mut self, key: &str, value: &str) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value.to_string();
        } else {
            self.entries.push((key.to_string(), value.to_string()));
        }
    }

    /// Later declarations override earlier ones per property; this is
    /// what implements "last applicable rule wins" once rules are
    /// applied in cascade order.
    pub fn merge(&mut self, other: &DeclarationMap) {
        for (key, value) in &other.entries {
            self.set(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes as `prop1: value1; prop2: value2` in map order.
    pub fn to_style_string(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
