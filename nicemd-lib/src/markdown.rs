//! Markdown rendering. pulldown-cmark produces the base HTML; fenced
//! code blocks are intercepted and replaced with syntect-highlighted
//! markup so the downstream code-block decoration sees real spans.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use std::sync::LazyLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Renders Markdown to an HTML fragment with the default syntect
/// highlighter.
pub fn render_markdown(markdown: &str) -> String {
    render_markdown_with(markdown, syntect_highlight)
}

/// Renders Markdown with a caller-supplied code highlighter.
///
/// The callback receives `(code, declared_language)` and returns
/// highlighted HTML, or `None` to fall back to escaped plain text.
/// Failures belong on the `None` path; the callback must not panic
/// across this boundary.
pub fn render_markdown_with(
    markdown: &str,
    highlight: impl Fn(&str, &str) -> Option<String>,
) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);

    let mut events: Vec<Event> = Vec::new();
    let mut code_lang: Option<String> = None;
    let mut code_buf = String::new();

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                code_lang = Some(match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or("").to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                });
                code_buf.clear();
            }
            Event::Text(text) if code_lang.is_some() => {
                code_buf.push_str(&text);
            }
            Event::End(TagEnd::CodeBlock) => {
                let lang = code_lang.take().unwrap_or_default();
                events.push(Event::Html(
                    render_code_block(&lang, &code_buf, &highlight).into(),
                ));
            }
            other => events.push(other),
        }
    }

    let mut html = String::with_capacity(markdown.len() * 2);
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    html
}

fn render_code_block(
    lang: &str,
    code: &str,
    highlight: &impl Fn(&str, &str) -> Option<String>,
) -> String {
    let class_attr = if lang.is_empty() {
        String::new()
    } else {
        format!(" class=\"language-{}\"", lang)
    };
    let body = highlight(code, lang).unwrap_or_else(|| escape_code(code));
    format!("<pre><code{}>{}</code></pre>\n", class_attr, body)
}

/// Default class-based highlighting. `None` when the language is
/// unknown and first-line detection fails, or when syntect rejects
/// the input.
fn syntect_highlight(code: &str, lang: &str) -> Option<String> {
    let syntax = SYNTAX_SET
        .find_syntax_by_token(lang)
        .or_else(|| code.lines().next().and_then(|l| SYNTAX_SET.find_syntax_by_first_line(l)))?;
    if syntax.name == "Plain Text" {
        return None;
    }
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        if let Err(err) = generator.parse_html_for_line_which_includes_newline(line) {
            log::debug!("highlighting failed for {:?} block: {}", lang, err);
            return None;
        }
    }
    Some(generator.finalize())
}

fn escape_code(code: &str) -> String {
    code.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
