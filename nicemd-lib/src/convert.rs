//! End-to-end conversion: Markdown in, themed rich-content HTML out.

use crate::error::ConvertError;
use crate::markdown::render_markdown;
use crate::parser::nice_html::create_dom_tree;
use crate::style::inline::apply_inline_styles;
use crate::theme::ThemeStore;
use crate::transform::to_nice_format;

/// Result of a conversion, with the inputs that produced it.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub html: String,
    pub theme: String,
    pub style: String,
    pub custom_css: String,
}

/// Converts Markdown into inlined-style HTML using the named theme,
/// or the store's default theme when `theme` is `None`.
pub fn convert(
    markdown: &str,
    theme: Option<&str>,
    themes: &ThemeStore,
) -> Result<Conversion, ConvertError> {
    let theme = match theme {
        Some(name) => name.to_string(),
        None => themes.default_theme_name()?,
    };
    let style = themes.theme_style(&theme)?;
    let custom_css = themes.custom_css(&theme)?;

    log::info!("converting {} bytes of markdown with theme '{}'", markdown.len(), theme);

    let fragment = render_markdown(markdown);
    let wrapped = format!("<div id=\"nice\">\n{}\n</div>", fragment);

    let document = create_dom_tree(&wrapped);
    to_nice_format(&document);

    let css = format!("{}\n{}", style, custom_css);
    let html = apply_inline_styles(&document, &css);

    Ok(Conversion {
        html,
        theme,
        style,
        custom_css,
    })
}
