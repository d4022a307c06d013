use nicemd_lib::error::ConvertError;
use nicemd_lib::{convert, ThemeStore};
use std::path::PathBuf;

use pretty_assertions::assert_eq;

const THEME_JSON: &str = r##"{
    "data": {
        "style": "#nice { font-size: 16px; color: #333; } #nice p { margin: 10px 0; } #nice h1 .content { color: #e91e63; } #nice li section { display: inline; }",
        "styleModelList": [
            {
                "id": "customStyle",
                "styles": [
                    { "id": "customCss", "value": "#nice strong { color: #ff5722; }" }
                ]
            }
        ]
    }
}"##;

fn theme_store(tag: &str) -> ThemeStore {
    let dir: PathBuf =
        std::env::temp_dir().join(format!("nicemd-convert-{}-{}", tag, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("default.json"), THEME_JSON).unwrap();
    ThemeStore::new(dir)
}

#[test]
fn converts_markdown_end_to_end() {
    let store = theme_store("e2e");
    let markdown = "# Title\n\nHello **bold** world.\n\n- first\n- second\n";
    let conversion = convert(markdown, None, &store).unwrap();

    assert_eq!(conversion.theme, "default");
    let html = &conversion.html;

    // Container and per-element stamping.
    assert!(html.starts_with("<section id=\"nice\""));
    assert!(html.ends_with("</section>"));
    assert!(html.contains("data-tool=\"mdnice编辑器\""));
    assert!(html.contains("data-website=\"https://www.mdnice.com\""));

    // Theme declarations are inlined.
    assert!(html.contains("font-size: 16px"));
    assert!(html.contains("margin: 10px 0"));

    // Heading decomposition with the themed content span.
    assert!(html.contains("<span class=\"content\" style=\"color: #e91e63\">Title</span>"));

    // User CSS from the theme participates in the cascade.
    assert!(html.contains("<strong style=\"color: #ff5722\">bold</strong>"));

    // List items wrapped in themed sections.
    assert!(html.contains("<section style=\"display: inline\">first</section>"));
}

#[test]
fn code_blocks_survive_the_full_pipeline() {
    let store = theme_store("code");
    let markdown = "```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n";
    let conversion = convert(markdown, Some("default"), &store).unwrap();
    let html = &conversion.html;

    assert!(html.contains("<pre class=\"custom\""));
    assert!(html.contains("<code class=\"hljs\""));
    // Code text is entity-encoded and line breaks are explicit.
    assert!(html.contains("&nbsp;"));
    assert!(html.contains("<br>"));
    assert!(!html.contains("<br/>"));
    assert!(!html.contains(";;"));
}

#[test]
fn unknown_theme_is_reported() {
    let store = theme_store("unknown");
    let err = convert("# x\n", Some("missing"), &store).unwrap_err();
    assert!(matches!(err, ConvertError::ThemeNotFound(name) if name == "missing"));
}

#[test]
fn output_is_stable_across_runs() {
    let store = theme_store("stable");
    let markdown = "# A\n\npara with `code` span.\n";
    let first = convert(markdown, None, &store).unwrap();
    let second = convert(markdown, None, &store).unwrap();
    assert_eq!(first.html, second.html);
}
