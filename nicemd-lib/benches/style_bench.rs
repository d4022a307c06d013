extern crate criterion;

use criterion::{criterion_group, criterion_main, Criterion};

use nicemd_lib::parser::nice_html::create_dom_tree;
use nicemd_lib::style::inline::apply_inline_styles;
use nicemd_lib::transform::to_nice_format;

const THEME_CSS: &str = r#"
#nice { font-size: 16px; color: #353535; line-height: 1.75; }
#nice p { margin: 10px 0; letter-spacing: 0.1em; }
#nice h2 .content { color: #e91e63; font-size: 20px; }
#nice strong { color: #ff5722; font-weight: bold; }
#nice li section { display: inline; color: #555; }
#nice blockquote { border-left: 3px solid #e91e63; padding: 1px 0 1px 10px; }
"#;

fn bench_many_paragraphs(c: &mut Criterion) {
    let mut big_html = String::with_capacity(1_000_000);
    big_html.push_str("<div id=\"nice\">");
    for i in 0..10_000 {
        big_html.push_str(&format!("<p>paragraph <strong>{}</strong></p>", i));
    }
    big_html.push_str("</div>");

    c.bench_function("inline_many_paragraphs", |b| {
        b.iter(|| {
            let document = create_dom_tree(&big_html);
            to_nice_format(&document);
            apply_inline_styles(&document, THEME_CSS)
        })
    });
}

fn bench_deep_lists(c: &mut Criterion) {
    let mut deep_html = String::from("<div id=\"nice\">");
    for _ in 0..200 {
        deep_html.push_str("<ul><li>item");
    }
    for _ in 0..200 {
        deep_html.push_str("</li></ul>");
    }
    deep_html.push_str("</div>");

    c.bench_function("inline_deep_lists", |b| {
        b.iter(|| {
            let document = create_dom_tree(&deep_html);
            to_nice_format(&document);
            apply_inline_styles(&document, THEME_CSS)
        })
    });
}

criterion_group!(benches, bench_many_paragraphs, bench_deep_lists);
criterion_main!(benches);
