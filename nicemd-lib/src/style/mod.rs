pub mod css_matcher;
pub mod fixups;
pub mod inline;
pub mod nice_css;
