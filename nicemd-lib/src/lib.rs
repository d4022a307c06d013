pub mod convert;
pub mod dom;
pub mod error;
pub mod markdown;
pub mod parser;
pub mod style;
pub mod theme;
pub mod transform;

pub use convert::{convert, Conversion};
pub use error::ConvertError;
pub use style::inline::apply_inline_styles;
pub use theme::ThemeStore;
