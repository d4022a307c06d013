use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the Markdown conversion pipeline.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("theme '{0}' not found")]
    ThemeNotFound(String),

    #[error("no theme files in {dir}")]
    NoThemes { dir: PathBuf },

    #[error("failed to read theme file {path}")]
    ThemeRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse theme file {path}")]
    ThemeParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
