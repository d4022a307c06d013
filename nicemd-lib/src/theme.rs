//! Theme loading. A theme is a JSON export of the editor's style
//! configuration: a main stylesheet plus a list of style models whose
//! entries carry per-user overrides such as `customStyle` and
//! `customCss`.

use crate::error::ConvertError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Deserialize)]
pub struct ThemeConfig {
    pub data: ThemeData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeData {
    /// Main theme stylesheet.
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub style_model_list: Vec<StyleModel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StyleModel {
    pub id: String,
    #[serde(default)]
    pub styles: Vec<StyleEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StyleEntry {
    pub id: String,
    #[serde(default)]
    pub value: String,
}

impl ThemeConfig {
    /// Value of the `customCss` entry inside the `customStyle` style
    /// model. Entries with the same id under other models are not
    /// user CSS and are ignored.
    fn custom_css(&self) -> String {
        let mut custom_css = String::new();
        for model in &self.data.style_model_list {
            if model.id != "customStyle" {
                continue;
            }
            if let Some(entry) = model.styles.iter().find(|s| s.id == "customCss") {
                custom_css = entry.value.clone();
            }
        }
        custom_css
    }
}

/// Loads theme JSON files from a directory and caches parsed configs.
pub struct ThemeStore {
    dir: PathBuf,
    cache: Mutex<HashMap<String, ThemeConfig>>,
}

impl ThemeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ThemeStore {
            dir: dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Theme names, sorted, derived from `*.json` file stems.
    pub fn list_theme_names(&self) -> Result<Vec<String>, ConvertError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| ConvertError::ThemeRead {
            path: self.dir.clone(),
            source,
        })?;
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    path.file_stem().map(|s| s.to_string_lossy().into_owned())
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        if names.is_empty() {
            return Err(ConvertError::NoThemes {
                dir: self.dir.clone(),
            });
        }
        Ok(names)
    }

    pub fn default_theme_name(&self) -> Result<String, ConvertError> {
        // list_theme_names guarantees at least one entry.
        Ok(self.list_theme_names()?.remove(0))
    }

    pub fn load(&self, name: &str) -> Result<ThemeConfig, ConvertError> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(config) = cache.get(name) {
                return Ok(config.clone());
            }
        }
        let path = self.theme_path(name);
        if !path.is_file() {
            return Err(ConvertError::ThemeNotFound(name.to_string()));
        }
        let text = std::fs::read_to_string(&path).map_err(|source| ConvertError::ThemeRead {
            path: path.clone(),
            source,
        })?;
        let config: ThemeConfig =
            serde_json::from_str(&text).map_err(|source| ConvertError::ThemeParse {
                path: path.clone(),
                source,
            })?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(name.to_string(), config.clone());
        }
        Ok(config)
    }

    /// Main stylesheet of the named theme.
    pub fn theme_style(&self, name: &str) -> Result<String, ConvertError> {
        Ok(self.load(name)?.data.style.clone())
    }

    /// User-supplied extra CSS of the named theme.
    pub fn custom_css(&self, name: &str) -> Result<String, ConvertError> {
        Ok(self.load(name)?.custom_css())
    }

    fn theme_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_theme(dir: &Path, name: &str, json: &str) {
        std::fs::write(dir.join(format!("{}.json", name)), json).unwrap();
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nicemd-theme-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn lists_theme_names_sorted() {
        let dir = temp_dir("list");
        write_theme(&dir, "zeta", r#"{"data":{"style":""}}"#);
        write_theme(&dir, "alpha", r#"{"data":{"style":""}}"#);
        let store = ThemeStore::new(&dir);
        assert_eq!(store.list_theme_names().unwrap(), vec!["alpha", "zeta"]);
        assert_eq!(store.default_theme_name().unwrap(), "alpha");
    }

    #[test]
    fn unknown_theme_is_an_error() {
        let dir = temp_dir("missing");
        write_theme(&dir, "only", r#"{"data":{"style":""}}"#);
        let store = ThemeStore::new(&dir);
        assert!(matches!(
            store.load("nope"),
            Err(ConvertError::ThemeNotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn reads_custom_css_from_the_custom_style_model() {
        let dir = temp_dir("custom");
        write_theme(
            &dir,
            "t",
            r##"{"data":{"style":"#nice { color: red; }","styleModelList":[
                {"id":"customStyle","styles":[
                    {"id":"customCss","value":"h1 { font-size: 2em; }"}
                ]}
            ]}}"##,
        );
        let store = ThemeStore::new(&dir);
        assert_eq!(store.theme_style("t").unwrap(), "#nice { color: red; }");
        assert_eq!(store.custom_css("t").unwrap(), "h1 { font-size: 2em; }");
    }

    #[test]
    fn custom_css_entries_under_other_models_are_ignored() {
        let dir = temp_dir("decoy");
        write_theme(
            &dir,
            "t",
            r#"{"data":{"style":"","styleModelList":[
                {"id":"headingStyle","styles":[
                    {"id":"customCss","value":"h2 { color: green; }"}
                ]}
            ]}}"#,
        );
        let store = ThemeStore::new(&dir);
        assert_eq!(store.custom_css("t").unwrap(), "");
    }
}
