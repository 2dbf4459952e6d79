use crate::selector::Selector;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// User-facing preferences, read from the TOML file passed with `--config`.
///
/// ```toml
/// title = "{{ source }} ({{ turns }} turns)"
/// extra_noise_selectors = ["hallucination-disclaimer", "div.table-footer"]
/// warn_on_attachments = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    /// Jinja2 template for the output `<title>`. Context: `source`, `turns`,
    /// `user_turns`, `model_turns`. Unset leaves the exported title alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Extra noise selectors (`tag`, `.class`, `tag.class` or
    /// `tag[class*="text"]`) removed from every turn on top of the built-in
    /// list.
    #[serde(default)]
    pub extra_noise_selectors: Vec<String>,

    /// Warn when the export references attachments that will not be archived.
    #[serde(default = "default_warn_on_attachments")]
    pub warn_on_attachments: bool,
}

fn default_warn_on_attachments() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            title: None,
            extra_noise_selectors: Vec::new(),
            warn_on_attachments: default_warn_on_attachments(),
        }
    }
}

impl Preferences {
    /// Load preferences from `path`.
    ///
    /// If the file doesn't exist it is created with defaults. Missing keys
    /// in an existing file are filled in with defaults via serde.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let prefs: Preferences = toml::from_str(&contents)
                    .with_context(|| format!("parsing {}", path.display()))?;
                Ok(prefs)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let prefs = Preferences::default();
                let toml_str = toml::to_string_pretty(&prefs)
                    .context("serializing default preferences")?;
                fs::write(path, &toml_str)
                    .with_context(|| format!("writing default {}", path.display()))?;
                Ok(prefs)
            }
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    pub fn noise_selectors(&self) -> Result<Vec<Selector>> {
        self.extra_noise_selectors
            .iter()
            .map(|s| Selector::parse(s).context("in extra_noise_selectors"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simplify.toml");
        let prefs = Preferences::load(&path).unwrap();
        assert_eq!(prefs, Preferences::default());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("warn_on_attachments = true"), "{written}");
    }

    #[test]
    fn missing_keys_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simplify.toml");
        fs::write(&path, "title = \"{{ source }}\"\n").unwrap();
        let prefs = Preferences::load(&path).unwrap();
        assert_eq!(prefs.title.as_deref(), Some("{{ source }}"));
        assert!(prefs.extra_noise_selectors.is_empty());
        assert!(prefs.warn_on_attachments);
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simplify.toml");
        fs::write(&path, "warn_on_attachments = \"maybe\"").unwrap();
        let err = Preferences::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("simplify.toml"));
    }

    #[test]
    fn bad_noise_selector_is_an_error() {
        let prefs = Preferences {
            extra_noise_selectors: vec!["div.ok".into(), "div > p".into()],
            ..Default::default()
        };
        let err = prefs.noise_selectors().unwrap_err();
        assert!(format!("{err:#}").contains("div > p"));
    }

    #[test]
    fn every_documented_selector_form_is_accepted() {
        let prefs = Preferences {
            extra_noise_selectors: vec![
                "hallucination-disclaimer".into(),
                ".table-footer".into(),
                "div.table-footer".into(),
                r#"span[class*="banner"]"#.into(),
            ],
            ..Default::default()
        };
        assert_eq!(prefs.noise_selectors().unwrap().len(), 4);
    }
}
