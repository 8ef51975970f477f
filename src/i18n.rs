//! UI translations with `{placeholder}` substitution.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where locale tables come from (`/lang/<code>.json` on the backend).
pub trait LocaleSource {
    /// Flat `key -> text` table for one language.
    fn fetch_locale(&self, code: &str) -> Result<HashMap<String, String>>;

    /// Contents of `languages.json`.
    fn fetch_language_list(&self) -> Result<LanguageList>;
}

/// One selectable language.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub native_name: String,
}

/// Available languages and the default one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanguageList {
    #[serde(default)]
    pub available: Vec<LanguageInfo>,
    #[serde(default = "default_language")]
    pub default: String,
}

fn default_language() -> String {
    "en".to_string()
}

impl LanguageList {
    /// Used when `languages.json` can't be loaded.
    pub fn fallback() -> Self {
        Self {
            available: vec![
                LanguageInfo {
                    code: "en".into(),
                    name: "English".into(),
                    native_name: "English".into(),
                },
                LanguageInfo {
                    code: "de".into(),
                    name: "German".into(),
                    native_name: "Deutsch".into(),
                },
            ],
            default: default_language(),
        }
    }

    pub fn load(source: &dyn LocaleSource) -> Self {
        match source.fetch_language_list() {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "could not load language list, using defaults");
                Self::fallback()
            }
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.available.iter().any(|l| l.code == code)
    }
}

/// Loaded translation table for the current language.
#[derive(Clone, Debug, Default)]
pub struct Translations {
    code: String,
    strings: HashMap<String, String>,
}

impl Translations {
    pub fn new(code: impl Into<String>, strings: HashMap<String, String>) -> Self {
        Self {
            code: code.into(),
            strings,
        }
    }

    /// Load `requested`, falling back to `default`, then to an empty table.
    pub fn load(source: &dyn LocaleSource, requested: &str, default: &str) -> Self {
        match source.fetch_locale(requested) {
            Ok(strings) => {
                tracing::info!(language = requested, keys = strings.len(), "language loaded");
                return Self::new(requested, strings);
            }
            Err(e) => tracing::warn!(language = requested, error = %e, "language file not found"),
        }

        if requested != default {
            match source.fetch_locale(default) {
                Ok(strings) => return Self::new(default, strings),
                Err(e) => tracing::warn!(language = default, error = %e, "default language file not found"),
            }
        }

        Self::new(default, HashMap::new())
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Text for `key`, or the key itself when missing.
    pub fn t(&self, key: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Text for `key`, or `fallback` when the table lacks it.
    pub fn t_or(&self, key: &str, fallback: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Like [`t`](Self::t), replacing the first `{name}` for each pair.
    pub fn t_with(&self, key: &str, replacements: &[(&str, &str)]) -> String {
        let mut text = self.t(key);
        for (name, value) in replacements {
            text = text.replacen(&format!("{{{name}}}"), value, 1);
        }
        text
    }
}
