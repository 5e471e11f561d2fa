//! Localized messages for error codes.
//!
//! Each `<locale>.yaml` file in the locales directory is a flat map from
//! message key to template. Templates take positional `{}` placeholders.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};

const CATALOG_EXTENSION: &str = "yaml";

/// Immutable set of message catalogs, one per locale.
#[derive(Debug, Clone)]
pub struct Translator {
    catalogs: HashMap<String, HashMap<String, String>>,
    default_locale: String,
}

impl Translator {
    /// Loads every catalog in `dir`. Fails if `default_locale` has none.
    pub fn load(dir: impl AsRef<Path>, default_locale: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("reading locales directory {}", dir.display()))?;

        let mut catalogs = HashMap::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("listing locales directory {}", dir.display()))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some(CATALOG_EXTENSION) {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading locale file {}", path.display()))?;
            let messages: HashMap<String, String> = serde_yaml::from_str(&raw)
                .with_context(|| format!("parsing locale file {}", path.display()))?;

            tracing::debug!(locale, messages = messages.len(), "loaded locale catalog");
            catalogs.insert(locale.to_ascii_lowercase(), messages);
        }

        Self::from_catalogs(catalogs, default_locale)
    }

    pub fn from_catalogs(
        catalogs: HashMap<String, HashMap<String, String>>,
        default_locale: &str,
    ) -> Result<Self> {
        let default_locale = default_locale.to_ascii_lowercase();
        if !catalogs.contains_key(&default_locale) {
            bail!("default locale {default_locale} not found");
        }
        Ok(Self {
            catalogs,
            default_locale,
        })
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Picks the first locale named in an `Accept-Language` value that has a
    /// catalog, falling back to the default.
    pub fn negotiate(&self, accept_language: Option<&str>) -> &str {
        let Some(header) = accept_language else {
            return &self.default_locale;
        };
        for range in header.split(',') {
            let tag = range
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            let primary = tag.split('-').next().unwrap_or_default();
            for candidate in [tag.as_str(), primary] {
                if let Some((locale, _)) = self.catalogs.get_key_value(candidate) {
                    return locale;
                }
            }
        }
        &self.default_locale
    }

    /// Message for `key` in `locale`, with `args` substituted in order.
    /// Unknown locales use the default catalog; unknown keys yield the key.
    pub fn translate(&self, locale: &str, key: &str, args: &[&str]) -> String {
        let catalog = self
            .catalogs
            .get(locale)
            .or_else(|| self.catalogs.get(&self.default_locale));
        match catalog.and_then(|messages| messages.get(key)) {
            Some(template) => fill(template, args),
            None => {
                tracing::debug!(locale, key, "translation key not found");
                key.to_string()
            }
        }
    }
}

fn fill(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;
    while let Some(at) = rest.find("{}") {
        out.push_str(&rest[..at]);
        out.push_str(args.next().copied().unwrap_or_default());
        rest = &rest[at + 2..];
    }
    out.push_str(rest);
    out
}
