//! Translation collaborator
//!
//! The planner never renders strings itself; it asks a [`Translator`] for the
//! text behind a key. [`MapTranslator`] is the bundle-backed implementation
//! used by the CLI and tests. Bundles are YAML or JSON documents whose nested
//! mappings flatten into dotted keys:
//!
//! ```yaml
//! metrics:
//!   leadTime:
//!     name: Lead time
//! ```
//!
//! yields the key `metrics.leadTime.name`.

use crate::error::BundleError;
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::Path;

/// Resolves translation keys to display text
pub trait Translator: Send + Sync {
    /// Text for `key`, if the bundle has it
    fn lookup(&self, key: &str) -> Option<String>;

    /// Text for `key`, else `fallback`, else the key itself
    fn translate(&self, key: &str, fallback: Option<&str>) -> String {
        match self.lookup(key) {
            Some(text) => text,
            None => {
                tracing::trace!(key, "translation missing");
                fallback.unwrap_or(key).to_string()
            }
        }
    }
}

/// Translator that knows no keys
///
/// Every lookup misses, so keys come back unchanged (or as their fallback).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn lookup(&self, _key: &str) -> Option<String> {
        None
    }
}

/// In-memory translation bundle for one locale
#[derive(Debug, Clone, Default)]
pub struct MapTranslator {
    locale: String,
    entries: HashMap<String, String>,
}

impl MapTranslator {
    /// Create empty bundle
    #[inline]
    #[must_use]
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            entries: HashMap::new(),
        }
    }

    /// Parse a YAML bundle
    ///
    /// # Errors
    /// - `BundleError::Yaml` on syntax errors
    /// - `BundleError::NotAMapping` if the root is not a mapping
    pub fn from_yaml_str(locale: impl Into<String>, source: &str) -> Result<Self, BundleError> {
        let root: Value = serde_yaml::from_str(source)?;
        Self::from_value(locale, &root)
    }

    /// Parse a JSON bundle
    ///
    /// # Errors
    /// - `BundleError::Json` on syntax errors
    /// - `BundleError::NotAMapping` if the root is not an object
    pub fn from_json_str(locale: impl Into<String>, source: &str) -> Result<Self, BundleError> {
        let root: Value = serde_json::from_str(source)?;
        Self::from_value(locale, &root)
    }

    /// Load a bundle file; the format follows the extension
    /// (`.yaml`/`.yml`/`.json`) and the locale defaults to the file stem
    ///
    /// # Errors
    /// - `BundleError::Io` if the file cannot be read
    /// - `BundleError::UnsupportedFormat` for other extensions
    /// - parse errors as for [`MapTranslator::from_yaml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| BundleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let locale = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("und")
            .to_string();

        let bundle = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(locale, &source)?,
            Some("json") => Self::from_json_str(locale, &source)?,
            other => {
                return Err(BundleError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ))
            }
        };
        tracing::debug!(path = %path.display(), entries = bundle.len(), "loaded translation bundle");
        Ok(bundle)
    }

    fn from_value(locale: impl Into<String>, root: &Value) -> Result<Self, BundleError> {
        if !root.is_mapping() {
            return Err(BundleError::NotAMapping);
        }
        let mut bundle = Self::new(locale);
        flatten(root, String::new(), &mut bundle.entries);
        Ok(bundle)
    }

    /// Add or replace one entry
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    /// Builder-style [`MapTranslator::insert`]
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(key, text);
        self
    }

    /// Overlay another bundle; its entries win
    pub fn merge(&mut self, other: MapTranslator) {
        self.entries.extend(other.entries);
    }

    #[inline]
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl Translator for MapTranslator {
    fn lookup(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

fn flatten(value: &Value, prefix: String, out: &mut HashMap<String, String>) {
    match value {
        Value::Mapping(map) => {
            for (k, v) in map {
                let segment = match k {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => continue,
                };
                let key = if prefix.is_empty() {
                    segment
                } else {
                    format!("{prefix}.{segment}")
                };
                flatten(v, key, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix, s.clone());
        }
        Value::Number(n) => {
            out.insert(prefix, n.to_string());
        }
        Value::Bool(b) => {
            out.insert(prefix, b.to_string());
        }
        Value::Tagged(tagged) => flatten(&tagged.value, prefix, out),
        Value::Null | Value::Sequence(_) => {}
    }
}
