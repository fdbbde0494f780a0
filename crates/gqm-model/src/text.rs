//! Translation-key or literal text
//!
//! Catalog entries are identified by translation keys, custom form input is
//! literal text, and both end up in the same entity fields. [`Text`] makes the
//! distinction explicit so resolution is a pattern match rather than a guess.
//!
//! Strings read back from storage have lost that tag. [`Text::from_stored`]
//! recovers it through the namespace prefix convention ([`KEY_NAMESPACES`]).
//! A literal that happens to start with a reserved prefix is read back as a
//! key; see [`has_key_prefix`].

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Namespace prefixes reserved for translation keys
pub const KEY_NAMESPACES: &[&str] = &[
    "objective.",
    "objectives.",
    "questions.",
    "metrics.",
    "measurements.",
    "entities.",
    "units.",
    "scales.",
    "analysis.",
];

/// Check whether a raw string follows the translation key convention
///
/// True when the string starts with one of [`KEY_NAMESPACES`] and has a
/// non-empty remainder after it.
#[inline]
#[must_use]
pub fn has_key_prefix(raw: &str) -> bool {
    KEY_NAMESPACES
        .iter()
        .any(|ns| raw.len() > ns.len() && raw.starts_with(ns))
}

/// Key into the translation bundle
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TranslationKey(String);

impl TranslationKey {
    /// Parse a key, rejecting strings outside the reserved namespaces
    ///
    /// # Errors
    /// - `ModelError::InvalidKey` if the string has no recognized prefix
    pub fn parse(raw: impl Into<String>) -> Result<Self, ModelError> {
        let raw = raw.into();
        if has_key_prefix(&raw) {
            Ok(Self(raw))
        } else {
            Err(ModelError::InvalidKey(raw))
        }
    }

    /// Key from a compile-time constant
    ///
    /// Catalog tables use this for their literal key strings.
    #[inline]
    #[must_use]
    pub fn from_static(raw: &'static str) -> Self {
        debug_assert!(has_key_prefix(raw), "catalog key without namespace: {raw}");
        Self(raw.to_string())
    }

    /// Raw key
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace the key belongs to, without the trailing dot
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }
}

impl Display for TranslationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TranslationKey {
    type Error = ModelError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl From<TranslationKey> for String {
    fn from(key: TranslationKey) -> Self {
        key.0
    }
}

impl FromStr for TranslationKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Text field value: a translation key or literal display text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Text {
    /// Lookup key, resolved through a translator
    Key(TranslationKey),
    /// Literal text typed by a user
    Literal(String),
}

impl Text {
    /// Literal text
    #[inline]
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Recover the tag of a string read back from storage
    #[must_use]
    pub fn from_stored(raw: &str) -> Self {
        match TranslationKey::parse(raw) {
            Ok(key) => Self::Key(key),
            Err(_) => Self::Literal(raw.to_string()),
        }
    }

    /// Check if this is a translation key
    #[inline]
    #[must_use]
    pub fn is_key(&self) -> bool {
        matches!(self, Self::Key(_))
    }

    /// Raw string: the key itself or the literal text
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Key(key) => key.as_str(),
            Self::Literal(text) => text,
        }
    }

    /// Blank literal (keys are never blank)
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Key(_) => false,
            Self::Literal(text) => text.trim().is_empty(),
        }
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::Literal(String::new())
    }
}

impl Display for Text {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

impl From<TranslationKey> for Text {
    fn from(key: TranslationKey) -> Self {
        Self::Key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_detection() {
        assert!(has_key_prefix("metrics.leadTime.name"));
        assert!(has_key_prefix("measurements.properties.startDate"));
        assert!(has_key_prefix("objective.improveQuality"));
        assert!(!has_key_prefix("metrics."));
        assert!(!has_key_prefix("What is our defect rate?"));
        assert!(!has_key_prefix("metric.leadTime"));
    }

    #[test]
    fn key_parse_rejects_literals() {
        assert!(TranslationKey::parse("units.days").is_ok());
        assert_eq!(
            TranslationKey::parse("days"),
            Err(ModelError::InvalidKey("days".to_string()))
        );
    }

    #[test]
    fn key_namespace() {
        let key = TranslationKey::from_static("measurements.properties.startDate");
        assert_eq!(key.namespace(), "measurements");
    }

    #[test]
    fn from_stored_recovers_tag() {
        assert!(Text::from_stored("questions.defectRate").is_key());
        assert_eq!(
            Text::from_stored("Lead Time"),
            Text::Literal("Lead Time".to_string())
        );
    }

    #[test]
    fn blank_detection() {
        assert!(Text::literal("   ").is_blank());
        assert!(!Text::literal("x").is_blank());
        assert!(!Text::Key(TranslationKey::from_static("units.days")).is_blank());
    }

    #[test]
    fn text_serde_is_tagged() {
        let text = Text::Key(TranslationKey::from_static("units.days"));
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "key", "value": "units.days"}));

        let back: Text = serde_json::from_value(json).unwrap();
        assert_eq!(back, text);

        let bad = serde_json::json!({"kind": "key", "value": "days"});
        assert!(serde_json::from_value::<Text>(bad).is_err());
    }
}
