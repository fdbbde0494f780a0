//! Planner configuration
//!
//! ```toml
//! locale_bundle = "locales/pt.yaml"
//!
//! [limits]
//! title_max = 120
//!
//! [completeness]
//! require_metric_per_question = false
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```
//!
//! Every table and key is optional.

use crate::error::ConfigError;
use gqm_model::FieldLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub limits: FieldLimits,
    pub completeness: Completeness,
    /// Translation bundle used instead of the built-in English strings
    pub locale_bundle: Option<PathBuf>,
    pub logging: LoggingConfig,
}

/// Structural checks applied at finalize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Completeness {
    pub require_question_per_objective: bool,
    pub require_metric_per_question: bool,
    pub require_measurement_per_metric: bool,
}

impl Default for Completeness {
    fn default() -> Self {
        Self {
            require_question_per_objective: true,
            require_metric_per_question: true,
            require_measurement_per_metric: true,
        }
    }
}

impl Completeness {
    /// No structural requirement at all
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            require_question_per_objective: false,
            require_metric_per_question: false,
            require_measurement_per_metric: false,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl PlannerConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` on malformed TOML or mistyped values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load from `path`; a missing file yields the defaults
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if the file exists but cannot be read and
    /// `ConfigError::Parse` if it is not valid configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(source) => Self::from_toml_str(&source),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_limits(mut self, limits: FieldLimits) -> Self {
        self.limits = limits;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_completeness(mut self, completeness: Completeness) -> Self {
        self.completeness = completeness;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_locale_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.locale_bundle = Some(path.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.logging.format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(PlannerConfig::from_toml_str("").unwrap(), PlannerConfig::default());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = PlannerConfig::from_toml_str(
            r#"
            [limits]
            title_max = 120

            [completeness]
            require_metric_per_question = false

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.limits.title_max, 120);
        assert_eq!(config.limits.acronym_max, 3);
        assert!(config.completeness.require_question_per_objective);
        assert!(!config.completeness.require_metric_per_question);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn mistyped_value_is_rejected() {
        let err = PlannerConfig::from_toml_str("[limits]\ntitle_max = \"long\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("planner.toml");
        assert_eq!(PlannerConfig::load(&missing).unwrap(), PlannerConfig::default());

        let mut file = std::fs::File::create(&missing).unwrap();
        writeln!(file, "locale_bundle = \"locales/pt.yaml\"").unwrap();
        let config = PlannerConfig::load(&missing).unwrap();
        assert_eq!(config.locale_bundle, Some(PathBuf::from("locales/pt.yaml")));
    }

    #[test]
    fn builders() {
        let config = PlannerConfig::default()
            .with_log_level("debug")
            .with_log_format(LogFormat::Json)
            .with_completeness(Completeness::relaxed());
        assert_eq!(config.logging.level, "debug");
        assert!(!config.completeness.require_measurement_per_metric);
    }
}
