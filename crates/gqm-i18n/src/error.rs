//! Error types for translation bundles

use std::path::PathBuf;

/// Failure to load a translation bundle
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// Bundle file could not be read
    #[error("failed to read bundle {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML syntax error
    #[error("invalid YAML bundle: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON syntax error
    #[error("invalid JSON bundle: {0}")]
    Json(#[from] serde_json::Error),

    /// Top level is not a mapping
    #[error("bundle root must be a mapping of keys to strings")]
    NotAMapping,

    /// Unsupported file extension
    #[error("unsupported bundle format: {0}")]
    UnsupportedFormat(String),
}
