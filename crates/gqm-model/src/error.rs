//! Error types for the plan model

/// Errors raised while constructing model values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// String does not carry a recognized namespace prefix
    #[error("not a translation key: {0:?}")]
    InvalidKey(String),

    /// Unknown measurement scale
    #[error("unknown measurement scale: {0:?}")]
    InvalidScale(String),

    /// Control range with min above max or non-finite bounds
    #[error("invalid control range: [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },
}
