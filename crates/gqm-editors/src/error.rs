//! Editor errors

use crate::mode::EditorMode;
use gqm_model::FieldErrors;

/// Why an editor action was refused
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditorError {
    /// No open session
    #[error("editor is not open")]
    Closed,

    /// Action not available in the current mode
    #[error("action requires {expected:?} mode, editor is in {actual:?} mode")]
    WrongMode {
        expected: EditorMode,
        actual: EditorMode,
    },

    /// Catalog option not offered by this editor
    #[error("no such option: {0}")]
    UnknownOption(String),

    /// Index outside the current list
    #[error("no item at index {0}")]
    NoSuchItem(usize),

    /// Form has blocking field issues
    #[error("form is invalid: {0}")]
    Invalid(FieldErrors),
}

impl EditorError {
    /// Field issues carried by an `Invalid` error
    #[inline]
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for EditorError {
    fn from(errors: FieldErrors) -> Self {
        Self::Invalid(errors)
    }
}
