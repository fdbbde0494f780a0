//! Error types for GQM Core
//!
//! One enum per concern:
//! - [`StoreError`]: failures reported by the persistence/project collaborators
//! - [`WizardError`]: rejected wizard transitions
//! - [`SubmissionError`]: finalize failures
//! - [`ContentError`]: content manager failures
//! - [`ConfigError`]: configuration loading
//!
//! Field-level validation is not an error path and lives in
//! [`gqm_model::FieldErrors`]; it only appears here wrapped when a caller
//! pushes through a blocked action anyway.

use crate::finalize::FinalizeIssue;
use crate::wizard::WizardStep;
use gqm_model::FieldErrors;
use std::path::PathBuf;

/// Failure reported by a collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Addressed plan or node does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Request was understood and refused
    #[error("rejected: {0}")]
    Rejected(String),

    /// Write conflicts with existing data
    #[error("conflict: {0}")]
    Conflict(String),

    /// Collaborator could not be reached
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether repeating the same request may succeed
    ///
    /// Nothing retries automatically; callers may offer a manual retry.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Rejected wizard transition
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    /// Target step's unlock predicate does not hold
    #[error("step {0} is locked")]
    StepLocked(WizardStep),

    /// Back from the first step
    #[error("already at the first step")]
    AtFirstStep,

    /// Next from the last step
    #[error("already at the last step")]
    AtLastStep,

    /// Natural key does not address a draft node
    #[error("{0} not found in draft")]
    NotFound(String),

    /// Natural key already used by a sibling
    #[error("duplicate {0}")]
    Duplicate(String),

    /// Node data fails field validation
    #[error("invalid data: {0}")]
    Invalid(FieldErrors),

    /// Draft can no longer change once submitted
    #[error("plan already submitted")]
    Submitted,

    /// Project collaborator failed
    #[error("project directory failed: {0}")]
    Collaborator(#[from] StoreError),
}

impl WizardError {
    /// Check if error is a field validation failure
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Invalid(_) | Self::Duplicate(_))
    }
}

/// Finalize failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    /// Submission already in flight or completed
    #[error("plan already submitted")]
    AlreadySubmitted,

    /// Submission happens from the review step only
    #[error("draft not ready for submission: at step {0}")]
    NotReady(WizardStep),

    /// Resolved tree fails structural or length checks
    #[error("draft has {} issue(s)", .0.len())]
    Invalid(Vec<FinalizeIssue>),

    /// Persistence collaborator refused or failed
    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),
}

impl SubmissionError {
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_retryable())
    }
}

/// Content manager failure
///
/// Whatever the variant, the manager's plan is unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContentError {
    /// Persistence collaborator refused or failed
    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),

    /// Node data fails field validation; nothing was sent
    #[error("invalid data: {0}")]
    Invalid(FieldErrors),

    /// Id chain does not address a node of the current plan
    #[error("{0} not found in plan")]
    NotFound(String),

    /// Confirmation without a pending delete request
    #[error("no delete awaiting confirmation")]
    NoPendingDelete,
}

impl ContentError {
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_retryable())
    }
}

impl From<FieldErrors> for ContentError {
    fn from(errors: FieldErrors) -> Self {
        Self::Invalid(errors)
    }
}

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
