//! GQM Editors - per-level create/edit forms
//!
//! Every editor follows the same lifecycle:
//! 1. `open(editing)` starts a session, optionally prefilled from an
//!    existing node
//! 2. the user either picks a catalog entry (predefined mode) or fills in a
//!    free-text form (custom mode)
//! 3. `create()` returns the finished draft and closes the editor, or
//!    returns the field issues that keep it disabled
//! 4. `cancel()` discards everything typed so far
//!
//! The metric editor is a two-step sub-wizard (scalar fields, then at least
//! one measurement through a nested [`MeasurementEditor`]).

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod measurement;
pub mod metric;
pub mod mode;
pub mod titled;

pub use error::EditorError;
pub use measurement::MeasurementEditor;
pub use metric::{MetricEditor, MetricStep};
pub use mode::{EditorMode, Picker};
pub use titled::{ObjectiveEditor, QuestionEditor, TitledDraft, TitledEditor};

/// Common surface of the node editors
pub trait NodeEditor {
    /// Draft produced on success
    type Output;

    /// Current mode
    fn mode(&self) -> EditorMode;

    /// Whether the editor has an active session
    fn is_open(&self) -> bool;

    /// Whether `create` would currently succeed
    fn can_create(&self) -> bool;

    /// Emit the finished draft and close
    ///
    /// # Errors
    /// - `EditorError::Closed` without an open session
    /// - `EditorError::Invalid` with the blocking field issues
    fn create(&mut self) -> Result<Self::Output, EditorError>;

    /// Discard the session
    fn cancel(&mut self);
}
