//! GQM Core - plan authoring workflow
//!
//! Provides:
//! - The creation wizard as a pure reducer over [`WizardState`]
//!   ([`transition`]) plus a [`PlanWizard`] session that wires it to the
//!   template catalog, the node editors and the project collaborator
//! - The finalization pipeline ([`Finalizer`]): resolve, validate, persist once
//! - The [`ContentManager`] for editing persisted plans node by node
//! - Collaborator ports ([`PlanStore`], [`ProjectDirectory`]) and an
//!   in-memory store adapter
//! - Configuration ([`PlannerConfig`]) and the error taxonomy
//!
//! # Example
//!
//! ```rust
//! use gqm_core::{transition, WizardAction, WizardState, WizardStep};
//! use gqm_model::{PlanBasics, ProjectRef};
//!
//! let basics = PlanBasics::new("Q1 Plan", ProjectRef::new("proj-1", "Atlas"), "Ana");
//! let state = transition(&WizardState::default(), WizardAction::SetBasics(basics)).unwrap();
//! assert!(state.can_navigate_to(WizardStep::Objectives));
//! assert!(!state.can_navigate_to(WizardStep::Questions));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod checks;
pub mod config;
pub mod content;
pub mod error;
pub mod finalize;
pub mod path;
pub mod store;
pub mod wizard;

pub use config::{Completeness, LogFormat, LoggingConfig, PlannerConfig};
pub use content::{ContentManager, TreeRow, TreeView};
pub use error::{ConfigError, ContentError, StoreError, SubmissionError, WizardError};
pub use finalize::{validate_payload, FinalizeIssue, Finalizer};
pub use path::NodePath;
pub use store::{InMemoryPlanStore, PlanStore, ProjectDirectory, StaticProjectDirectory};
pub use wizard::{
    transition, OutlineLine, PlanWizard, ReviewSummary, StepStatus, SubmissionStatus,
    WizardAction, WizardState, WizardStep,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the wizard and the content manager
    pub use crate::{
        ContentManager, Finalizer, NodePath, PlanStore, PlanWizard, PlannerConfig, WizardAction,
        WizardState, WizardStep,
    };
    pub use gqm_editors::NodeEditor;
    pub use gqm_model::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
