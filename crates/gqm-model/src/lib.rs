//! GQM Model - typed measurement plan hierarchy
//!
//! A measurement plan nests four levels below the plan itself:
//! - Objectives (goals)
//! - Questions, owned by one objective
//! - Metrics, owned by one question
//! - Measurements, owned by one metric
//!
//! The same hierarchy exists in three shapes:
//! - **Drafts** ([`ObjectiveDraft`], ...) live in the creation wizard. They
//!   have no identity and are addressed by their natural key. Their text
//!   fields are [`Text`] values, either a translation key or literal text.
//! - **Payloads** ([`ObjectivePayload`], ...) are the literal-only form that
//!   crosses the persistence boundary.
//! - **Persisted entities** ([`Plan`], [`Objective`], ...) carry ids assigned
//!   by the persistence collaborator and are addressed by those ids.
//!
//! # Example
//!
//! ```rust
//! use gqm_model::{ObjectiveDraft, Text, TranslationKey};
//!
//! let picked = ObjectiveDraft::new(Text::Key(TranslationKey::from_static("objective.improveQuality")));
//! let custom = ObjectiveDraft::new(Text::literal("Ship faster"));
//!
//! assert!(picked.title.is_key());
//! assert!(!custom.title.is_key());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod draft;
pub mod entity;
pub mod error;
pub mod ids;
pub mod limits;
pub mod scale;
pub mod text;
pub mod validation;

pub use draft::{
    GoalFraming, MeasurementDraft, MetricDraft, ObjectiveDraft, PlanBasics, PlanDraft,
    ProjectRef, QuestionDraft,
};
pub use entity::{
    Measurement, MeasurementPayload, Metric, MetricPayload, Objective, ObjectivePayload, Plan,
    PlanPayload, Question, QuestionPayload,
};
pub use error::ModelError;
pub use ids::{MeasurementId, MetricId, ObjectiveId, PlanId, QuestionId};
pub use limits::FieldLimits;
pub use scale::{ControlRange, MeasurementScale};
pub use text::{has_key_prefix, Text, TranslationKey, KEY_NAMESPACES};
pub use validation::{Field, FieldErrors, FieldIssue};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with plan hierarchies
    pub use crate::{
        ControlRange, Field, FieldErrors, FieldIssue, FieldLimits, MeasurementDraft,
        MeasurementScale, MetricDraft, ObjectiveDraft, Plan, PlanBasics, QuestionDraft, Text,
        TranslationKey,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
