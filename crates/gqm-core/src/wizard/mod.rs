//! Plan creation wizard
//!
//! Five steps in a fixed order (basics, objectives, questions, metrics,
//! review). A step can be entered only while its unlock predicate holds:
//! - basics: always
//! - objectives: basics are complete
//! - questions: at least one objective
//! - metrics: at least one question anywhere
//! - review: at least one metric anywhere
//!
//! Predicates are evaluated against the current draft whenever navigation is
//! attempted. Removing nodes never moves the current step back.

mod review;
mod session;
mod state;
mod step;

pub use review::{OutlineLine, ReviewSummary};
pub use session::PlanWizard;
pub use state::{transition, SubmissionStatus, WizardAction, WizardState};
pub use step::{StepStatus, WizardStep};
