//! Validation and finalization pipeline
//!
//! 1. Resolve every key in the draft to literal text
//! 2. Check lengths, structural completeness and acronym uniqueness on the
//!    resolved tree (a translation may be longer than the key it replaced)
//! 3. Hand the payload to the persistence collaborator, once
//!
//! A second submission while one is in flight, or after one succeeded, is
//! refused without touching the collaborator.

use crate::checks;
use crate::config::{Completeness, PlannerConfig};
use crate::error::SubmissionError;
use crate::store::PlanStore;
use crate::wizard::{SubmissionStatus, WizardState, WizardStep};
use gqm_i18n::{Resolve, Translator};
use gqm_model::{has_key_prefix, Field, FieldErrors, FieldIssue, FieldLimits, Plan, PlanPayload};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// One problem in the resolved tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizeIssue {
    /// Where in the tree, e.g. `objectives[0].questions[1]`
    pub location: String,
    pub field: Field,
    pub issue: FieldIssue,
}

impl Display for FinalizeIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{:?}: {}", self.field, self.issue)
        } else {
            write!(f, "{} {:?}: {}", self.location, self.field, self.issue)
        }
    }
}

fn collect(issues: &mut Vec<FinalizeIssue>, location: &str, errors: FieldErrors) {
    issues.extend(errors.iter().map(|(field, issue)| FinalizeIssue {
        location: location.to_string(),
        field,
        issue: issue.clone(),
    }));
}

fn missing(issues: &mut Vec<FinalizeIssue>, location: String, field: Field) {
    issues.push(FinalizeIssue {
        location,
        field,
        issue: FieldIssue::AtLeastOne,
    });
}

/// Every problem in a resolved plan, in tree order
#[must_use]
pub fn validate_payload(
    plan: &PlanPayload,
    limits: &FieldLimits,
    completeness: &Completeness,
) -> Vec<FinalizeIssue> {
    let mut issues = Vec::new();
    collect(&mut issues, "", checks::plan_fields(plan, limits));
    if plan.objectives.is_empty() {
        missing(&mut issues, String::new(), Field::ObjectiveTitle);
    }

    for (oi, objective) in plan.objectives.iter().enumerate() {
        let at = format!("objectives[{oi}]");
        collect(&mut issues, &at, checks::objective_fields(objective, limits));
        if completeness.require_question_per_objective && objective.questions.is_empty() {
            missing(&mut issues, at.clone(), Field::QuestionText);
        }

        for (qi, question) in objective.questions.iter().enumerate() {
            let at = format!("{at}.questions[{qi}]");
            collect(&mut issues, &at, checks::question_fields(question, limits));
            if completeness.require_metric_per_question && question.metrics.is_empty() {
                missing(&mut issues, at.clone(), Field::MetricName);
            }

            for (mi, metric) in question.metrics.iter().enumerate() {
                let at = format!("{at}.metrics[{mi}]");
                collect(&mut issues, &at, checks::metric_fields(metric, limits));
                let mut children = checks::metric_measurements(metric);
                if !completeness.require_measurement_per_metric {
                    children.clear(Field::Measurements);
                }
                collect(&mut issues, &at, children);

                for (si, m) in metric.measurements.iter().enumerate() {
                    let at = format!("{at}.measurements[{si}]");
                    collect(&mut issues, &at, checks::measurement_fields(m, limits));
                }
            }
        }
    }
    issues
}

/// Runs the finalize pipeline against the persistence collaborator
#[derive(Clone)]
pub struct Finalizer {
    store: Arc<dyn PlanStore>,
    translator: Arc<dyn Translator>,
    limits: FieldLimits,
    completeness: Completeness,
}

impl std::fmt::Debug for Finalizer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Finalizer")
            .field("limits", &self.limits)
            .field("completeness", &self.completeness)
            .finish_non_exhaustive()
    }
}

impl Finalizer {
    #[must_use]
    pub fn new(store: Arc<dyn PlanStore>, translator: Arc<dyn Translator>) -> Self {
        Self {
            store,
            translator,
            limits: FieldLimits::default(),
            completeness: Completeness::default(),
        }
    }

    /// Take limits and completeness rules from `config`
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: &PlannerConfig) -> Self {
        self.limits = config.limits;
        self.completeness = config.completeness;
        self
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

    /// Resolve and validate without submitting
    ///
    /// # Errors
    /// - `SubmissionError::NotReady` before basics are set
    /// - `SubmissionError::Invalid` with every issue found
    pub fn prepare(&self, state: &WizardState) -> Result<PlanPayload, SubmissionError> {
        let draft = state
            .draft()
            .ok_or(SubmissionError::NotReady(state.step()))?;
        let payload = draft.resolve(self.translator.as_ref());

        payload.for_each_text(|value| {
            if has_key_prefix(value) {
                tracing::warn!(value, "key-like text left after resolution");
            }
        });

        let issues = validate_payload(&payload, &self.limits, &self.completeness);
        if issues.is_empty() {
            Ok(payload)
        } else {
            tracing::warn!(count = issues.len(), "finalize blocked by validation");
            Err(SubmissionError::Invalid(issues))
        }
    }

    /// Submit the draft held by `state`
    ///
    /// On success the state is marked submitted and frozen. On collaborator
    /// failure the state records the banner message and the draft stays
    /// editable; nothing is persisted.
    ///
    /// # Errors
    /// - `SubmissionError::AlreadySubmitted` while in flight or after success
    /// - `SubmissionError::NotReady` outside the review step
    /// - `SubmissionError::Invalid` if validation fails
    /// - `SubmissionError::Store` if the collaborator fails
    pub async fn submit(&self, state: &mut WizardState) -> Result<Plan, SubmissionError> {
        if state.submission().is_locked() {
            return Err(SubmissionError::AlreadySubmitted);
        }
        if state.step() != WizardStep::Review || !state.is_unlocked(WizardStep::Review) {
            return Err(SubmissionError::NotReady(state.step()));
        }
        let payload = self.prepare(state)?;

        state.set_submission(SubmissionStatus::Submitting);
        match self.store.create_plan(payload).await {
            Ok(plan) => {
                tracing::info!(plan_id = %plan.id, "plan created");
                state.set_submission(SubmissionStatus::Submitted(plan.id.clone()));
                Ok(plan)
            }
            Err(e) => {
                tracing::error!(error = %e, "plan creation failed");
                state.set_submission(SubmissionStatus::Failed(format!(
                    "The plan could not be saved: {e}"
                )));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MockPlanStore;
    use crate::wizard::WizardAction;
    use gqm_i18n::{IdentityTranslator, MapTranslator};
    use gqm_model::{
        GoalFraming, MeasurementDraft, MetricDraft, ObjectiveDraft, PlanBasics, PlanId,
        ProjectRef, QuestionDraft, Text, TranslationKey,
    };

    fn measurement(acronym: &str) -> MeasurementDraft {
        MeasurementDraft {
            properties: Text::literal("Start"),
            unit: Text::literal("date"),
            procedure: Text::literal("Read tracker"),
            frequency: Text::literal("Daily"),
            ..MeasurementDraft::new(Text::literal("Work item"), acronym)
        }
    }

    fn review_state() -> WizardState {
        let mut state = WizardState::default();
        state
            .apply(WizardAction::SetBasics(PlanBasics::new(
                "Q1 Plan",
                ProjectRef::new("proj-1", "Atlas"),
                "Ana",
            )))
            .unwrap();
        let metric = MetricDraft::new(Text::literal("Lead time"), Text::literal("d"), "LDT", "e-s")
            .with_measurement(measurement("SDT"));
        let objective = ObjectiveDraft::new(Text::Key(TranslationKey::from_static(
            "objective.improveQuality",
        )))
        .with_question(QuestionDraft::new(Text::literal("Why?")).with_metric(metric));
        state.apply(WizardAction::AddObjective(objective)).unwrap();
        state.apply(WizardAction::GoTo(WizardStep::Review)).unwrap();
        state
    }

    fn translator() -> Arc<dyn Translator> {
        Arc::new(MapTranslator::new("en").with("objective.improveQuality", "Improve quality"))
    }

    fn stored(payload: &PlanPayload) -> Plan {
        Plan {
            id: PlanId::new("plan-1"),
            plan_name: payload.plan_name.clone(),
            associated_project: payload.associated_project.clone(),
            plan_responsible: payload.plan_responsible.clone(),
            goal: GoalFraming::default(),
            objectives: Vec::new(),
        }
    }

    #[tokio::test]
    async fn submits_resolved_payload_exactly_once() {
        let mut store = MockPlanStore::new();
        store
            .expect_create_plan()
            .withf(|p| p.objectives[0].objective_title == "Improve quality")
            .times(1)
            .returning(|p| Ok(stored(&p)));
        let finalizer = Finalizer::new(Arc::new(store), translator());

        let mut state = review_state();
        let plan = finalizer.submit(&mut state).await.unwrap();
        assert_eq!(plan.id, PlanId::new("plan-1"));
        assert_eq!(state.submission(), &SubmissionStatus::Submitted(plan.id));

        let again = finalizer.submit(&mut state).await.unwrap_err();
        assert_eq!(again, SubmissionError::AlreadySubmitted);
    }

    #[tokio::test]
    async fn collaborator_failure_records_banner_and_allows_retry() {
        let mut store = MockPlanStore::new();
        let mut calls = 0;
        store.expect_create_plan().times(2).returning(move |p| {
            calls += 1;
            if calls == 1 {
                Err(StoreError::Unavailable("timeout".into()))
            } else {
                Ok(stored(&p))
            }
        });
        let finalizer = Finalizer::new(Arc::new(store), translator());

        let mut state = review_state();
        let err = finalizer.submit(&mut state).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(state.submission(), SubmissionStatus::Failed(msg) if msg.contains("timeout")));

        finalizer.submit(&mut state).await.unwrap();
    }

    #[tokio::test]
    async fn not_ready_outside_review() {
        let mut store = MockPlanStore::new();
        store.expect_create_plan().never();
        let finalizer = Finalizer::new(Arc::new(store), translator());

        let mut state = review_state();
        state.apply(WizardAction::Back).unwrap();
        assert_eq!(
            finalizer.submit(&mut state).await.unwrap_err(),
            SubmissionError::NotReady(WizardStep::Metrics)
        );
    }

    #[test]
    fn length_is_checked_after_resolution() {
        let store = MockPlanStore::new();
        let long = "x".repeat(30);
        let finalizer = Finalizer::new(
            Arc::new(store),
            Arc::new(MapTranslator::new("en").with("objective.improveQuality", long)),
        )
        .with_limits(FieldLimits::default().with_title_max(20));

        let SubmissionError::Invalid(issues) = finalizer.prepare(&review_state()).unwrap_err()
        else {
            panic!("expected validation issues");
        };
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, "objectives[0]");
        assert_eq!(issues[0].issue, FieldIssue::TooLong { max: 20, actual: 30 });
    }

    #[test]
    fn completeness_rules_are_configurable() {
        let payload = PlanPayload {
            plan_name: "Q1".into(),
            associated_project: ProjectRef::new("proj-1", "Atlas"),
            plan_responsible: "Ana".into(),
            goal: GoalFraming::default(),
            objectives: vec![gqm_model::ObjectivePayload {
                objective_title: "Quality".into(),
                questions: vec![],
            }],
        };
        let limits = FieldLimits::default();

        let strict = validate_payload(&payload, &limits, &Completeness::default());
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].field, Field::QuestionText);
        assert_eq!(strict[0].to_string(), "objectives[0] QuestionText: add at least one item");

        assert!(validate_payload(&payload, &limits, &Completeness::relaxed()).is_empty());
    }

    #[test]
    fn identity_translator_leaves_keys_but_still_validates() {
        let finalizer = Finalizer::new(Arc::new(MockPlanStore::new()), Arc::new(IdentityTranslator));
        let payload = finalizer.prepare(&review_state()).unwrap();
        assert_eq!(payload.objectives[0].objective_title, "objective.improveQuality");
    }
}
