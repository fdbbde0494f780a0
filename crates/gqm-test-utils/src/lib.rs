//! Testing utilities for the GQM planner workspace
//!
//! Shared fixtures and collaborator doubles.

#![allow(missing_docs)]

use async_trait::async_trait;
use gqm_catalog::english_bundle;
use gqm_core::{InMemoryPlanStore, PlanStore, StoreError, WizardAction, WizardState, WizardStep};
use gqm_i18n::{MapTranslator, Translator};
use gqm_model::{
    MeasurementDraft, MeasurementId, MeasurementPayload, MeasurementScale, MetricDraft, MetricId,
    MetricPayload, ObjectiveDraft, ObjectiveId, ObjectivePayload, Plan, PlanBasics, PlanId,
    PlanPayload, ProjectRef, QuestionDraft, QuestionId, QuestionPayload, Text, TranslationKey,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Persistence operations, for call recording and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    CreatePlan,
    GetPlan,
    AddObjective,
    UpdateObjective,
    DeleteObjective,
    AddQuestion,
    UpdateQuestion,
    DeleteQuestion,
    AddMetric,
    UpdateMetric,
    DeleteMetric,
    AddMeasurement,
    UpdateMeasurement,
    DeleteMeasurement,
}

/// In-memory store that records every call and fails on demand
#[derive(Debug, Default)]
pub struct RecordingPlanStore {
    inner: InMemoryPlanStore,
    calls: Mutex<Vec<StoreOp>>,
    faults: Mutex<HashMap<StoreOp, StoreError>>,
    fail_all: Mutex<Option<StoreError>>,
}

impl RecordingPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store rejecting every request with `error`
    pub fn failing(error: StoreError) -> Self {
        let store = Self::default();
        *store.fail_all.lock() = Some(error);
        store
    }

    /// Make `op` fail with `error` from now on
    pub fn fail_on(&self, op: StoreOp, error: StoreError) {
        self.faults.lock().insert(op, error);
    }

    pub fn heal(&self) {
        self.faults.lock().clear();
        *self.fail_all.lock() = None;
    }

    pub fn calls(&self) -> Vec<StoreOp> {
        self.calls.lock().clone()
    }

    pub fn count(&self, op: StoreOp) -> usize {
        self.calls.lock().iter().filter(|c| **c == op).count()
    }

    pub fn inner(&self) -> &InMemoryPlanStore {
        &self.inner
    }

    fn enter(&self, op: StoreOp) -> Result<(), StoreError> {
        self.calls.lock().push(op);
        if let Some(error) = self.fail_all.lock().clone() {
            return Err(error);
        }
        match self.faults.lock().get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlanStore for RecordingPlanStore {
    async fn create_plan(&self, plan: PlanPayload) -> Result<Plan, StoreError> {
        self.enter(StoreOp::CreatePlan)?;
        self.inner.create_plan(plan).await
    }

    async fn get_plan(&self, plan_id: &PlanId) -> Result<Plan, StoreError> {
        self.enter(StoreOp::GetPlan)?;
        self.inner.get_plan(plan_id).await
    }

    async fn add_objective(&self, p: &PlanId, o: ObjectivePayload) -> Result<Plan, StoreError> {
        self.enter(StoreOp::AddObjective)?;
        self.inner.add_objective(p, o).await
    }

    async fn update_objective(
        &self,
        p: &PlanId,
        id: &ObjectiveId,
        o: ObjectivePayload,
    ) -> Result<Plan, StoreError> {
        self.enter(StoreOp::UpdateObjective)?;
        self.inner.update_objective(p, id, o).await
    }

    async fn delete_objective(&self, p: &PlanId, id: &ObjectiveId) -> Result<Plan, StoreError> {
        self.enter(StoreOp::DeleteObjective)?;
        self.inner.delete_objective(p, id).await
    }

    async fn add_question(
        &self,
        p: &PlanId,
        o: &ObjectiveId,
        q: QuestionPayload,
    ) -> Result<Plan, StoreError> {
        self.enter(StoreOp::AddQuestion)?;
        self.inner.add_question(p, o, q).await
    }

    async fn update_question(
        &self,
        p: &PlanId,
        o: &ObjectiveId,
        id: &QuestionId,
        q: QuestionPayload,
    ) -> Result<Plan, StoreError> {
        self.enter(StoreOp::UpdateQuestion)?;
        self.inner.update_question(p, o, id, q).await
    }

    async fn delete_question(
        &self,
        p: &PlanId,
        o: &ObjectiveId,
        id: &QuestionId,
    ) -> Result<Plan, StoreError> {
        self.enter(StoreOp::DeleteQuestion)?;
        self.inner.delete_question(p, o, id).await
    }

    async fn add_metric(
        &self,
        p: &PlanId,
        o: &ObjectiveId,
        q: &QuestionId,
        m: MetricPayload,
    ) -> Result<Plan, StoreError> {
        self.enter(StoreOp::AddMetric)?;
        self.inner.add_metric(p, o, q, m).await
    }

    async fn update_metric(
        &self,
        p: &PlanId,
        o: &ObjectiveId,
        q: &QuestionId,
        id: &MetricId,
        m: MetricPayload,
    ) -> Result<Plan, StoreError> {
        self.enter(StoreOp::UpdateMetric)?;
        self.inner.update_metric(p, o, q, id, m).await
    }

    async fn delete_metric(
        &self,
        p: &PlanId,
        o: &ObjectiveId,
        q: &QuestionId,
        id: &MetricId,
    ) -> Result<Plan, StoreError> {
        self.enter(StoreOp::DeleteMetric)?;
        self.inner.delete_metric(p, o, q, id).await
    }

    async fn add_measurement(
        &self,
        p: &PlanId,
        o: &ObjectiveId,
        q: &QuestionId,
        m: &MetricId,
        s: MeasurementPayload,
    ) -> Result<Plan, StoreError> {
        self.enter(StoreOp::AddMeasurement)?;
        self.inner.add_measurement(p, o, q, m, s).await
    }

    async fn update_measurement(
        &self,
        p: &PlanId,
        o: &ObjectiveId,
        q: &QuestionId,
        m: &MetricId,
        id: &MeasurementId,
        s: MeasurementPayload,
    ) -> Result<Plan, StoreError> {
        self.enter(StoreOp::UpdateMeasurement)?;
        self.inner.update_measurement(p, o, q, m, id, s).await
    }

    async fn delete_measurement(
        &self,
        p: &PlanId,
        o: &ObjectiveId,
        q: &QuestionId,
        m: &MetricId,
        id: &MeasurementId,
    ) -> Result<Plan, StoreError> {
        self.enter(StoreOp::DeleteMeasurement)?;
        self.inner.delete_measurement(p, o, q, m, id).await
    }
}

/// Built-in English strings
pub fn english() -> Arc<dyn Translator> {
    Arc::new(english_bundle().unwrap())
}

pub fn english_bundle_map() -> MapTranslator {
    english_bundle().unwrap()
}

pub fn key(raw: &'static str) -> Text {
    Text::Key(TranslationKey::from_static(raw))
}

pub fn basics() -> PlanBasics {
    PlanBasics::new("Q1 Plan", ProjectRef::new("proj-1", "Atlas"), "Ana")
}

/// Complete custom measurement
pub fn measurement(acronym: &str) -> MeasurementDraft {
    MeasurementDraft {
        properties: Text::literal("Timestamp"),
        unit: Text::literal("date"),
        scale: MeasurementScale::Continuous,
        procedure: Text::literal("Read from the tracker"),
        frequency: Text::literal("Daily"),
        ..MeasurementDraft::new(Text::literal("Work item"), acronym)
    }
}

/// Complete custom metric with one measurement per acronym
pub fn metric(name: &str, acronyms: &[&str]) -> MetricDraft {
    acronyms.iter().fold(
        MetricDraft::new(Text::literal(name), Text::literal("desc"), "LDT", "end-start"),
        |metric, acronym| metric.with_measurement(measurement(acronym)),
    )
}

/// Objective `objective.improveQuality` with one custom question and metric
pub fn quality_objective() -> ObjectiveDraft {
    ObjectiveDraft::new(key("objective.improveQuality")).with_question(
        QuestionDraft::new(Text::literal("What is our defect rate?"))
            .with_metric(metric("Lead Time", &["SDT", "EDT"])),
    )
}

/// Wizard sitting at the review step with a complete draft
pub fn review_ready_state() -> WizardState {
    let mut state = WizardState::default();
    state.apply(WizardAction::SetBasics(basics())).unwrap();
    state
        .apply(WizardAction::AddObjective(quality_objective()))
        .unwrap();
    state.apply(WizardAction::GoTo(WizardStep::Review)).unwrap();
    state
}

/// Plan persisted in `store` from the review-ready draft, keys resolved
pub async fn seeded_plan(store: &dyn PlanStore) -> Plan {
    use gqm_i18n::Resolve;
    let translator = english_bundle_map();
    let payload = review_ready_state()
        .draft()
        .unwrap()
        .resolve(&translator);
    store.create_plan(payload).await.unwrap()
}
