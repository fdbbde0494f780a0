//! Content manager for persisted plans
//!
//! Every mutation is one request to the persistence collaborator, addressed
//! by the ancestor id chain of the node. The manager applies nothing
//! locally: it replaces its plan with the one the collaborator returns. A
//! failed request is logged, recorded as a banner and leaves the plan as it
//! was.
//!
//! Node data arrives as drafts (from the node editors) and is resolved to
//! literal text before it is sent. Field checks, including measurement
//! acronym uniqueness, run before any request.
//!
//! Deletes go through a confirmation: [`ContentManager::request_delete`],
//! then [`ContentManager::confirm_delete`] or
//! [`ContentManager::cancel_delete`].

mod tree;

pub use tree::{TreeRow, TreeView};

use crate::checks;
use crate::error::{ContentError, StoreError};
use crate::path::NodePath;
use crate::store::PlanStore;
use gqm_catalog::Catalog;
use gqm_editors::{MeasurementEditor, MetricEditor, ObjectiveEditor, QuestionEditor};
use gqm_i18n::{resolve_display, resolve_display_str, Resolve, Translator};
use gqm_model::validation::acronym_taken;
use gqm_model::{
    Field, FieldErrors, FieldIssue, FieldLimits, MeasurementDraft, MeasurementId, Metric,
    MetricDraft, MetricId, Objective, ObjectiveDraft, ObjectiveId, Plan, PlanId, PlanPayload,
    Question, QuestionDraft, QuestionId, Text,
};
use std::fmt::{self, Formatter};
use std::sync::Arc;

/// Editor of one persisted plan
pub struct ContentManager {
    plan: Plan,
    store: Arc<dyn PlanStore>,
    translator: Arc<dyn Translator>,
    limits: FieldLimits,
    tree: TreeView,
    pending_delete: Option<NodePath>,
    banner: Option<String>,
}

impl std::fmt::Debug for ContentManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentManager")
            .field("plan_id", &self.plan.id)
            .field("pending_delete", &self.pending_delete)
            .field("banner", &self.banner)
            .finish_non_exhaustive()
    }
}

impl ContentManager {
    #[must_use]
    pub fn new(plan: Plan, store: Arc<dyn PlanStore>, translator: Arc<dyn Translator>) -> Self {
        Self {
            plan,
            store,
            translator,
            limits: FieldLimits::default(),
            tree: TreeView::new(),
            pending_delete: None,
            banner: None,
        }
    }

    /// Load `plan_id` from the collaborator
    ///
    /// # Errors
    /// Returns the collaborator's error if the plan cannot be fetched.
    pub async fn open(
        plan_id: &PlanId,
        store: Arc<dyn PlanStore>,
        translator: Arc<dyn Translator>,
    ) -> Result<Self, StoreError> {
        let plan = store.get_plan(plan_id).await?;
        Ok(Self::new(plan, store, translator))
    }

    #[inline]
    #[must_use]
    pub fn with_limits(mut self, limits: FieldLimits) -> Self {
        self.limits = limits;
        self
    }

    #[inline]
    #[must_use]
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Message of the last failed request, if not cleared since
    #[inline]
    #[must_use]
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    #[inline]
    #[must_use]
    pub fn tree(&self) -> &TreeView {
        &self.tree
    }

    /// Expansion state; changing it never contacts the collaborator
    #[inline]
    pub fn tree_mut(&mut self) -> &mut TreeView {
        &mut self.tree
    }

    /// Visible rows with resolved labels
    #[must_use]
    pub fn rows(&self) -> Vec<TreeRow> {
        self.tree.rows(&self.plan, self.translator.as_ref())
    }

    /// Display text of a stored string
    #[must_use]
    pub fn display(&self, value: &str) -> String {
        resolve_display_str(value, self.translator.as_ref())
    }

    /// Re-fetch the plan
    ///
    /// # Errors
    /// `ContentError::Store` if the collaborator fails; the plan is kept.
    pub async fn refresh(&mut self) -> Result<(), ContentError> {
        let result = self.store.get_plan(&self.plan.id).await;
        self.settle("reload the plan", result)
    }

    /// Adopt the collaborator's answer or record its failure
    fn settle(&mut self, action: &str, result: Result<Plan, StoreError>) -> Result<(), ContentError> {
        match result {
            Ok(plan) => {
                tracing::info!(plan_id = %plan.id, action, "plan updated");
                self.plan = plan;
                self.tree.retain_existing(&self.plan);
                if let Some(path) = &self.pending_delete {
                    if !path.exists_in(&self.plan) {
                        self.pending_delete = None;
                    }
                }
                self.banner = None;
                Ok(())
            }
            Err(e) => {
                tracing::error!(plan_id = %self.plan.id, action, error = %e, "plan update failed");
                self.banner = Some(format!("Could not {action}: {e}"));
                Err(e.into())
            }
        }
    }

    fn objective(&self, id: &ObjectiveId) -> Result<&Objective, ContentError> {
        self.plan
            .objective(id)
            .ok_or_else(|| ContentError::NotFound(format!("objective {id}")))
    }

    fn question(&self, objective_id: &ObjectiveId, id: &QuestionId) -> Result<&Question, ContentError> {
        self.plan
            .question(objective_id, id)
            .ok_or_else(|| ContentError::NotFound(format!("question {objective_id}/{id}")))
    }

    fn metric(
        &self,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        id: &MetricId,
    ) -> Result<&Metric, ContentError> {
        self.plan
            .metric(objective_id, question_id, id)
            .ok_or_else(|| {
                ContentError::NotFound(format!("metric {objective_id}/{question_id}/{id}"))
            })
    }

    fn reject(errors: FieldErrors) -> Result<(), ContentError> {
        if errors.is_empty() {
            Ok(())
        } else {
            tracing::warn!(%errors, "request blocked by validation");
            Err(ContentError::Invalid(errors))
        }
    }

    // Objectives

    /// # Errors
    /// `Invalid` before any request, `Store` if the collaborator fails.
    pub async fn add_objective(&mut self, data: &ObjectiveDraft) -> Result<(), ContentError> {
        let payload = data.resolve(self.translator.as_ref());
        let mut errors = checks::objective_fields(&payload, &self.limits);
        let siblings = self.plan.objectives.iter().map(|o| o.objective_title.as_str());
        errors.extend(checks::duplicate_name(
            Field::ObjectiveTitle,
            &payload.objective_title,
            siblings,
        ));
        Self::reject(errors)?;

        let result = self.store.add_objective(&self.plan.id, payload).await;
        self.settle("add the objective", result)
    }

    /// Replace the objective's title; its questions are kept
    ///
    /// # Errors
    /// `NotFound` for an unknown id, `Invalid` before any request, `Store`
    /// if the collaborator fails.
    pub async fn update_objective(
        &mut self,
        id: &ObjectiveId,
        data: &ObjectiveDraft,
    ) -> Result<(), ContentError> {
        self.objective(id)?;
        let payload = data.resolve(self.translator.as_ref());
        let mut errors = checks::objective_fields(&payload, &self.limits);
        let siblings = self
            .plan
            .objectives
            .iter()
            .filter(|o| &o.id != id)
            .map(|o| o.objective_title.as_str());
        errors.extend(checks::duplicate_name(
            Field::ObjectiveTitle,
            &payload.objective_title,
            siblings,
        ));
        Self::reject(errors)?;

        let result = self.store.update_objective(&self.plan.id, id, payload).await;
        self.settle("update the objective", result)
    }

    /// Delete without confirmation; prefer [`Self::request_delete`]
    ///
    /// # Errors
    /// `NotFound` for an unknown id, `Store` if the collaborator fails.
    pub async fn delete_objective(&mut self, id: &ObjectiveId) -> Result<(), ContentError> {
        self.objective(id)?;
        let result = self.store.delete_objective(&self.plan.id, id).await;
        self.settle("delete the objective", result)
    }

    // Questions

    /// # Errors
    /// `NotFound` for an unknown parent, `Invalid` before any request,
    /// `Store` if the collaborator fails.
    pub async fn add_question(
        &mut self,
        objective_id: &ObjectiveId,
        data: &QuestionDraft,
    ) -> Result<(), ContentError> {
        let parent = self.objective(objective_id)?;
        let payload = data.resolve(self.translator.as_ref());
        let mut errors = checks::question_fields(&payload, &self.limits);
        errors.extend(checks::duplicate_name(
            Field::QuestionText,
            &payload.question_text,
            parent.questions.iter().map(|q| q.question_text.as_str()),
        ));
        Self::reject(errors)?;

        let result = self
            .store
            .add_question(&self.plan.id, objective_id, payload)
            .await;
        self.settle("add the question", result)
    }

    /// Replace the question's text; its metrics are kept
    ///
    /// # Errors
    /// `NotFound` for an unknown id, `Invalid` before any request, `Store`
    /// if the collaborator fails.
    pub async fn update_question(
        &mut self,
        objective_id: &ObjectiveId,
        id: &QuestionId,
        data: &QuestionDraft,
    ) -> Result<(), ContentError> {
        self.question(objective_id, id)?;
        let parent = self.objective(objective_id)?;
        let payload = data.resolve(self.translator.as_ref());
        let mut errors = checks::question_fields(&payload, &self.limits);
        errors.extend(checks::duplicate_name(
            Field::QuestionText,
            &payload.question_text,
            parent
                .questions
                .iter()
                .filter(|q| &q.id != id)
                .map(|q| q.question_text.as_str()),
        ));
        Self::reject(errors)?;

        let result = self
            .store
            .update_question(&self.plan.id, objective_id, id, payload)
            .await;
        self.settle("update the question", result)
    }

    /// # Errors
    /// `NotFound` for an unknown id, `Store` if the collaborator fails.
    pub async fn delete_question(
        &mut self,
        objective_id: &ObjectiveId,
        id: &QuestionId,
    ) -> Result<(), ContentError> {
        self.question(objective_id, id)?;
        let result = self
            .store
            .delete_question(&self.plan.id, objective_id, id)
            .await;
        self.settle("delete the question", result)
    }

    // Metrics

    /// Add a metric together with its measurements
    ///
    /// # Errors
    /// `NotFound` for an unknown parent, `Invalid` before any request,
    /// `Store` if the collaborator fails.
    pub async fn add_metric(
        &mut self,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        data: &MetricDraft,
    ) -> Result<(), ContentError> {
        let parent = self.question(objective_id, question_id)?;
        let payload = data.resolve(self.translator.as_ref());
        let mut errors = checks::metric_fields(&payload, &self.limits);
        errors.extend(checks::metric_measurements(&payload));
        for m in &payload.measurements {
            errors.extend(checks::measurement_fields(m, &self.limits));
        }
        errors.extend(checks::duplicate_name(
            Field::MetricName,
            &payload.metric_name,
            parent.metrics.iter().map(|m| m.metric_name.as_str()),
        ));
        Self::reject(errors)?;

        let result = self
            .store
            .add_metric(&self.plan.id, objective_id, question_id, payload)
            .await;
        self.settle("add the metric", result)
    }

    /// Replace the metric together with its measurements
    ///
    /// The measurement list in `data` is the new list, as edited in the
    /// metric editor's second step.
    ///
    /// # Errors
    /// `NotFound` for an unknown id, `Invalid` before any request, `Store`
    /// if the collaborator fails.
    pub async fn update_metric(
        &mut self,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        id: &MetricId,
        data: &MetricDraft,
    ) -> Result<(), ContentError> {
        self.metric(objective_id, question_id, id)?;
        let parent = self.question(objective_id, question_id)?;
        let payload = data.resolve(self.translator.as_ref());
        let mut errors = checks::metric_fields(&payload, &self.limits);
        errors.extend(checks::metric_measurements(&payload));
        for m in &payload.measurements {
            errors.extend(checks::measurement_fields(m, &self.limits));
        }
        errors.extend(checks::duplicate_name(
            Field::MetricName,
            &payload.metric_name,
            parent
                .metrics
                .iter()
                .filter(|m| &m.id != id)
                .map(|m| m.metric_name.as_str()),
        ));
        Self::reject(errors)?;

        let result = self
            .store
            .update_metric(&self.plan.id, objective_id, question_id, id, payload)
            .await;
        self.settle("update the metric", result)
    }

    /// # Errors
    /// `NotFound` for an unknown id, `Store` if the collaborator fails.
    pub async fn delete_metric(
        &mut self,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        id: &MetricId,
    ) -> Result<(), ContentError> {
        self.metric(objective_id, question_id, id)?;
        let result = self
            .store
            .delete_metric(&self.plan.id, objective_id, question_id, id)
            .await;
        self.settle("delete the metric", result)
    }

    // Measurements

    fn check_measurement(
        &self,
        metric: &Metric,
        data: &MeasurementDraft,
        own: Option<&MeasurementId>,
    ) -> Result<gqm_model::MeasurementPayload, ContentError> {
        let payload = data.resolve(self.translator.as_ref());
        let mut errors = checks::measurement_fields(&payload, &self.limits);
        let siblings = metric
            .measurements
            .iter()
            .filter(|m| Some(&m.id) != own)
            .map(|m| m.measurement_acronym.as_str());
        if acronym_taken(siblings, &payload.measurement_acronym, None) {
            errors.add(
                Field::MeasurementAcronym,
                FieldIssue::DuplicateAcronym {
                    acronym: payload.measurement_acronym.clone(),
                },
            );
        }
        Self::reject(errors)?;
        Ok(payload)
    }

    /// # Errors
    /// `NotFound` for an unknown parent, `Invalid` (including a duplicate
    /// acronym) before any request, `Store` if the collaborator fails.
    pub async fn add_measurement(
        &mut self,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
        data: &MeasurementDraft,
    ) -> Result<(), ContentError> {
        let metric = self.metric(objective_id, question_id, metric_id)?;
        let payload = self.check_measurement(metric, data, None)?;

        let result = self
            .store
            .add_measurement(&self.plan.id, objective_id, question_id, metric_id, payload)
            .await;
        self.settle("add the measurement", result)
    }

    /// # Errors
    /// `NotFound` for an unknown id, `Invalid` before any request, `Store`
    /// if the collaborator fails.
    pub async fn update_measurement(
        &mut self,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
        id: &MeasurementId,
        data: &MeasurementDraft,
    ) -> Result<(), ContentError> {
        let metric = self.metric(objective_id, question_id, metric_id)?;
        if metric.measurement(id).is_none() {
            return Err(ContentError::NotFound(format!("measurement {id}")));
        }
        let payload = self.check_measurement(metric, data, Some(id))?;

        let result = self
            .store
            .update_measurement(&self.plan.id, objective_id, question_id, metric_id, id, payload)
            .await;
        self.settle("update the measurement", result)
    }

    /// # Errors
    /// `NotFound` for an unknown id, `Store` if the collaborator fails.
    pub async fn delete_measurement(
        &mut self,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
        id: &MeasurementId,
    ) -> Result<(), ContentError> {
        let metric = self.metric(objective_id, question_id, metric_id)?;
        if metric.measurement(id).is_none() {
            return Err(ContentError::NotFound(format!("measurement {id}")));
        }
        let result = self
            .store
            .delete_measurement(&self.plan.id, objective_id, question_id, metric_id, id)
            .await;
        self.settle("delete the measurement", result)
    }

    // Delete confirmation

    /// Ask for confirmation before deleting `path`
    ///
    /// Replaces any earlier pending request.
    ///
    /// # Errors
    /// `NotFound` if the node is not in the plan.
    pub fn request_delete(&mut self, path: NodePath) -> Result<(), ContentError> {
        if !path.exists_in(&self.plan) {
            return Err(ContentError::NotFound(path.to_string()));
        }
        tracing::debug!(target_node = %path, "delete requested");
        self.pending_delete = Some(path);
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn pending_delete(&self) -> Option<&NodePath> {
        self.pending_delete.as_ref()
    }

    /// Drop the pending request; nothing is sent
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Issue the pending delete
    ///
    /// The pending request is cleared whatever the outcome.
    ///
    /// # Errors
    /// `NoPendingDelete` without a request; otherwise as the matching
    /// `delete_*` call.
    pub async fn confirm_delete(&mut self) -> Result<(), ContentError> {
        let path = self.pending_delete.take().ok_or(ContentError::NoPendingDelete)?;
        match &path {
            NodePath::Objective { objective } => self.delete_objective(objective).await,
            NodePath::Question {
                objective,
                question,
            } => self.delete_question(objective, question).await,
            NodePath::Metric {
                objective,
                question,
                metric,
            } => self.delete_metric(objective, question, metric).await,
            NodePath::Measurement {
                objective,
                question,
                metric,
                measurement,
            } => {
                self.delete_measurement(objective, question, metric, measurement)
                    .await
            }
        }
    }

    // Editors

    /// Stored sibling names, plus the catalog keys they were resolved from
    ///
    /// Persisted nodes keep only the translated text, so a catalog entry
    /// counts as taken when its display text matches a sibling.
    fn already_selected<'a>(
        &self,
        stored: impl IntoIterator<Item = &'a str>,
        options: impl IntoIterator<Item = &'a Text>,
    ) -> Vec<Text> {
        let t = self.translator.as_ref();
        let stored: Vec<&str> = stored.into_iter().map(str::trim).collect();
        let mut selected: Vec<Text> = stored.iter().map(|s| Text::from_stored(s)).collect();
        selected.extend(
            options
                .into_iter()
                .filter(|o| stored.contains(&resolve_display(o, t).trim()))
                .cloned(),
        );
        selected
    }

    /// Objective editor, prefilled from `editing` if given
    ///
    /// # Errors
    /// `NotFound` if `editing` is not in the plan.
    pub fn objective_editor(
        &self,
        catalog: &Catalog,
        editing: Option<&ObjectiveId>,
    ) -> Result<ObjectiveEditor, ContentError> {
        let selected = self.already_selected(
            self.plan.objectives.iter().map(|o| o.objective_title.as_str()),
            catalog.objectives().iter().map(|o| &o.title),
        );
        let mut editor = ObjectiveEditor::new(catalog, selected, self.limits);
        let draft = editing
            .map(|id| self.objective(id).map(ObjectiveDraft::from))
            .transpose()?;
        editor.open(draft.as_ref());
        Ok(editor)
    }

    /// Question editor under `objective_id`, prefilled from `editing`
    ///
    /// # Errors
    /// `NotFound` if the parent or `editing` is not in the plan.
    pub fn question_editor(
        &self,
        catalog: &Catalog,
        objective_id: &ObjectiveId,
        editing: Option<&QuestionId>,
    ) -> Result<QuestionEditor, ContentError> {
        let parent = self.objective(objective_id)?;
        let selected = self.already_selected(
            parent.questions.iter().map(|q| q.question_text.as_str()),
            catalog.questions().iter().map(|q| &q.text),
        );
        let mut editor = QuestionEditor::new(catalog, selected, self.limits);
        let draft = editing
            .map(|id| self.question(objective_id, id).map(QuestionDraft::from))
            .transpose()?;
        editor.open(draft.as_ref());
        Ok(editor)
    }

    /// Metric editor under a question, prefilled from `editing`
    ///
    /// # Errors
    /// `NotFound` if the parent or `editing` is not in the plan.
    pub fn metric_editor(
        &self,
        catalog: &Catalog,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        editing: Option<&MetricId>,
    ) -> Result<MetricEditor, ContentError> {
        let parent = self.question(objective_id, question_id)?;
        let selected = self.already_selected(
            parent.metrics.iter().map(|m| m.metric_name.as_str()),
            catalog.metrics().iter().map(|m| &m.name),
        );
        let mut editor = MetricEditor::new(catalog, selected, self.limits);
        let draft = editing
            .map(|id| self.metric(objective_id, question_id, id).map(MetricDraft::from))
            .transpose()?;
        editor.open(draft.as_ref());
        Ok(editor)
    }

    /// Measurement editor under a metric, aware of the sibling acronyms
    ///
    /// # Errors
    /// `NotFound` if the metric or `editing` is not in the plan.
    pub fn measurement_editor(
        &self,
        catalog: &Catalog,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
        editing: Option<&MeasurementId>,
    ) -> Result<MeasurementEditor, ContentError> {
        let metric = self.metric(objective_id, question_id, metric_id)?;
        let siblings = metric
            .measurements
            .iter()
            .map(|m| m.measurement_acronym.clone())
            .collect();
        let draft = editing
            .map(|id| {
                metric
                    .measurement(id)
                    .map(MeasurementDraft::from)
                    .ok_or_else(|| ContentError::NotFound(format!("measurement {id}")))
            })
            .transpose()?;
        let mut editor = MeasurementEditor::new(catalog, self.limits);
        editor.open(siblings, draft.as_ref());
        Ok(editor)
    }

    // Duplication

    /// Persist a deep copy of the plan under fresh ids
    ///
    /// The manager keeps editing the original.
    ///
    /// # Errors
    /// `Invalid` for a blank or overlong name, `Store` if the collaborator
    /// fails.
    pub async fn duplicate_plan(&mut self, plan_name: Option<&str>) -> Result<Plan, ContentError> {
        let mut payload = PlanPayload::from(&self.plan);
        payload.plan_name = match plan_name {
            Some(name) => name.trim().to_string(),
            None => format!("{} (copy)", self.plan.plan_name),
        };
        let mut errors = FieldErrors::new();
        errors.check_required(Field::PlanName, &payload.plan_name, self.limits.title_max);
        Self::reject(errors)?;

        match self.store.create_plan(payload).await {
            Ok(copy) => {
                tracing::info!(source = %self.plan.id, plan_id = %copy.id, "plan duplicated");
                self.banner = None;
                Ok(copy)
            }
            Err(e) => {
                tracing::error!(plan_id = %self.plan.id, error = %e, "plan duplication failed");
                self.banner = Some(format!("Could not duplicate the plan: {e}"));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockPlanStore;
    use gqm_i18n::MapTranslator;
    use gqm_model::MeasurementScale;

    fn plan() -> Plan {
        serde_json::from_value(serde_json::json!({
            "id": "p1",
            "planName": "Q1",
            "associatedProject": {"id": "proj-1", "name": "Atlas"},
            "planResponsible": "Ana",
            "objectives": [{
                "_id": "o1", "objectiveTitle": "Quality", "questions": [{
                    "_id": "q1", "questionText": "Why?", "metrics": [{
                        "_id": "m1", "metricName": "Lead time", "metricDescription": "d",
                        "metricMnemonic": "LDT", "metricFormula": "e-s",
                        "metricControlRange": [0.0, 10.0],
                        "measurements": [{
                            "_id": "s1", "measurementEntity": "Work item",
                            "measurementAcronym": "LDT", "measurementProperties": "Start",
                            "measurementUnit": "date", "measurementScale": "continuous",
                            "measurementProcedure": "Read", "measurementFrequency": "Daily"
                        }]
                    }]
                }]
            }]
        }))
        .unwrap()
    }

    fn manager(store: MockPlanStore) -> ContentManager {
        ContentManager::new(plan(), Arc::new(store), Arc::new(MapTranslator::new("en")))
    }

    fn measurement(acronym: &str) -> MeasurementDraft {
        MeasurementDraft {
            properties: Text::literal("End"),
            unit: Text::literal("date"),
            scale: MeasurementScale::Continuous,
            procedure: Text::literal("Read"),
            frequency: Text::literal("Daily"),
            ..MeasurementDraft::new(Text::literal("Work item"), acronym)
        }
    }

    #[tokio::test]
    async fn duplicate_acronym_never_reaches_the_store() {
        let mut store = MockPlanStore::new();
        store.expect_add_measurement().never();
        let mut manager = manager(store);

        let err = manager
            .add_measurement(&"o1".into(), &"q1".into(), &"m1".into(), &measurement("ldt"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(manager.banner().is_none());
    }

    #[tokio::test]
    async fn successful_mutation_adopts_returned_plan() {
        let mut store = MockPlanStore::new();
        store
            .expect_update_objective()
            .withf(|plan_id, objective_id, payload| {
                plan_id.as_str() == "p1"
                    && objective_id.as_str() == "o1"
                    && payload.objective_title == "Quality first"
            })
            .times(1)
            .returning(|_, _, payload| {
                let mut updated = plan();
                updated.objectives[0].objective_title = payload.objective_title;
                Ok(updated)
            });
        let mut manager = manager(store);

        manager
            .update_objective(&"o1".into(), &ObjectiveDraft::new(Text::literal("Quality first")))
            .await
            .unwrap();
        assert_eq!(manager.plan().objectives[0].objective_title, "Quality first");
        assert_eq!(manager.plan().objectives[0].questions.len(), 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_refused_locally() {
        let mut store = MockPlanStore::new();
        store.expect_delete_question().never();
        let mut manager = manager(store);
        let err = manager
            .delete_question(&"o1".into(), &"q9".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound(_)));
    }

    #[tokio::test]
    async fn cancelled_delete_sends_nothing() {
        let mut store = MockPlanStore::new();
        store.expect_delete_metric().never();
        let mut manager = manager(store);

        let path = NodePath::metric("o1".into(), "q1".into(), "m1".into());
        manager.request_delete(path.clone()).unwrap();
        assert_eq!(manager.pending_delete(), Some(&path));
        manager.cancel_delete();
        assert!(manager.pending_delete().is_none());
        assert_eq!(
            manager.confirm_delete().await,
            Err(ContentError::NoPendingDelete)
        );
    }

    #[test]
    fn editors_open_prefilled() {
        let manager = manager(MockPlanStore::new());
        let catalog = Catalog::builtin();

        let editor = manager
            .metric_editor(catalog, &"o1".into(), &"q1".into(), Some(&"m1".into()))
            .unwrap();
        assert_eq!(editor.form().name, Text::literal("Lead time"));

        let editor = manager
            .measurement_editor(catalog, &"o1".into(), &"q1".into(), &"m1".into(), None)
            .unwrap();
        assert!(editor
            .predefined_options()
            .iter()
            .all(|m| m.acronym != "LDT"));

        assert!(manager
            .question_editor(catalog, &"o9".into(), None)
            .is_err());
    }
}
