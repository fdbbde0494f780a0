//! In-memory collaborator adapters
//!
//! Used by the CLI and by tests. Ids are ULIDs, so two runs never collide
//! and ids sort by creation time.

use super::{PlanStore, ProjectDirectory};
use crate::error::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use gqm_model::validation::{acronym_taken, find_duplicate_acronym, normalize_acronym};
use gqm_model::{
    Measurement, MeasurementId, MeasurementPayload, Metric, MetricId, MetricPayload, Objective,
    ObjectiveId, ObjectivePayload, Plan, PlanId, PlanPayload, ProjectRef, Question, QuestionId,
    QuestionPayload,
};
use std::collections::HashMap;
use ulid::Ulid;

fn fresh_id() -> String {
    Ulid::new().to_string()
}

fn materialize_measurement(p: MeasurementPayload) -> Measurement {
    Measurement {
        id: MeasurementId::new(fresh_id()),
        measurement_entity: p.measurement_entity,
        measurement_acronym: p.measurement_acronym,
        measurement_properties: p.measurement_properties,
        measurement_unit: p.measurement_unit,
        measurement_scale: p.measurement_scale,
        measurement_procedure: p.measurement_procedure,
        measurement_frequency: p.measurement_frequency,
        measurement_responsible: p.measurement_responsible,
    }
}

fn materialize_metric(p: MetricPayload) -> Metric {
    Metric {
        id: MetricId::new(fresh_id()),
        metric_name: p.metric_name,
        metric_description: p.metric_description,
        metric_mnemonic: p.metric_mnemonic,
        metric_formula: p.metric_formula,
        metric_control_range: p.metric_control_range,
        analysis_procedure: p.analysis_procedure,
        analysis_frequency: p.analysis_frequency,
        analysis_responsible: p.analysis_responsible,
        measurements: p
            .measurements
            .into_iter()
            .map(materialize_measurement)
            .collect(),
    }
}

fn materialize_question(p: QuestionPayload) -> Question {
    Question {
        id: QuestionId::new(fresh_id()),
        question_text: p.question_text,
        metrics: p.metrics.into_iter().map(materialize_metric).collect(),
    }
}

fn materialize_objective(p: ObjectivePayload) -> Objective {
    Objective {
        id: ObjectiveId::new(fresh_id()),
        objective_title: p.objective_title,
        questions: p.questions.into_iter().map(materialize_question).collect(),
    }
}

fn not_found(what: &str, id: &impl std::fmt::Display) -> StoreError {
    StoreError::NotFound(format!("{what} {id}"))
}

fn check_metric_acronyms(metric: &MetricPayload) -> Result<(), StoreError> {
    let acronyms = metric
        .measurements
        .iter()
        .map(|m| m.measurement_acronym.as_str());
    match find_duplicate_acronym(acronyms) {
        Some(acronym) => Err(StoreError::Conflict(format!(
            "duplicate measurement acronym {acronym}"
        ))),
        None => Ok(()),
    }
}

/// Persistence adapter keeping plans in memory
#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    plans: DashMap<PlanId, Plan>,
}

impl InMemoryPlanStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored plans
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Snapshot of a stored plan
    #[must_use]
    pub fn snapshot(&self, plan_id: &PlanId) -> Option<Plan> {
        self.plans.get(plan_id).map(|p| p.value().clone())
    }

    /// Apply `mutate` to a copy of the plan and store it only on success
    fn modify(
        &self,
        plan_id: &PlanId,
        mutate: impl FnOnce(&mut Plan) -> Result<(), StoreError>,
    ) -> Result<Plan, StoreError> {
        let mut entry = self
            .plans
            .get_mut(plan_id)
            .ok_or_else(|| not_found("plan", plan_id))?;
        let mut plan = entry.value().clone();
        mutate(&mut plan)?;
        *entry.value_mut() = plan.clone();
        Ok(plan)
    }
}

fn objective_mut<'p>(plan: &'p mut Plan, id: &ObjectiveId) -> Result<&'p mut Objective, StoreError> {
    plan.objective_mut(id).ok_or_else(|| not_found("objective", id))
}

fn question_mut<'p>(
    plan: &'p mut Plan,
    objective_id: &ObjectiveId,
    id: &QuestionId,
) -> Result<&'p mut Question, StoreError> {
    objective_mut(plan, objective_id)?
        .questions
        .iter_mut()
        .find(|q| &q.id == id)
        .ok_or_else(|| not_found("question", id))
}

fn metric_mut<'p>(
    plan: &'p mut Plan,
    objective_id: &ObjectiveId,
    question_id: &QuestionId,
    id: &MetricId,
) -> Result<&'p mut Metric, StoreError> {
    question_mut(plan, objective_id, question_id)?
        .metrics
        .iter_mut()
        .find(|m| &m.id == id)
        .ok_or_else(|| not_found("metric", id))
}

fn remove_by<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !matches(item));
    items.len() != before
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn create_plan(&self, payload: PlanPayload) -> Result<Plan, StoreError> {
        for objective in &payload.objectives {
            for question in &objective.questions {
                for metric in &question.metrics {
                    check_metric_acronyms(metric)?;
                }
            }
        }
        let plan = Plan {
            id: PlanId::new(fresh_id()),
            plan_name: payload.plan_name,
            associated_project: payload.associated_project,
            plan_responsible: payload.plan_responsible,
            goal: payload.goal,
            objectives: payload
                .objectives
                .into_iter()
                .map(materialize_objective)
                .collect(),
        };
        tracing::debug!(plan_id = %plan.id, "plan stored");
        self.plans.insert(plan.id.clone(), plan.clone());
        Ok(plan)
    }

    async fn get_plan(&self, plan_id: &PlanId) -> Result<Plan, StoreError> {
        self.snapshot(plan_id)
            .ok_or_else(|| not_found("plan", plan_id))
    }

    async fn add_objective(
        &self,
        plan_id: &PlanId,
        objective: ObjectivePayload,
    ) -> Result<Plan, StoreError> {
        self.modify(plan_id, |plan| {
            plan.objectives.push(materialize_objective(objective));
            Ok(())
        })
    }

    async fn update_objective(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        objective: ObjectivePayload,
    ) -> Result<Plan, StoreError> {
        self.modify(plan_id, |plan| {
            objective_mut(plan, objective_id)?.objective_title = objective.objective_title;
            Ok(())
        })
    }

    async fn delete_objective(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
    ) -> Result<Plan, StoreError> {
        self.modify(plan_id, |plan| {
            if remove_by(&mut plan.objectives, |o| &o.id == objective_id) {
                Ok(())
            } else {
                Err(not_found("objective", objective_id))
            }
        })
    }

    async fn add_question(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question: QuestionPayload,
    ) -> Result<Plan, StoreError> {
        self.modify(plan_id, |plan| {
            objective_mut(plan, objective_id)?
                .questions
                .push(materialize_question(question));
            Ok(())
        })
    }

    async fn update_question(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        question: QuestionPayload,
    ) -> Result<Plan, StoreError> {
        self.modify(plan_id, |plan| {
            question_mut(plan, objective_id, question_id)?.question_text = question.question_text;
            Ok(())
        })
    }

    async fn delete_question(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
    ) -> Result<Plan, StoreError> {
        self.modify(plan_id, |plan| {
            let objective = objective_mut(plan, objective_id)?;
            if remove_by(&mut objective.questions, |q| &q.id == question_id) {
                Ok(())
            } else {
                Err(not_found("question", question_id))
            }
        })
    }

    async fn add_metric(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric: MetricPayload,
    ) -> Result<Plan, StoreError> {
        check_metric_acronyms(&metric)?;
        self.modify(plan_id, |plan| {
            question_mut(plan, objective_id, question_id)?
                .metrics
                .push(materialize_metric(metric));
            Ok(())
        })
    }

    async fn update_metric(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
        metric: MetricPayload,
    ) -> Result<Plan, StoreError> {
        check_metric_acronyms(&metric)?;
        self.modify(plan_id, |plan| {
            let target = metric_mut(plan, objective_id, question_id, metric_id)?;
            let mut previous: HashMap<String, MeasurementId> = target
                .measurements
                .drain(..)
                .map(|m| (normalize_acronym(&m.measurement_acronym), m.id))
                .collect();
            target.measurements = metric
                .measurements
                .into_iter()
                .map(|p| {
                    let kept = previous.remove(&normalize_acronym(&p.measurement_acronym));
                    let mut measurement = materialize_measurement(p);
                    if let Some(id) = kept {
                        measurement.id = id;
                    }
                    measurement
                })
                .collect();
            target.metric_name = metric.metric_name;
            target.metric_description = metric.metric_description;
            target.metric_mnemonic = metric.metric_mnemonic;
            target.metric_formula = metric.metric_formula;
            target.metric_control_range = metric.metric_control_range;
            target.analysis_procedure = metric.analysis_procedure;
            target.analysis_frequency = metric.analysis_frequency;
            target.analysis_responsible = metric.analysis_responsible;
            Ok(())
        })
    }

    async fn delete_metric(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
    ) -> Result<Plan, StoreError> {
        self.modify(plan_id, |plan| {
            let question = question_mut(plan, objective_id, question_id)?;
            if remove_by(&mut question.metrics, |m| &m.id == metric_id) {
                Ok(())
            } else {
                Err(not_found("metric", metric_id))
            }
        })
    }

    async fn add_measurement(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
        measurement: MeasurementPayload,
    ) -> Result<Plan, StoreError> {
        self.modify(plan_id, |plan| {
            let metric = metric_mut(plan, objective_id, question_id, metric_id)?;
            let siblings = metric
                .measurements
                .iter()
                .map(|m| m.measurement_acronym.as_str());
            if acronym_taken(siblings, &measurement.measurement_acronym, None) {
                return Err(StoreError::Conflict(format!(
                    "duplicate measurement acronym {}",
                    measurement.measurement_acronym
                )));
            }
            metric
                .measurements
                .push(materialize_measurement(measurement));
            Ok(())
        })
    }

    async fn update_measurement(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
        measurement_id: &MeasurementId,
        measurement: MeasurementPayload,
    ) -> Result<Plan, StoreError> {
        self.modify(plan_id, |plan| {
            let metric = metric_mut(plan, objective_id, question_id, metric_id)?;
            let clash = metric
                .measurements
                .iter()
                .filter(|m| &m.id != measurement_id)
                .map(|m| m.measurement_acronym.as_str());
            if acronym_taken(clash, &measurement.measurement_acronym, None) {
                return Err(StoreError::Conflict(format!(
                    "duplicate measurement acronym {}",
                    measurement.measurement_acronym
                )));
            }
            let target = metric
                .measurements
                .iter_mut()
                .find(|m| &m.id == measurement_id)
                .ok_or_else(|| not_found("measurement", measurement_id))?;
            *target = Measurement {
                id: target.id.clone(),
                ..materialize_measurement(measurement)
            };
            Ok(())
        })
    }

    async fn delete_measurement(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
        measurement_id: &MeasurementId,
    ) -> Result<Plan, StoreError> {
        self.modify(plan_id, |plan| {
            let metric = metric_mut(plan, objective_id, question_id, metric_id)?;
            if remove_by(&mut metric.measurements, |m| &m.id == measurement_id) {
                Ok(())
            } else {
                Err(not_found("measurement", measurement_id))
            }
        })
    }
}

/// Project directory over a fixed list
#[derive(Debug, Clone, Default)]
pub struct StaticProjectDirectory {
    projects: Vec<ProjectRef>,
    suggestions: HashMap<String, Vec<String>>,
}

impl StaticProjectDirectory {
    #[inline]
    #[must_use]
    pub fn new(projects: Vec<ProjectRef>) -> Self {
        Self {
            projects,
            suggestions: HashMap::new(),
        }
    }

    /// Attach objective suggestions to a project
    #[must_use]
    pub fn with_suggestions(
        mut self,
        project_id: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        self.suggestions.insert(project_id.into(), suggestions);
        self
    }
}

#[async_trait]
impl ProjectDirectory for StaticProjectDirectory {
    async fn list_projects(&self) -> Result<Vec<ProjectRef>, StoreError> {
        Ok(self.projects.clone())
    }

    async fn objective_suggestions(&self, project_id: &str) -> Result<Vec<String>, StoreError> {
        if !self.projects.iter().any(|p| p.id == project_id) {
            return Err(StoreError::NotFound(format!("project {project_id}")));
        }
        Ok(self.suggestions.get(project_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqm_model::{ControlRange, GoalFraming, MeasurementScale};
    use pretty_assertions::assert_eq;

    fn measurement(acronym: &str) -> MeasurementPayload {
        MeasurementPayload {
            measurement_entity: "Work item".into(),
            measurement_acronym: acronym.into(),
            measurement_properties: "Start".into(),
            measurement_unit: "date".into(),
            measurement_scale: MeasurementScale::Continuous,
            measurement_procedure: "Read tracker".into(),
            measurement_frequency: "Daily".into(),
            measurement_responsible: None,
        }
    }

    fn metric(name: &str, acronyms: &[&str]) -> MetricPayload {
        MetricPayload {
            metric_name: name.into(),
            metric_description: "desc".into(),
            metric_mnemonic: "LDT".into(),
            metric_formula: "end-start".into(),
            metric_control_range: ControlRange::default(),
            analysis_procedure: String::new(),
            analysis_frequency: String::new(),
            analysis_responsible: String::new(),
            measurements: acronyms.iter().map(|a| measurement(a)).collect(),
        }
    }

    fn payload() -> PlanPayload {
        PlanPayload {
            plan_name: "Q1 Plan".into(),
            associated_project: ProjectRef::new("proj-1", "Atlas"),
            plan_responsible: "Ana".into(),
            goal: GoalFraming::default(),
            objectives: vec![ObjectivePayload {
                objective_title: "Quality".into(),
                questions: vec![QuestionPayload {
                    question_text: "Why?".into(),
                    metrics: vec![metric("Lead time", &["SDT", "EDT"])],
                }],
            }],
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_at_every_level() {
        let store = InMemoryPlanStore::new();
        let plan = store.create_plan(payload()).await.unwrap();
        assert_eq!(plan.counts(), [1, 1, 1, 2]);
        let m = &plan.objectives[0].questions[0].metrics[0].measurements;
        assert_ne!(m[0].id, m[1].id);
        assert_eq!(store.get_plan(&plan.id).await.unwrap(), plan);
    }

    #[tokio::test]
    async fn update_keeps_children() {
        let store = InMemoryPlanStore::new();
        let plan = store.create_plan(payload()).await.unwrap();
        let objective_id = plan.objectives[0].id.clone();

        let updated = store
            .update_objective(
                &plan.id,
                &objective_id,
                ObjectivePayload {
                    objective_title: "Quality first".into(),
                    questions: vec![],
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.objectives[0].objective_title, "Quality first");
        assert_eq!(updated.objectives[0].questions.len(), 1);
    }

    #[tokio::test]
    async fn update_metric_replaces_measurements_keeping_ids_by_acronym() {
        let store = InMemoryPlanStore::new();
        let plan = store.create_plan(payload()).await.unwrap();
        let o = &plan.objectives[0];
        let q = &o.questions[0];
        let m = &q.metrics[0];
        let sdt = m.measurements[0].id.clone();

        let updated = store
            .update_metric(&plan.id, &o.id, &q.id, &m.id, metric("Lead time", &["sdt", "WIP"]))
            .await
            .unwrap();
        let after = updated.metric(&o.id, &q.id, &m.id).unwrap();
        let acronyms: Vec<&str> = after
            .measurements
            .iter()
            .map(|m| m.measurement_acronym.as_str())
            .collect();
        assert_eq!(acronyms, vec!["sdt", "WIP"]);
        assert_eq!(after.measurements[0].id, sdt);
        assert_ne!(after.measurements[1].id, m.measurements[1].id);

        let err = store
            .update_metric(&plan.id, &o.id, &q.id, &m.id, metric("Lead time", &["A", "a"]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.snapshot(&plan.id).unwrap(), updated);
    }

    #[tokio::test]
    async fn delete_cascades() {
        let store = InMemoryPlanStore::new();
        let plan = store.create_plan(payload()).await.unwrap();
        let question_id = plan.objectives[0].questions[0].id.clone();

        let updated = store
            .delete_question(&plan.id, &plan.objectives[0].id, &question_id)
            .await
            .unwrap();
        assert_eq!(updated.counts(), [1, 0, 0, 0]);
    }

    #[tokio::test]
    async fn duplicate_acronym_is_a_conflict_and_changes_nothing() {
        let store = InMemoryPlanStore::new();
        let plan = store.create_plan(payload()).await.unwrap();
        let o = &plan.objectives[0];
        let q = &o.questions[0];
        let m = &q.metrics[0];

        let err = store
            .add_measurement(&plan.id, &o.id, &q.id, &m.id, measurement("sdt "))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.snapshot(&plan.id).unwrap(), plan);

        let err = store
            .add_metric(&plan.id, &o.id, &q.id, metric("Other", &["A", "a"]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_measurement_may_keep_its_own_acronym() {
        let store = InMemoryPlanStore::new();
        let plan = store.create_plan(payload()).await.unwrap();
        let o = &plan.objectives[0];
        let q = &o.questions[0];
        let m = &q.metrics[0];
        let target = &m.measurements[0];

        let mut changed = measurement("SDT");
        changed.measurement_unit = "timestamp".into();
        let updated = store
            .update_measurement(&plan.id, &o.id, &q.id, &m.id, &target.id, changed)
            .await
            .unwrap();
        let kept = updated
            .metric(&o.id, &q.id, &m.id)
            .and_then(|m| m.measurement(&target.id))
            .unwrap();
        assert_eq!(kept.measurement_unit, "timestamp");

        let err = store
            .update_measurement(&plan.id, &o.id, &q.id, &m.id, &target.id, measurement("EDT"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = InMemoryPlanStore::new();
        let err = store.get_plan(&PlanId::new("missing")).await.unwrap_err();
        assert!(err.is_not_found());

        let plan = store.create_plan(payload()).await.unwrap();
        let err = store
            .delete_objective(&plan.id, &ObjectiveId::new("nope"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("objective nope".into()));
    }

    #[tokio::test]
    async fn project_directory_lists_and_suggests() {
        let directory = StaticProjectDirectory::new(vec![ProjectRef::new("proj-1", "Atlas")])
            .with_suggestions("proj-1", vec!["Cut escaped defects".into()]);

        assert_eq!(directory.list_projects().await.unwrap().len(), 1);
        assert_eq!(
            directory.objective_suggestions("proj-1").await.unwrap(),
            vec!["Cut escaped defects".to_string()]
        );
        assert!(directory.objective_suggestions("proj-2").await.is_err());
    }
}
