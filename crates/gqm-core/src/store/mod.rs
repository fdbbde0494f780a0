//! Collaborator ports
//!
//! [`PlanStore`] is the persistence collaborator: one request per mutation,
//! each scoped to the parent chain of exactly one node, each answered with
//! the whole updated plan. Payloads are literal; translation keys never
//! cross this boundary. Deleting a node removes its subtree.
//!
//! [`ProjectDirectory`] supplies the associated-project choices and optional
//! objective suggestions shown as read-only hints.

mod memory;

pub use memory::{InMemoryPlanStore, StaticProjectDirectory};

use crate::error::StoreError;
use async_trait::async_trait;
use gqm_model::{
    MeasurementId, MeasurementPayload, MetricId, MetricPayload, ObjectiveId, ObjectivePayload,
    Plan, PlanId, PlanPayload, ProjectRef, QuestionId, QuestionPayload,
};

/// Persistence collaborator
///
/// `update_*` replaces the node's own fields and keeps its children; the
/// children carried by the payload are ignored. Metrics are the exception:
/// a metric is edited together with its measurements, so `update_metric`
/// replaces the measurement list as well. Measurements whose acronym is
/// unchanged keep their id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Persist a whole plan, assigning ids to every node
    async fn create_plan(&self, plan: PlanPayload) -> Result<Plan, StoreError>;

    async fn get_plan(&self, plan_id: &PlanId) -> Result<Plan, StoreError>;

    async fn add_objective(
        &self,
        plan_id: &PlanId,
        objective: ObjectivePayload,
    ) -> Result<Plan, StoreError>;

    async fn update_objective(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        objective: ObjectivePayload,
    ) -> Result<Plan, StoreError>;

    async fn delete_objective(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
    ) -> Result<Plan, StoreError>;

    async fn add_question(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question: QuestionPayload,
    ) -> Result<Plan, StoreError>;

    async fn update_question(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        question: QuestionPayload,
    ) -> Result<Plan, StoreError>;

    async fn delete_question(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
    ) -> Result<Plan, StoreError>;

    async fn add_metric(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric: MetricPayload,
    ) -> Result<Plan, StoreError>;

    async fn update_metric(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
        metric: MetricPayload,
    ) -> Result<Plan, StoreError>;

    async fn delete_metric(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
    ) -> Result<Plan, StoreError>;

    async fn add_measurement(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
        measurement: MeasurementPayload,
    ) -> Result<Plan, StoreError>;

    async fn update_measurement(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
        measurement_id: &MeasurementId,
        measurement: MeasurementPayload,
    ) -> Result<Plan, StoreError>;

    async fn delete_measurement(
        &self,
        plan_id: &PlanId,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        metric_id: &MetricId,
        measurement_id: &MeasurementId,
    ) -> Result<Plan, StoreError>;
}

/// Project collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Projects a plan can be associated with
    async fn list_projects(&self) -> Result<Vec<ProjectRef>, StoreError>;

    /// Objective suggestions for a project, shown as hints only
    async fn objective_suggestions(&self, project_id: &str) -> Result<Vec<String>, StoreError>;
}
