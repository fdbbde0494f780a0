//! Persisted entities and the literal payloads sent to storage
//!
//! Field names follow the storage wire format (`planName`, `_id`,
//! `metricControlRange`, ...). Every string here is literal text once it has
//! gone through resolution, although strings written by other clients may
//! still carry translation keys and are resolved again for display.

use crate::draft::{
    GoalFraming, MeasurementDraft, MetricDraft, ObjectiveDraft, ProjectRef, QuestionDraft,
};
use crate::ids::{MeasurementId, MetricId, ObjectiveId, PlanId, QuestionId};
use crate::scale::{ControlRange, MeasurementScale};
use crate::text::Text;
use serde::{Deserialize, Serialize};

/// Persisted measurement plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    pub plan_name: String,
    pub associated_project: ProjectRef,
    pub plan_responsible: String,
    #[serde(default)]
    pub goal: GoalFraming,
    #[serde(default)]
    pub objectives: Vec<Objective>,
}

impl Plan {
    #[must_use]
    pub fn objective(&self, id: &ObjectiveId) -> Option<&Objective> {
        self.objectives.iter().find(|o| &o.id == id)
    }

    pub fn objective_mut(&mut self, id: &ObjectiveId) -> Option<&mut Objective> {
        self.objectives.iter_mut().find(|o| &o.id == id)
    }

    #[must_use]
    pub fn question(&self, objective_id: &ObjectiveId, id: &QuestionId) -> Option<&Question> {
        self.objective(objective_id)?.questions.iter().find(|q| &q.id == id)
    }

    pub fn question_mut(
        &mut self,
        objective_id: &ObjectiveId,
        id: &QuestionId,
    ) -> Option<&mut Question> {
        self.objective_mut(objective_id)?
            .questions
            .iter_mut()
            .find(|q| &q.id == id)
    }

    #[must_use]
    pub fn metric(
        &self,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        id: &MetricId,
    ) -> Option<&Metric> {
        self.question(objective_id, question_id)?
            .metrics
            .iter()
            .find(|m| &m.id == id)
    }

    pub fn metric_mut(
        &mut self,
        objective_id: &ObjectiveId,
        question_id: &QuestionId,
        id: &MetricId,
    ) -> Option<&mut Metric> {
        self.question_mut(objective_id, question_id)?
            .metrics
            .iter_mut()
            .find(|m| &m.id == id)
    }

    /// Number of nodes per level: objectives, questions, metrics, measurements
    #[must_use]
    pub fn counts(&self) -> [usize; 4] {
        let mut counts = [self.objectives.len(), 0, 0, 0];
        for objective in &self.objectives {
            counts[1] += objective.questions.len();
            for question in &objective.questions {
                counts[2] += question.metrics.len();
                for metric in &question.metrics {
                    counts[3] += metric.measurements.len();
                }
            }
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    #[serde(rename = "_id")]
    pub id: ObjectiveId,
    pub objective_title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: QuestionId,
    pub question_text: String,
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    #[serde(rename = "_id")]
    pub id: MetricId,
    pub metric_name: String,
    pub metric_description: String,
    pub metric_mnemonic: String,
    pub metric_formula: String,
    pub metric_control_range: ControlRange,
    #[serde(default)]
    pub analysis_procedure: String,
    #[serde(default)]
    pub analysis_frequency: String,
    #[serde(default)]
    pub analysis_responsible: String,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

impl Metric {
    #[must_use]
    pub fn measurement(&self, id: &MeasurementId) -> Option<&Measurement> {
        self.measurements.iter().find(|m| &m.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    #[serde(rename = "_id")]
    pub id: MeasurementId,
    pub measurement_entity: String,
    pub measurement_acronym: String,
    pub measurement_properties: String,
    pub measurement_unit: String,
    pub measurement_scale: MeasurementScale,
    pub measurement_procedure: String,
    pub measurement_frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_responsible: Option<String>,
}

/// Literal plan handed to storage at creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPayload {
    pub plan_name: String,
    pub associated_project: ProjectRef,
    pub plan_responsible: String,
    pub goal: GoalFraming,
    pub objectives: Vec<ObjectivePayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectivePayload {
    pub objective_title: String,
    #[serde(default)]
    pub questions: Vec<QuestionPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub question_text: String,
    #[serde(default)]
    pub metrics: Vec<MetricPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPayload {
    pub metric_name: String,
    pub metric_description: String,
    pub metric_mnemonic: String,
    pub metric_formula: String,
    pub metric_control_range: ControlRange,
    pub analysis_procedure: String,
    pub analysis_frequency: String,
    pub analysis_responsible: String,
    #[serde(default)]
    pub measurements: Vec<MeasurementPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementPayload {
    pub measurement_entity: String,
    pub measurement_acronym: String,
    pub measurement_properties: String,
    pub measurement_unit: String,
    pub measurement_scale: MeasurementScale,
    pub measurement_procedure: String,
    pub measurement_frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_responsible: Option<String>,
}

// Stripping ids turns a persisted subtree back into a payload; plan
// duplication relies on this.

impl From<&Plan> for PlanPayload {
    fn from(plan: &Plan) -> Self {
        Self {
            plan_name: plan.plan_name.clone(),
            associated_project: plan.associated_project.clone(),
            plan_responsible: plan.plan_responsible.clone(),
            goal: plan.goal.clone(),
            objectives: plan.objectives.iter().map(ObjectivePayload::from).collect(),
        }
    }
}

impl From<&Objective> for ObjectivePayload {
    fn from(objective: &Objective) -> Self {
        Self {
            objective_title: objective.objective_title.clone(),
            questions: objective.questions.iter().map(QuestionPayload::from).collect(),
        }
    }
}

impl From<&Question> for QuestionPayload {
    fn from(question: &Question) -> Self {
        Self {
            question_text: question.question_text.clone(),
            metrics: question.metrics.iter().map(MetricPayload::from).collect(),
        }
    }
}

impl From<&Metric> for MetricPayload {
    fn from(metric: &Metric) -> Self {
        Self {
            metric_name: metric.metric_name.clone(),
            metric_description: metric.metric_description.clone(),
            metric_mnemonic: metric.metric_mnemonic.clone(),
            metric_formula: metric.metric_formula.clone(),
            metric_control_range: metric.metric_control_range,
            analysis_procedure: metric.analysis_procedure.clone(),
            analysis_frequency: metric.analysis_frequency.clone(),
            analysis_responsible: metric.analysis_responsible.clone(),
            measurements: metric.measurements.iter().map(MeasurementPayload::from).collect(),
        }
    }
}

impl From<&Measurement> for MeasurementPayload {
    fn from(measurement: &Measurement) -> Self {
        Self {
            measurement_entity: measurement.measurement_entity.clone(),
            measurement_acronym: measurement.measurement_acronym.clone(),
            measurement_properties: measurement.measurement_properties.clone(),
            measurement_unit: measurement.measurement_unit.clone(),
            measurement_scale: measurement.measurement_scale,
            measurement_procedure: measurement.measurement_procedure.clone(),
            measurement_frequency: measurement.measurement_frequency.clone(),
            measurement_responsible: measurement.measurement_responsible.clone(),
        }
    }
}

// Persisted nodes reopened in an editor become drafts again. Their strings
// have lost the key/literal tag, so it is recovered by prefix.

impl From<&Objective> for ObjectiveDraft {
    fn from(objective: &Objective) -> Self {
        Self {
            title: Text::from_stored(&objective.objective_title),
            questions: objective.questions.iter().map(QuestionDraft::from).collect(),
        }
    }
}

impl From<&Question> for QuestionDraft {
    fn from(question: &Question) -> Self {
        Self {
            text: Text::from_stored(&question.question_text),
            metrics: question.metrics.iter().map(MetricDraft::from).collect(),
        }
    }
}

impl From<&Metric> for MetricDraft {
    fn from(metric: &Metric) -> Self {
        Self {
            name: Text::from_stored(&metric.metric_name),
            description: Text::from_stored(&metric.metric_description),
            mnemonic: metric.metric_mnemonic.clone(),
            formula: metric.metric_formula.clone(),
            control_range: metric.metric_control_range,
            analysis_procedure: Text::from_stored(&metric.analysis_procedure),
            analysis_frequency: Text::from_stored(&metric.analysis_frequency),
            analysis_responsible: metric.analysis_responsible.clone(),
            measurements: metric.measurements.iter().map(MeasurementDraft::from).collect(),
        }
    }
}

impl From<&Measurement> for MeasurementDraft {
    fn from(m: &Measurement) -> Self {
        Self {
            entity: Text::from_stored(&m.measurement_entity),
            acronym: m.measurement_acronym.clone(),
            properties: Text::from_stored(&m.measurement_properties),
            unit: Text::from_stored(&m.measurement_unit),
            scale: m.measurement_scale,
            procedure: Text::from_stored(&m.measurement_procedure),
            frequency: Text::from_stored(&m.measurement_frequency),
            responsible: m.measurement_responsible.clone(),
        }
    }
}

impl PlanPayload {
    /// Visit every string field in the tree
    ///
    /// Used to check that no translation key survived resolution.
    pub fn for_each_text(&self, mut visit: impl FnMut(&str)) {
        visit(&self.plan_name);
        visit(&self.plan_responsible);
        for objective in &self.objectives {
            visit(&objective.objective_title);
            for question in &objective.questions {
                visit(&question.question_text);
                for metric in &question.metrics {
                    metric.for_each_text(&mut visit);
                }
            }
        }
    }
}

impl MetricPayload {
    /// Visit every string field of the metric and its measurements
    pub fn for_each_text(&self, visit: &mut impl FnMut(&str)) {
        for field in [
            &self.metric_name,
            &self.metric_description,
            &self.metric_mnemonic,
            &self.metric_formula,
            &self.analysis_procedure,
            &self.analysis_frequency,
            &self.analysis_responsible,
        ] {
            visit(field);
        }
        for m in &self.measurements {
            for field in [
                &m.measurement_entity,
                &m.measurement_acronym,
                &m.measurement_properties,
                &m.measurement_unit,
                &m.measurement_procedure,
                &m.measurement_frequency,
            ] {
                visit(field);
            }
            if let Some(responsible) = &m.measurement_responsible {
                visit(responsible);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_plan() -> Plan {
        serde_json::from_value(serde_json::json!({
            "id": "plan-1",
            "planName": "Q1 Plan",
            "associatedProject": {"id": "proj-1", "name": "Atlas"},
            "planResponsible": "Ana",
            "objectives": [{
                "_id": "o1",
                "objectiveTitle": "Improve quality",
                "questions": [{
                    "_id": "q1",
                    "questionText": "What is our defect rate?",
                    "metrics": [{
                        "_id": "m1",
                        "metricName": "Defect density",
                        "metricDescription": "Defects per KLOC",
                        "metricMnemonic": "DD",
                        "metricFormula": "defects / kloc",
                        "metricControlRange": [0.0, 5.0],
                        "measurements": [{
                            "_id": "ms1",
                            "measurementEntity": "Release",
                            "measurementAcronym": "DEF",
                            "measurementProperties": "Defect count",
                            "measurementUnit": "defects",
                            "measurementScale": "discrete",
                            "measurementProcedure": "Count tickets",
                            "measurementFrequency": "Per release"
                        }]
                    }]
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn plan_deserializes_wire_format() {
        let plan = sample_plan();
        assert_eq!(plan.counts(), [1, 1, 1, 1]);

        let metric = plan
            .metric(&"o1".into(), &"q1".into(), &"m1".into())
            .unwrap();
        assert_eq!(metric.metric_control_range, ControlRange { min: 0.0, max: 5.0 });
        assert!(metric.analysis_procedure.is_empty());
        assert_eq!(metric.measurements[0].measurement_scale, MeasurementScale::Discrete);
    }

    #[test]
    fn missing_children_are_empty() {
        let objective: Objective = serde_json::from_value(serde_json::json!({
            "_id": "o9",
            "objectiveTitle": "Lonely"
        }))
        .unwrap();
        assert!(objective.questions.is_empty());
    }

    #[test]
    fn payload_strips_ids() {
        let plan = sample_plan();
        let payload = PlanPayload::from(&plan);
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("_id"));
        assert_eq!(payload.objectives[0].questions[0].metrics[0].measurements.len(), 1);
    }

    #[test]
    fn persisted_nodes_reopen_as_drafts() {
        let mut plan = sample_plan();
        plan.objectives[0].objective_title = "objective.improveQuality".to_string();
        let draft = ObjectiveDraft::from(&plan.objectives[0]);
        assert!(draft.title.is_key());
        let question = &draft.questions[0];
        assert_eq!(question.text, Text::literal("What is our defect rate?"));
        assert_eq!(question.metrics[0].measurements[0].acronym, "DEF");
    }

    #[test]
    fn for_each_text_visits_nested_fields() {
        let payload = PlanPayload::from(&sample_plan());
        let mut seen = Vec::new();
        payload.for_each_text(|s| seen.push(s.to_string()));
        assert!(seen.contains(&"Count tickets".to_string()));
        assert!(seen.contains(&"What is our defect rate?".to_string()));
    }
}
