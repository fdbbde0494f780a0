//! Draft hierarchy built by the creation wizard
//!
//! Drafts have no identity until persisted. Within the wizard every node is
//! addressed by its natural key: the objective title, the question text, or
//! the metric name. Sibling natural keys are unique.

use crate::scale::{ControlRange, MeasurementScale};
use crate::text::Text;
use serde::{Deserialize, Serialize};

/// Project a plan is associated with
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
}

impl ProjectRef {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// GQM goal statement: analyze *object* for the purpose of *purpose* with
/// respect to *focus* from the viewpoint of *viewpoint* in *context*
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalFraming {
    pub object: String,
    pub purpose: String,
    pub quality_focus: String,
    pub viewpoint: String,
    pub context: String,
}

impl GoalFraming {
    /// Default framing derived from the plan basics
    #[must_use]
    pub fn synthesize(project: &ProjectRef, responsible: &str) -> Self {
        let object = if project.name.trim().is_empty() {
            project.id.clone()
        } else {
            project.name.clone()
        };
        Self {
            context: format!("the {object} project"),
            object,
            purpose: "improve".to_string(),
            quality_focus: "quality".to_string(),
            viewpoint: responsible.trim().to_string(),
        }
    }

    /// One-sentence rendering of the framing
    #[must_use]
    pub fn statement(&self) -> String {
        format!(
            "Analyze {} for the purpose of {} with respect to {} from the viewpoint of {} in the context of {}",
            self.object, self.purpose, self.quality_focus, self.viewpoint, self.context
        )
    }
}

/// Data gathered by the first wizard step
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanBasics {
    pub plan_name: String,
    pub associated_project: ProjectRef,
    pub plan_responsible: String,
    pub goal: GoalFraming,
}

impl PlanBasics {
    /// Basics with a synthesized goal framing
    #[must_use]
    pub fn new(
        plan_name: impl Into<String>,
        associated_project: ProjectRef,
        plan_responsible: impl Into<String>,
    ) -> Self {
        let plan_responsible = plan_responsible.into();
        let goal = GoalFraming::synthesize(&associated_project, &plan_responsible);
        Self {
            plan_name: plan_name.into(),
            associated_project,
            plan_responsible,
            goal,
        }
    }

    /// Override the synthesized goal framing
    #[inline]
    #[must_use]
    pub fn with_goal(mut self, goal: GoalFraming) -> Self {
        self.goal = goal;
        self
    }

    /// Every required field is non-blank
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.plan_name.trim().is_empty()
            && !self.associated_project.id.trim().is_empty()
            && !self.plan_responsible.trim().is_empty()
    }
}

/// Whole draft ready for finalization
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanDraft {
    pub basics: PlanBasics,
    pub objectives: Vec<ObjectiveDraft>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectiveDraft {
    pub title: Text,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
}

impl ObjectiveDraft {
    #[inline]
    #[must_use]
    pub fn new(title: Text) -> Self {
        Self {
            title,
            questions: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_question(mut self, question: QuestionDraft) -> Self {
        self.questions.push(question);
        self
    }

    /// Natural key used to address this objective before persistence
    #[inline]
    #[must_use]
    pub fn natural_key(&self) -> &Text {
        &self.title
    }

    #[must_use]
    pub fn question(&self, text: &Text) -> Option<&QuestionDraft> {
        self.questions.iter().find(|q| &q.text == text)
    }

    pub fn question_mut(&mut self, text: &Text) -> Option<&mut QuestionDraft> {
        self.questions.iter_mut().find(|q| &q.text == text)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: Text,
    #[serde(default)]
    pub metrics: Vec<MetricDraft>,
}

impl QuestionDraft {
    #[inline]
    #[must_use]
    pub fn new(text: Text) -> Self {
        Self {
            text,
            metrics: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_metric(mut self, metric: MetricDraft) -> Self {
        self.metrics.push(metric);
        self
    }

    #[inline]
    #[must_use]
    pub fn natural_key(&self) -> &Text {
        &self.text
    }

    #[must_use]
    pub fn metric(&self, name: &Text) -> Option<&MetricDraft> {
        self.metrics.iter().find(|m| &m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricDraft {
    pub name: Text,
    pub description: Text,
    /// Short code, literal, at most three characters
    pub mnemonic: String,
    pub formula: String,
    pub control_range: ControlRange,
    pub analysis_procedure: Text,
    pub analysis_frequency: Text,
    pub analysis_responsible: String,
    #[serde(default)]
    pub measurements: Vec<MeasurementDraft>,
}

impl MetricDraft {
    /// Metric with the four required scalar fields set
    #[must_use]
    pub fn new(
        name: Text,
        description: Text,
        mnemonic: impl Into<String>,
        formula: impl Into<String>,
    ) -> Self {
        Self {
            name,
            description,
            mnemonic: mnemonic.into(),
            formula: formula.into(),
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_measurement(mut self, measurement: MeasurementDraft) -> Self {
        self.measurements.push(measurement);
        self
    }

    #[inline]
    #[must_use]
    pub fn natural_key(&self) -> &Text {
        &self.name
    }

    /// Acronyms of the current measurements
    pub fn acronyms(&self) -> impl Iterator<Item = &str> {
        self.measurements.iter().map(|m| m.acronym.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasurementDraft {
    pub entity: Text,
    /// Literal, at most three characters, unique among siblings
    pub acronym: String,
    pub properties: Text,
    pub unit: Text,
    pub scale: MeasurementScale,
    pub procedure: Text,
    pub frequency: Text,
    pub responsible: Option<String>,
}

impl MeasurementDraft {
    #[inline]
    #[must_use]
    pub fn new(entity: Text, acronym: impl Into<String>) -> Self {
        Self {
            entity,
            acronym: acronym.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TranslationKey;

    #[test]
    fn goal_synthesis_uses_project_and_responsible() {
        let basics = PlanBasics::new("Q1 Plan", ProjectRef::new("proj-1", "Atlas"), "Ana");
        assert_eq!(basics.goal.object, "Atlas");
        assert_eq!(basics.goal.viewpoint, "Ana");
        assert!(basics.goal.statement().starts_with("Analyze Atlas"));
    }

    #[test]
    fn goal_synthesis_falls_back_to_project_id() {
        let goal = GoalFraming::synthesize(&ProjectRef::new("proj-1", " "), "Ana");
        assert_eq!(goal.object, "proj-1");
    }

    #[test]
    fn basics_completeness() {
        assert!(PlanBasics::new("Q1 Plan", ProjectRef::new("proj-1", ""), "Ana").is_complete());
        assert!(!PlanBasics::new("", ProjectRef::new("proj-1", ""), "Ana").is_complete());
        assert!(!PlanBasics::new("Q1", ProjectRef::default(), "Ana").is_complete());
        assert!(!PlanBasics::default().is_complete());
    }

    #[test]
    fn natural_key_lookup() {
        let key = Text::Key(TranslationKey::from_static("questions.defectRate"));
        let objective = ObjectiveDraft::new(Text::literal("Quality"))
            .with_question(QuestionDraft::new(key.clone()));

        assert!(objective.question(&key).is_some());
        assert!(objective.question(&Text::literal("questions.defectRate")).is_none());
    }

    #[test]
    fn children_default_to_empty() {
        let json = serde_json::json!({"title": {"kind": "literal", "value": "Quality"}});
        let objective: ObjectiveDraft = serde_json::from_value(json).unwrap();
        assert!(objective.questions.is_empty());
    }
}
