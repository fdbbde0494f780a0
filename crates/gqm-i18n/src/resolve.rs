//! Display and submission resolution
//!
//! On read, a value is shown either as its translation or unchanged. On
//! submit, every text field of the draft tree is forced to literal text so
//! that no key crosses the persistence boundary.

use crate::translator::Translator;
use gqm_model::{
    has_key_prefix, MeasurementDraft, MeasurementPayload, MetricDraft, MetricPayload,
    ObjectiveDraft, ObjectivePayload, Plan, PlanDraft, PlanPayload, QuestionDraft,
    QuestionPayload, Text,
};

/// Display text of a tagged value
#[inline]
#[must_use]
pub fn resolve_display(value: &Text, translator: &dyn Translator) -> String {
    match value {
        Text::Key(key) => translator.translate(key.as_str(), None),
        Text::Literal(text) => text.clone(),
    }
}

/// Display text of a bare stored string
///
/// Strings carrying a reserved namespace prefix are translated, anything else
/// is returned unchanged. Resolving an already-literal string is a no-op.
#[must_use]
pub fn resolve_display_str(value: &str, translator: &dyn Translator) -> String {
    if has_key_prefix(value) {
        translator.translate(value, None)
    } else {
        value.to_string()
    }
}

/// Force-resolve a tree into its literal form
pub trait Resolve {
    /// Literal counterpart
    type Output;

    /// Replace every key with its translation
    fn resolve(&self, translator: &dyn Translator) -> Self::Output;
}

impl Resolve for PlanDraft {
    type Output = PlanPayload;

    fn resolve(&self, t: &dyn Translator) -> PlanPayload {
        let basics = &self.basics;
        PlanPayload {
            plan_name: basics.plan_name.clone(),
            associated_project: basics.associated_project.clone(),
            plan_responsible: basics.plan_responsible.clone(),
            goal: basics.goal.clone(),
            objectives: self.objectives.iter().map(|o| o.resolve(t)).collect(),
        }
    }
}

impl Resolve for ObjectiveDraft {
    type Output = ObjectivePayload;

    fn resolve(&self, t: &dyn Translator) -> ObjectivePayload {
        ObjectivePayload {
            objective_title: resolve_display(&self.title, t),
            questions: self.questions.iter().map(|q| q.resolve(t)).collect(),
        }
    }
}

impl Resolve for QuestionDraft {
    type Output = QuestionPayload;

    fn resolve(&self, t: &dyn Translator) -> QuestionPayload {
        QuestionPayload {
            question_text: resolve_display(&self.text, t),
            metrics: self.metrics.iter().map(|m| m.resolve(t)).collect(),
        }
    }
}

impl Resolve for MetricDraft {
    type Output = MetricPayload;

    fn resolve(&self, t: &dyn Translator) -> MetricPayload {
        MetricPayload {
            metric_name: resolve_display(&self.name, t),
            metric_description: resolve_display(&self.description, t),
            metric_mnemonic: self.mnemonic.trim().to_string(),
            metric_formula: self.formula.clone(),
            metric_control_range: self.control_range,
            analysis_procedure: resolve_display(&self.analysis_procedure, t),
            analysis_frequency: resolve_display(&self.analysis_frequency, t),
            analysis_responsible: self.analysis_responsible.clone(),
            measurements: self.measurements.iter().map(|m| m.resolve(t)).collect(),
        }
    }
}

impl Resolve for MeasurementDraft {
    type Output = MeasurementPayload;

    fn resolve(&self, t: &dyn Translator) -> MeasurementPayload {
        MeasurementPayload {
            measurement_entity: resolve_display(&self.entity, t),
            measurement_acronym: self.acronym.trim().to_string(),
            measurement_properties: resolve_display(&self.properties, t),
            measurement_unit: resolve_display(&self.unit, t),
            measurement_scale: self.scale,
            measurement_procedure: resolve_display(&self.procedure, t),
            measurement_frequency: resolve_display(&self.frequency, t),
            measurement_responsible: self.responsible.clone(),
        }
    }
}

/// Copy of a persisted plan with every key-like string translated
///
/// Persisted strings have lost their tag, so this goes by prefix.
#[must_use]
pub fn resolve_plan_display(plan: &Plan, t: &dyn Translator) -> Plan {
    let mut plan = plan.clone();
    let r = |s: &mut String| *s = resolve_display_str(s, t);
    for objective in &mut plan.objectives {
        r(&mut objective.objective_title);
        for question in &mut objective.questions {
            r(&mut question.question_text);
            for metric in &mut question.metrics {
                r(&mut metric.metric_name);
                r(&mut metric.metric_description);
                r(&mut metric.analysis_procedure);
                r(&mut metric.analysis_frequency);
                for m in &mut metric.measurements {
                    r(&mut m.measurement_entity);
                    r(&mut m.measurement_properties);
                    r(&mut m.measurement_unit);
                    r(&mut m.measurement_procedure);
                    r(&mut m.measurement_frequency);
                }
            }
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::MapTranslator;
    use gqm_model::{MeasurementScale, PlanBasics, ProjectRef, TranslationKey};
    use pretty_assertions::assert_eq;

    fn key(raw: &'static str) -> Text {
        Text::Key(TranslationKey::from_static(raw))
    }

    fn bundle() -> MapTranslator {
        MapTranslator::new("en")
            .with("objective.improveQuality", "Improve product quality")
            .with("metrics.leadTime.name", "Lead time")
            .with("metrics.leadTime.description", "Elapsed time per item")
            .with("entities.workItem", "Work item")
            .with("units.days", "days")
    }

    #[test]
    fn display_of_tagged_values() {
        let t = bundle();
        assert_eq!(resolve_display(&key("units.days"), &t), "days");
        assert_eq!(resolve_display(&Text::literal("units.days"), &t), "units.days");
    }

    #[test]
    fn display_of_stored_strings_goes_by_prefix() {
        let t = bundle();
        assert_eq!(resolve_display_str("units.days", &t), "days");
        assert_eq!(resolve_display_str("Lead time", &t), "Lead time");
        // unknown keys come back as themselves
        assert_eq!(resolve_display_str("units.weeks", &t), "units.weeks");
    }

    #[test]
    fn draft_resolves_to_literal_payload() {
        let t = bundle();
        let measurement = MeasurementDraft {
            entity: key("entities.workItem"),
            acronym: " LDT ".to_string(),
            unit: key("units.days"),
            scale: MeasurementScale::Continuous,
            ..MeasurementDraft::default()
        };
        let metric = MetricDraft::new(
            key("metrics.leadTime.name"),
            key("metrics.leadTime.description"),
            "LT",
            "end - start",
        )
        .with_measurement(measurement);
        let draft = PlanDraft {
            basics: PlanBasics::new("Q1 Plan", ProjectRef::new("proj-1", "Atlas"), "Ana"),
            objectives: vec![ObjectiveDraft::new(key("objective.improveQuality")).with_question(
                QuestionDraft::new(Text::literal("What is our defect rate?")).with_metric(metric),
            )],
        };

        let payload = draft.resolve(&t);
        let objective = &payload.objectives[0];
        assert_eq!(objective.objective_title, "Improve product quality");
        assert_eq!(objective.questions[0].question_text, "What is our defect rate?");

        let metric = &objective.questions[0].metrics[0];
        assert_eq!(metric.metric_name, "Lead time");
        assert_eq!(metric.measurements[0].measurement_entity, "Work item");
        assert_eq!(metric.measurements[0].measurement_acronym, "LDT");
        assert_eq!(metric.measurements[0].measurement_unit, "days");
    }

    #[test]
    fn plan_basics_are_copied_verbatim() {
        let t = bundle();
        let draft = PlanDraft {
            basics: PlanBasics::new(
                "units.days",
                ProjectRef::new("proj-1", "Atlas"),
                "entities.workItem",
            ),
            objectives: Vec::new(),
        };

        let payload = draft.resolve(&t);
        assert_eq!(payload.plan_name, "units.days");
        assert_eq!(payload.plan_responsible, "entities.workItem");
    }
}
