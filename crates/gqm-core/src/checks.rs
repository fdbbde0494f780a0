//! Field checks over resolved payloads
//!
//! Each check covers the node's own fields only. Child lists are checked by
//! the caller, which knows whether they matter (finalize) or are ignored
//! (content manager updates).

use gqm_model::validation::find_duplicate_acronym;
use gqm_model::{
    Field, FieldErrors, FieldIssue, FieldLimits, MeasurementPayload, MetricPayload,
    ObjectivePayload, PlanPayload, QuestionPayload,
};

pub(crate) fn plan_fields(plan: &PlanPayload, l: &FieldLimits) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check_required(Field::PlanName, &plan.plan_name, l.title_max);
    errors.check_required(Field::AssociatedProject, &plan.associated_project.id, l.label_max);
    errors.check_required(Field::PlanResponsible, &plan.plan_responsible, l.label_max);
    errors
}

pub(crate) fn objective_fields(objective: &ObjectivePayload, l: &FieldLimits) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check_required(Field::ObjectiveTitle, &objective.objective_title, l.title_max);
    errors
}

pub(crate) fn question_fields(question: &QuestionPayload, l: &FieldLimits) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check_required(Field::QuestionText, &question.question_text, l.title_max);
    errors
}

pub(crate) fn metric_fields(metric: &MetricPayload, l: &FieldLimits) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check_required(Field::MetricName, &metric.metric_name, l.title_max);
    errors.check_required(Field::MetricDescription, &metric.metric_description, l.text_max);
    errors.check_required(Field::MetricMnemonic, &metric.metric_mnemonic, l.mnemonic_max);
    errors.check_required(Field::MetricFormula, &metric.metric_formula, l.text_max);
    if !metric.metric_control_range.is_valid() {
        errors.add(Field::MetricControlRange, FieldIssue::InvalidRange);
    }
    errors.check_len(Field::AnalysisProcedure, &metric.analysis_procedure, l.text_max);
    errors.check_len(Field::AnalysisFrequency, &metric.analysis_frequency, l.label_max);
    errors.check_len(Field::AnalysisResponsible, &metric.analysis_responsible, l.label_max);
    errors
}

/// Measurement list of a metric: non-empty, acronyms unique
pub(crate) fn metric_measurements(metric: &MetricPayload) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if metric.measurements.is_empty() {
        errors.add(Field::Measurements, FieldIssue::AtLeastOne);
    }
    let acronyms = metric
        .measurements
        .iter()
        .map(|m| m.measurement_acronym.as_str());
    if let Some(acronym) = find_duplicate_acronym(acronyms) {
        errors.add(
            Field::MeasurementAcronym,
            FieldIssue::DuplicateAcronym {
                acronym: acronym.trim().to_string(),
            },
        );
    }
    errors
}

pub(crate) fn measurement_fields(m: &MeasurementPayload, l: &FieldLimits) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check_required(Field::MeasurementEntity, &m.measurement_entity, l.title_max);
    errors.check_required(Field::MeasurementAcronym, &m.measurement_acronym, l.acronym_max);
    errors.check_required(Field::MeasurementProperties, &m.measurement_properties, l.text_max);
    errors.check_required(Field::MeasurementUnit, &m.measurement_unit, l.label_max);
    errors.check_required(Field::MeasurementProcedure, &m.measurement_procedure, l.text_max);
    errors.check_required(Field::MeasurementFrequency, &m.measurement_frequency, l.label_max);
    if let Some(responsible) = &m.measurement_responsible {
        errors.check_len(Field::MeasurementResponsible, responsible, l.label_max);
    }
    errors
}

/// `Duplicate` issue if `candidate` equals one of `siblings` (trimmed)
pub(crate) fn duplicate_name<'a>(
    field: Field,
    candidate: &str,
    mut siblings: impl Iterator<Item = &'a str>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let candidate = candidate.trim();
    if siblings.any(|s| s.trim() == candidate) {
        errors.add(
            field,
            FieldIssue::Duplicate {
                name: candidate.to_string(),
            },
        );
    }
    errors
}
