//! Wizard state and its reducer
//!
//! All draft data of a creation session lives in one [`WizardState`]. It
//! changes only through [`transition`], a pure function that either returns
//! the next state or says why the action was refused. Unlock predicates are
//! evaluated here and nowhere else.

use super::step::{StepStatus, WizardStep};
use crate::error::WizardError;
use gqm_model::validation::find_duplicate_acronym;
use gqm_model::{
    Field, FieldErrors, FieldIssue, FieldLimits, MeasurementDraft, MetricDraft, ObjectiveDraft,
    PlanBasics, PlanDraft, PlanId, ProjectRef, QuestionDraft, Text,
};
use serde::{Deserialize, Serialize};

/// Progress of the finalize submission
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    /// Request in flight
    Submitting,
    /// Persisted under this id; the wizard is done
    Submitted(PlanId),
    /// Last attempt failed with this banner message
    Failed(String),
}

impl SubmissionStatus {
    /// Whether the draft is frozen
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Submitting | Self::Submitted(_))
    }
}

/// Complete state of one creation session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    step: WizardStep,
    basics: Option<PlanBasics>,
    objectives: Vec<ObjectiveDraft>,
    projects: Vec<ProjectRef>,
    objective_hints: Vec<String>,
    submission: SubmissionStatus,
    limits: FieldLimits,
}

/// Everything a user can do to the draft
#[derive(Debug, Clone, PartialEq)]
pub enum WizardAction {
    /// Projects offered for association
    SetProjects(Vec<ProjectRef>),
    SetBasics(PlanBasics),
    /// Read-only objective suggestions from the project collaborator
    SetObjectiveHints(Vec<String>),
    AddObjective(ObjectiveDraft),
    ReplaceObjective {
        title: Text,
        objective: ObjectiveDraft,
    },
    RemoveObjective {
        title: Text,
    },
    AddQuestion {
        objective: Text,
        question: QuestionDraft,
    },
    ReplaceQuestion {
        objective: Text,
        text: Text,
        question: QuestionDraft,
    },
    RemoveQuestion {
        objective: Text,
        text: Text,
    },
    AddMetric {
        objective: Text,
        question: Text,
        metric: MetricDraft,
    },
    ReplaceMetric {
        objective: Text,
        question: Text,
        name: Text,
        metric: MetricDraft,
    },
    RemoveMetric {
        objective: Text,
        question: Text,
        name: Text,
    },
    GoTo(WizardStep),
    Next,
    Back,
}

impl WizardAction {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetProjects(_) => "set_projects",
            Self::SetBasics(_) => "set_basics",
            Self::SetObjectiveHints(_) => "set_objective_hints",
            Self::AddObjective(_) => "add_objective",
            Self::ReplaceObjective { .. } => "replace_objective",
            Self::RemoveObjective { .. } => "remove_objective",
            Self::AddQuestion { .. } => "add_question",
            Self::ReplaceQuestion { .. } => "replace_question",
            Self::RemoveQuestion { .. } => "remove_question",
            Self::AddMetric { .. } => "add_metric",
            Self::ReplaceMetric { .. } => "replace_metric",
            Self::RemoveMetric { .. } => "remove_metric",
            Self::GoTo(_) => "go_to",
            Self::Next => "next",
            Self::Back => "back",
        }
    }
}

impl WizardState {
    /// Fresh session at the basics step
    #[must_use]
    pub fn new(limits: FieldLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    #[inline]
    #[must_use]
    pub fn basics(&self) -> Option<&PlanBasics> {
        self.basics.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn objectives(&self) -> &[ObjectiveDraft] {
        &self.objectives
    }

    #[must_use]
    pub fn objective(&self, title: &Text) -> Option<&ObjectiveDraft> {
        self.objectives.iter().find(|o| &o.title == title)
    }

    #[must_use]
    pub fn question(&self, objective: &Text, text: &Text) -> Option<&QuestionDraft> {
        self.objective(objective)?.question(text)
    }

    #[inline]
    #[must_use]
    pub fn projects(&self) -> &[ProjectRef] {
        &self.projects
    }

    #[inline]
    #[must_use]
    pub fn objective_hints(&self) -> &[String] {
        &self.objective_hints
    }

    #[inline]
    #[must_use]
    pub fn submission(&self) -> &SubmissionStatus {
        &self.submission
    }

    pub(crate) fn set_submission(&mut self, status: SubmissionStatus) {
        self.submission = status;
    }

    #[inline]
    #[must_use]
    pub fn limits(&self) -> &FieldLimits {
        &self.limits
    }

    /// Titles of the selected objectives, the natural keys of level one
    #[must_use]
    pub fn objective_titles(&self) -> Vec<Text> {
        self.objectives.iter().map(|o| o.title.clone()).collect()
    }

    fn has_question(&self) -> bool {
        self.objectives.iter().any(|o| !o.questions.is_empty())
    }

    fn has_metric(&self) -> bool {
        self.objectives
            .iter()
            .flat_map(|o| &o.questions)
            .any(|q| !q.metrics.is_empty())
    }

    /// Unlock predicate of `step` over the current draft
    #[must_use]
    pub fn is_unlocked(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::Basics => true,
            WizardStep::Objectives => self.basics.as_ref().is_some_and(PlanBasics::is_complete),
            WizardStep::Questions => !self.objectives.is_empty(),
            WizardStep::Metrics => self.has_question(),
            WizardStep::Review => self.has_metric(),
        }
    }

    /// Whether the step indicator for `step` is clickable
    #[inline]
    #[must_use]
    pub fn can_navigate_to(&self, step: WizardStep) -> bool {
        !self.submission.is_locked() && self.is_unlocked(step)
    }

    /// Indicator state of every step, in order
    #[must_use]
    pub fn step_statuses(&self) -> Vec<(WizardStep, StepStatus)> {
        WizardStep::ALL
            .into_iter()
            .map(|step| {
                let status = if step == self.step {
                    StepStatus::Current
                } else if self.can_navigate_to(step) {
                    StepStatus::Available
                } else {
                    StepStatus::Locked
                };
                (step, status)
            })
            .collect()
    }

    /// Draft ready for resolution, once basics exist
    #[must_use]
    pub fn draft(&self) -> Option<PlanDraft> {
        Some(PlanDraft {
            basics: self.basics.clone()?,
            objectives: self.objectives.clone(),
        })
    }

    fn objective_mut(&mut self, title: &Text) -> Result<&mut ObjectiveDraft, WizardError> {
        self.objectives
            .iter_mut()
            .find(|o| &o.title == title)
            .ok_or_else(|| WizardError::NotFound(format!("objective {}", title.raw())))
    }

    fn question_mut(
        &mut self,
        objective: &Text,
        text: &Text,
    ) -> Result<&mut QuestionDraft, WizardError> {
        self.objective_mut(objective)?
            .question_mut(text)
            .ok_or_else(|| WizardError::NotFound(format!("question {}", text.raw())))
    }

    fn require_unlocked(&self, step: WizardStep) -> Result<(), WizardError> {
        if self.is_unlocked(step) {
            Ok(())
        } else {
            Err(WizardError::StepLocked(step))
        }
    }
}

fn check_basics(
    basics: &PlanBasics,
    projects: &[ProjectRef],
    l: &FieldLimits,
) -> Result<PlanBasics, WizardError> {
    let mut errors = FieldErrors::new();
    errors.check_required(Field::PlanName, &basics.plan_name, l.title_max);
    errors.check_required(Field::PlanResponsible, &basics.plan_responsible, l.label_max);
    errors.check_required(Field::AssociatedProject, &basics.associated_project.id, l.label_max);

    let mut basics = basics.clone();
    if !projects.is_empty() && !errors.has(Field::AssociatedProject) {
        match projects.iter().find(|p| p.id == basics.associated_project.id) {
            Some(known) => {
                if basics.associated_project.name.trim().is_empty() {
                    basics.associated_project.name.clone_from(&known.name);
                }
            }
            None => errors.add(
                Field::AssociatedProject,
                FieldIssue::UnknownChoice {
                    value: basics.associated_project.id.clone(),
                },
            ),
        }
    }
    errors.into_result(basics).map_err(WizardError::Invalid)
}

fn check_title(field: Field, title: &Text, l: &FieldLimits) -> Result<(), WizardError> {
    let mut errors = FieldErrors::new();
    errors.check_required_text(field, title, l.title_max);
    errors.into_result(()).map_err(WizardError::Invalid)
}

fn check_measurement(m: &MeasurementDraft, l: &FieldLimits, errors: &mut FieldErrors) {
    errors.check_required_text(Field::MeasurementEntity, &m.entity, l.title_max);
    errors.check_required(Field::MeasurementAcronym, &m.acronym, l.acronym_max);
    errors.check_required_text(Field::MeasurementProperties, &m.properties, l.text_max);
    errors.check_required_text(Field::MeasurementUnit, &m.unit, l.label_max);
    errors.check_required_text(Field::MeasurementProcedure, &m.procedure, l.text_max);
    errors.check_required_text(Field::MeasurementFrequency, &m.frequency, l.label_max);
}

/// Metric data as the metric editor would accept it
fn check_metric(metric: &MetricDraft, l: &FieldLimits) -> Result<(), WizardError> {
    let mut errors = FieldErrors::new();
    errors.check_required_text(Field::MetricName, &metric.name, l.title_max);
    errors.check_required_text(Field::MetricDescription, &metric.description, l.text_max);
    errors.check_required(Field::MetricMnemonic, &metric.mnemonic, l.mnemonic_max);
    errors.check_required(Field::MetricFormula, &metric.formula, l.text_max);
    if !metric.control_range.is_valid() {
        errors.add(Field::MetricControlRange, FieldIssue::InvalidRange);
    }
    if metric.measurements.is_empty() {
        errors.add(Field::Measurements, FieldIssue::AtLeastOne);
    }
    for m in &metric.measurements {
        check_measurement(m, l, &mut errors);
    }
    if let Some(acronym) = find_duplicate_acronym(metric.acronyms()) {
        errors.add(
            Field::MeasurementAcronym,
            FieldIssue::DuplicateAcronym {
                acronym: acronym.trim().to_string(),
            },
        );
    }
    errors.into_result(()).map_err(WizardError::Invalid)
}

/// Reject `key` if a sibling other than `replacing` already uses it
fn ensure_unique<'a>(
    what: &str,
    key: &Text,
    replacing: Option<&Text>,
    mut siblings: impl Iterator<Item = &'a Text>,
) -> Result<(), WizardError> {
    if siblings.any(|s| s == key && Some(s) != replacing) {
        Err(WizardError::Duplicate(format!("{what} {}", key.raw())))
    } else {
        Ok(())
    }
}

fn remove_where<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !matches(item));
    items.len() != before
}

/// Apply `action` to `state`
///
/// Pure: `state` is never modified. Returns the next state, or the reason
/// the action is refused.
///
/// # Errors
/// - `WizardError::Submitted` once the draft is submitted or in flight
/// - `WizardError::StepLocked` when navigating to, or adding under, a step
///   whose unlock predicate does not hold
/// - `WizardError::NotFound` when a natural key addresses nothing
/// - `WizardError::Duplicate` when a natural key is already used by a sibling
/// - `WizardError::Invalid` when node data fails field validation
pub fn transition(state: &WizardState, action: WizardAction) -> Result<WizardState, WizardError> {
    if state.submission.is_locked() {
        return Err(WizardError::Submitted);
    }
    let name = action.name();
    let mut next = state.clone();
    let limits = state.limits;

    match action {
        WizardAction::SetProjects(projects) => next.projects = projects,
        WizardAction::SetBasics(basics) => {
            next.basics = Some(check_basics(&basics, &state.projects, &limits)?);
        }
        WizardAction::SetObjectiveHints(hints) => next.objective_hints = hints,

        WizardAction::AddObjective(objective) => {
            state.require_unlocked(WizardStep::Objectives)?;
            check_title(Field::ObjectiveTitle, &objective.title, &limits)?;
            ensure_unique(
                "objective",
                &objective.title,
                None,
                state.objectives.iter().map(|o| &o.title),
            )?;
            next.objectives.push(objective);
        }
        WizardAction::ReplaceObjective { title, objective } => {
            check_title(Field::ObjectiveTitle, &objective.title, &limits)?;
            ensure_unique(
                "objective",
                &objective.title,
                Some(&title),
                state.objectives.iter().map(|o| &o.title),
            )?;
            *next.objective_mut(&title)? = objective;
        }
        WizardAction::RemoveObjective { title } => {
            if !remove_where(&mut next.objectives, |o| o.title == title) {
                return Err(WizardError::NotFound(format!("objective {}", title.raw())));
            }
        }

        WizardAction::AddQuestion {
            objective,
            question,
        } => {
            state.require_unlocked(WizardStep::Questions)?;
            check_title(Field::QuestionText, &question.text, &limits)?;
            let parent = next.objective_mut(&objective)?;
            ensure_unique(
                "question",
                &question.text,
                None,
                parent.questions.iter().map(|q| &q.text),
            )?;
            parent.questions.push(question);
        }
        WizardAction::ReplaceQuestion {
            objective,
            text,
            question,
        } => {
            check_title(Field::QuestionText, &question.text, &limits)?;
            let parent = next.objective_mut(&objective)?;
            ensure_unique(
                "question",
                &question.text,
                Some(&text),
                parent.questions.iter().map(|q| &q.text),
            )?;
            let target = parent
                .question_mut(&text)
                .ok_or_else(|| WizardError::NotFound(format!("question {}", text.raw())))?;
            *target = question;
        }
        WizardAction::RemoveQuestion { objective, text } => {
            let parent = next.objective_mut(&objective)?;
            if !remove_where(&mut parent.questions, |q| q.text == text) {
                return Err(WizardError::NotFound(format!("question {}", text.raw())));
            }
        }

        WizardAction::AddMetric {
            objective,
            question,
            metric,
        } => {
            state.require_unlocked(WizardStep::Metrics)?;
            check_metric(&metric, &limits)?;
            let parent = next.question_mut(&objective, &question)?;
            ensure_unique(
                "metric",
                &metric.name,
                None,
                parent.metrics.iter().map(|m| &m.name),
            )?;
            parent.metrics.push(metric);
        }
        WizardAction::ReplaceMetric {
            objective,
            question,
            name,
            metric,
        } => {
            check_metric(&metric, &limits)?;
            let parent = next.question_mut(&objective, &question)?;
            ensure_unique(
                "metric",
                &metric.name,
                Some(&name),
                parent.metrics.iter().map(|m| &m.name),
            )?;
            let target = parent
                .metrics
                .iter_mut()
                .find(|m| m.name == name)
                .ok_or_else(|| WizardError::NotFound(format!("metric {}", name.raw())))?;
            *target = metric;
        }
        WizardAction::RemoveMetric {
            objective,
            question,
            name,
        } => {
            let parent = next.question_mut(&objective, &question)?;
            if !remove_where(&mut parent.metrics, |m| m.name == name) {
                return Err(WizardError::NotFound(format!("metric {}", name.raw())));
            }
        }

        WizardAction::GoTo(step) => {
            if !state.is_unlocked(step) {
                tracing::warn!(from = %state.step, to = %step, "navigation blocked");
                return Err(WizardError::StepLocked(step));
            }
            next.step = step;
        }
        WizardAction::Next => {
            let step = state.step.next().ok_or(WizardError::AtLastStep)?;
            if !state.is_unlocked(step) {
                tracing::warn!(from = %state.step, to = %step, "navigation blocked");
                return Err(WizardError::StepLocked(step));
            }
            next.step = step;
        }
        WizardAction::Back => {
            next.step = state.step.previous().ok_or(WizardError::AtFirstStep)?;
        }
    }

    tracing::debug!(action = name, step = %next.step, "wizard transition");
    Ok(next)
}

impl WizardState {
    /// Apply `action` in place; on error the state is left as it was
    ///
    /// # Errors
    /// Same as [`transition`].
    pub fn apply(&mut self, action: WizardAction) -> Result<(), WizardError> {
        *self = transition(self, action)?;
        Ok(())
    }
}
