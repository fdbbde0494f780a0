//! Creation session
//!
//! [`PlanWizard`] owns a [`WizardState`] and hands out node editors already
//! configured for the part of the draft they will edit, so catalog entries
//! that are already selected under the same parent are not offered again.

use super::review::ReviewSummary;
use super::state::{WizardAction, WizardState};
use super::step::WizardStep;
use crate::error::{SubmissionError, WizardError};
use crate::finalize::Finalizer;
use crate::store::ProjectDirectory;
use gqm_catalog::Catalog;
use gqm_editors::{MetricEditor, ObjectiveEditor, QuestionEditor};
use gqm_i18n::Translator;
use gqm_model::{FieldLimits, Plan, Text};

/// One plan creation session
#[derive(Debug, Clone)]
pub struct PlanWizard<'c> {
    catalog: &'c Catalog,
    state: WizardState,
}

impl<'c> PlanWizard<'c> {
    #[must_use]
    pub fn new(catalog: &'c Catalog, limits: FieldLimits) -> Self {
        Self {
            catalog,
            state: WizardState::new(limits),
        }
    }

    /// Resume from a saved state
    #[must_use]
    pub fn from_state(catalog: &'c Catalog, state: WizardState) -> Self {
        Self { catalog, state }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &WizardState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.state.step()
    }

    #[inline]
    #[must_use]
    pub fn into_state(self) -> WizardState {
        self.state
    }

    /// Apply one action
    ///
    /// # Errors
    /// Whatever [`crate::transition`] refuses; the state is unchanged then.
    pub fn dispatch(&mut self, action: WizardAction) -> Result<&WizardState, WizardError> {
        self.state.apply(action)?;
        Ok(&self.state)
    }

    /// Fetch the selectable projects
    ///
    /// # Errors
    /// `WizardError::Collaborator` if the directory fails.
    pub async fn load_projects(
        &mut self,
        directory: &dyn ProjectDirectory,
    ) -> Result<(), WizardError> {
        let projects = directory.list_projects().await?;
        tracing::debug!(count = projects.len(), "projects loaded");
        self.dispatch(WizardAction::SetProjects(projects))?;
        Ok(())
    }

    /// Fetch objective suggestions for the associated project
    ///
    /// Suggestions stay hints; nothing is added to the draft.
    ///
    /// # Errors
    /// - `WizardError::StepLocked` before basics are set
    /// - `WizardError::Collaborator` if the directory fails
    pub async fn load_objective_hints(
        &mut self,
        directory: &dyn ProjectDirectory,
    ) -> Result<(), WizardError> {
        let project_id = self
            .state
            .basics()
            .map(|b| b.associated_project.id.clone())
            .ok_or(WizardError::StepLocked(WizardStep::Objectives))?;
        let hints = directory.objective_suggestions(&project_id).await?;
        self.dispatch(WizardAction::SetObjectiveHints(hints))?;
        Ok(())
    }

    /// Objective editor without the already selected catalog objectives
    #[must_use]
    pub fn objective_editor(&self) -> ObjectiveEditor {
        ObjectiveEditor::new(
            self.catalog,
            self.state.objective_titles(),
            *self.state.limits(),
        )
    }

    /// Question editor for one objective
    ///
    /// # Errors
    /// `WizardError::NotFound` if no objective has that title.
    pub fn question_editor(&self, objective: &Text) -> Result<QuestionEditor, WizardError> {
        let parent = self
            .state
            .objective(objective)
            .ok_or_else(|| WizardError::NotFound(format!("objective {}", objective.raw())))?;
        let selected = parent.questions.iter().map(|q| q.text.clone()).collect();
        Ok(QuestionEditor::new(
            self.catalog,
            selected,
            *self.state.limits(),
        ))
    }

    /// Metric editor for one question
    ///
    /// # Errors
    /// `WizardError::NotFound` if the objective or question does not exist.
    pub fn metric_editor(
        &self,
        objective: &Text,
        question: &Text,
    ) -> Result<MetricEditor, WizardError> {
        let parent = self
            .state
            .question(objective, question)
            .ok_or_else(|| WizardError::NotFound(format!("question {}", question.raw())))?;
        let selected = parent.metrics.iter().map(|m| m.name.clone()).collect();
        Ok(MetricEditor::new(
            self.catalog,
            selected,
            *self.state.limits(),
        ))
    }

    /// Summary for the review step
    #[must_use]
    pub fn review(&self, translator: &dyn Translator) -> Option<ReviewSummary> {
        ReviewSummary::build(&self.state, translator)
    }

    /// Finalize the draft through `finalizer`
    ///
    /// # Errors
    /// See [`Finalizer::submit`].
    pub async fn submit(&mut self, finalizer: &Finalizer) -> Result<Plan, SubmissionError> {
        finalizer.submit(&mut self.state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockProjectDirectory;
    use gqm_editors::NodeEditor;
    use gqm_model::{ObjectiveDraft, PlanBasics, ProjectRef, TranslationKey};

    fn basics() -> PlanBasics {
        PlanBasics::new("Q1 Plan", ProjectRef::new("proj-1", "Atlas"), "Ana")
    }

    #[test]
    fn objective_editor_hides_selected_entries() {
        let mut wizard = PlanWizard::new(Catalog::builtin(), FieldLimits::default());
        wizard.dispatch(WizardAction::SetBasics(basics())).unwrap();

        let mut editor = wizard.objective_editor();
        editor.open(None);
        editor.select("objective.improveQuality").unwrap();
        let objective = editor.create().unwrap();
        wizard.dispatch(WizardAction::AddObjective(objective)).unwrap();

        let mut editor = wizard.objective_editor();
        editor.open(None);
        assert!(editor
            .predefined_options()
            .iter()
            .all(|o| o.title.raw() != "objective.improveQuality"));
    }

    #[test]
    fn question_editor_needs_existing_objective() {
        let wizard = PlanWizard::new(Catalog::builtin(), FieldLimits::default());
        let missing = Text::Key(TranslationKey::from_static("objective.reduceCosts"));
        assert!(matches!(
            wizard.question_editor(&missing),
            Err(WizardError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn hints_are_loaded_but_not_merged() {
        let mut directory = MockProjectDirectory::new();
        directory
            .expect_objective_suggestions()
            .withf(|id| id == "proj-1")
            .times(1)
            .returning(|_| Ok(vec!["Cut escaped defects".to_string()]));

        let mut wizard = PlanWizard::new(Catalog::builtin(), FieldLimits::default());
        assert!(wizard.load_objective_hints(&directory).await.is_err());

        wizard.dispatch(WizardAction::SetBasics(basics())).unwrap();
        wizard.load_objective_hints(&directory).await.unwrap();
        assert_eq!(wizard.state().objective_hints().len(), 1);
        assert!(wizard.state().objectives().is_empty());

        wizard
            .dispatch(WizardAction::AddObjective(ObjectiveDraft::new(Text::literal(
                "Cut escaped defects",
            ))))
            .unwrap();
        assert_eq!(wizard.state().objectives().len(), 1);
    }

    #[tokio::test]
    async fn project_directory_failure_leaves_state() {
        let mut directory = MockProjectDirectory::new();
        directory
            .expect_list_projects()
            .returning(|| Err(crate::StoreError::Unavailable("down".into())));

        let mut wizard = PlanWizard::new(Catalog::builtin(), FieldLimits::default());
        let err = wizard.load_projects(&directory).await.unwrap_err();
        assert!(matches!(err, WizardError::Collaborator(_)));
        assert!(wizard.state().projects().is_empty());
    }
}
