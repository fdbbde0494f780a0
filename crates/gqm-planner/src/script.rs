//! Scripted authoring sessions
//!
//! A script describes one plan the way a user would build it in the
//! wizard. Every node is either a catalog pick (`catalog: <key>`) or a
//! custom entry:
//!
//! ```yaml
//! basics:
//!   planName: Q1 Delivery Plan
//!   project: proj-1
//!   responsible: Ana
//! projects:
//!   - id: proj-1
//!     name: Atlas
//! objectives:
//!   - catalog: objective.improveQuality
//!     questions:
//!       - text: Are releases getting more stable?
//!         metrics:
//!           - catalog: metrics.defectDensity.name
//! ```
//!
//! Replay goes through the same editors and reducer as an interactive
//! session, so every rule they enforce applies here too.

use anyhow::{bail, Context};
use gqm_catalog::Catalog;
use gqm_core::{
    Finalizer, PlanWizard, ProjectDirectory, ReviewSummary, StaticProjectDirectory, WizardAction,
    WizardStep,
};
use gqm_editors::{MeasurementEditor, MetricEditor, NodeEditor, TitledDraft, TitledEditor};
use gqm_i18n::Translator;
use gqm_model::{
    ControlRange, FieldLimits, MeasurementScale, MetricDraft, ObjectiveDraft, Plan, PlanBasics,
    ProjectRef, QuestionDraft, Text,
};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuthorScript {
    pub basics: BasicsScript,
    #[serde(default)]
    pub projects: Vec<ProjectScript>,
    #[serde(default)]
    pub objectives: Vec<ObjectiveScript>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BasicsScript {
    pub plan_name: String,
    /// Project id
    pub project: String,
    /// Filled in from `projects` when left out
    #[serde(default)]
    pub project_name: String,
    pub responsible: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectScript {
    pub id: String,
    pub name: String,
    /// Objective suggestions offered as hints for this project
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ObjectiveScript {
    pub catalog: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionScript>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuestionScript {
    pub catalog: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub metrics: Vec<MetricScript>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MetricScript {
    pub catalog: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mnemonic: String,
    #[serde(default)]
    pub formula: String,
    pub control_range: Option<ControlRange>,
    pub analysis_procedure: Option<String>,
    pub analysis_frequency: Option<String>,
    pub analysis_responsible: Option<String>,
    #[serde(default)]
    pub measurements: Vec<MeasurementScript>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MeasurementScript {
    /// Catalog acronym
    pub catalog: Option<String>,
    #[serde(default)]
    pub entity: String,
    #[serde(default)]
    pub acronym: String,
    #[serde(default)]
    pub properties: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub scale: MeasurementScale,
    #[serde(default)]
    pub procedure: String,
    #[serde(default)]
    pub frequency: String,
    pub responsible: Option<String>,
}

/// Result of a replayed script
#[derive(Debug, Clone)]
pub struct AuthorOutcome {
    /// Plan as the store persisted it
    pub plan: Plan,
    /// Review shown right before submission
    pub review: ReviewSummary,
}

fn titled<N: TitledDraft>(
    editor: &mut TitledEditor<N>,
    catalog: Option<&str>,
    custom: Option<&str>,
) -> anyhow::Result<N> {
    editor.open(None);
    match (catalog, custom) {
        (Some(key), _) => editor.select(key)?,
        (None, Some(text)) => {
            editor.choose_custom();
            editor.set_title(text);
        }
        (None, None) => bail!("either `catalog` or a custom text is required"),
    }
    Ok(editor.create()?)
}

fn measurement(editor: &mut MeasurementEditor, script: &MeasurementScript) -> anyhow::Result<()> {
    if let Some(acronym) = &script.catalog {
        editor.select(acronym)?;
        return Ok(());
    }
    editor.choose_custom();
    editor.set_entity(script.entity.as_str());
    editor.set_acronym(script.acronym.as_str());
    editor.set_properties(script.properties.as_str());
    editor.set_unit(script.unit.as_str());
    editor.set_scale(script.scale);
    editor.set_procedure(script.procedure.as_str());
    editor.set_frequency(script.frequency.as_str());
    if let Some(responsible) = &script.responsible {
        editor.set_responsible(responsible.as_str());
    }
    Ok(())
}

fn metric(editor: &mut MetricEditor, script: &MetricScript) -> anyhow::Result<MetricDraft> {
    editor.open(None);
    if let Some(key) = &script.catalog {
        if !script.measurements.is_empty() {
            tracing::warn!(key, "catalog metric keeps its own measurements; script entries ignored");
        }
        editor.select(key)?;
        return Ok(editor.create()?);
    }

    editor.choose_custom();
    editor.set_name(script.name.as_str());
    editor.set_description(script.description.as_str());
    editor.set_mnemonic(script.mnemonic.as_str());
    editor.set_formula(script.formula.as_str());
    if let Some(range) = script.control_range {
        editor.set_control_range(range.min, range.max);
    }
    if let Some(v) = &script.analysis_procedure {
        editor.set_analysis_procedure(v.as_str());
    }
    if let Some(v) = &script.analysis_frequency {
        editor.set_analysis_frequency(v.as_str());
    }
    if let Some(v) = &script.analysis_responsible {
        editor.set_analysis_responsible(v.as_str());
    }
    editor.next()?;

    for (i, m) in script.measurements.iter().enumerate() {
        add_measurement(editor, m).with_context(|| format!("measurement #{}", i + 1))?;
    }
    Ok(editor.create()?)
}

fn add_measurement(editor: &mut MetricEditor, script: &MeasurementScript) -> anyhow::Result<()> {
    editor.open_measurement_editor(None)?;
    measurement(editor.measurement_editor(), script)?;
    editor.commit_measurement()?;
    Ok(())
}

impl AuthorScript {
    /// # Errors
    /// Fails on YAML syntax errors or unknown fields.
    pub fn from_yaml_str(source: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(source).context("invalid authoring script")
    }

    /// # Errors
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml_str(&source).with_context(|| format!("in {}", path.display()))
    }

    fn directory(&self) -> StaticProjectDirectory {
        let projects = self
            .projects
            .iter()
            .map(|p| ProjectRef::new(p.id.as_str(), p.name.as_str()))
            .collect();
        self.projects
            .iter()
            .fold(StaticProjectDirectory::new(projects), |dir, p| {
                dir.with_suggestions(p.id.as_str(), p.suggestions.clone())
            })
    }

    /// Replay the script and submit the draft through `finalizer`
    ///
    /// # Errors
    /// The first refusal from an editor, the wizard or the finalizer, with
    /// the position in the script attached.
    pub async fn run(
        &self,
        catalog: &Catalog,
        limits: FieldLimits,
        finalizer: &Finalizer,
        translator: &dyn Translator,
    ) -> anyhow::Result<AuthorOutcome> {
        let mut wizard = PlanWizard::new(catalog, limits);
        let directory = self.directory();
        if !self.projects.is_empty() {
            wizard.load_projects(&directory).await?;
        }

        let basics = PlanBasics::new(
            self.basics.plan_name.as_str(),
            ProjectRef::new(self.basics.project.as_str(), self.basics.project_name.as_str()),
            self.basics.responsible.as_str(),
        );
        wizard
            .dispatch(WizardAction::SetBasics(basics))
            .context("basics")?;
        if !self.projects.is_empty() {
            self.show_hints(&mut wizard, &directory).await?;
        }

        for (i, o) in self.objectives.iter().enumerate() {
            Self::add_objective(&mut wizard, o)
                .with_context(|| format!("objective #{}", i + 1))?;
        }

        wizard
            .dispatch(WizardAction::GoTo(WizardStep::Review))
            .context("the draft is not ready for review")?;
        let review = wizard
            .review(translator)
            .context("the draft has no basics")?;
        let plan = wizard.submit(finalizer).await?;
        tracing::info!(plan_id = %plan.id, objectives = review.objectives, "script authored");
        Ok(AuthorOutcome { plan, review })
    }

    async fn show_hints(
        &self,
        wizard: &mut PlanWizard<'_>,
        directory: &dyn ProjectDirectory,
    ) -> anyhow::Result<()> {
        wizard.load_objective_hints(directory).await?;
        for hint in wizard.state().objective_hints() {
            tracing::debug!(project = %self.basics.project, hint, "objective suggestion");
        }
        Ok(())
    }

    fn add_objective(wizard: &mut PlanWizard<'_>, script: &ObjectiveScript) -> anyhow::Result<()> {
        let objective: ObjectiveDraft = titled(
            &mut wizard.objective_editor(),
            script.catalog.as_deref(),
            script.title.as_deref(),
        )?;
        let title = objective.title.clone();
        wizard.dispatch(WizardAction::AddObjective(objective))?;

        for (i, q) in script.questions.iter().enumerate() {
            Self::add_question(wizard, &title, q).with_context(|| format!("question #{}", i + 1))?;
        }
        Ok(())
    }

    fn add_question(
        wizard: &mut PlanWizard<'_>,
        objective: &Text,
        script: &QuestionScript,
    ) -> anyhow::Result<()> {
        let question: QuestionDraft = titled(
            &mut wizard.question_editor(objective)?,
            script.catalog.as_deref(),
            script.text.as_deref(),
        )?;
        let text = question.text.clone();
        wizard.dispatch(WizardAction::AddQuestion {
            objective: objective.clone(),
            question,
        })?;

        for (i, m) in script.metrics.iter().enumerate() {
            let draft = metric(&mut wizard.metric_editor(objective, &text)?, m)
                .with_context(|| format!("metric #{}", i + 1))?;
            wizard.dispatch(WizardAction::AddMetric {
                objective: objective.clone(),
                question: text.clone(),
                metric: draft,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqm_catalog::english_bundle;
    use gqm_core::InMemoryPlanStore;
    use gqm_model::has_key_prefix;
    use gqm_model::PlanPayload;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const SCRIPT: &str = r"
basics:
  planName: Q1 Delivery Plan
  project: proj-1
  responsible: Ana
projects:
  - id: proj-1
    name: Atlas
    suggestions: [Reduce escaped defects]
objectives:
  - catalog: objective.improveQuality
    questions:
      - text: Are releases getting more stable?
        metrics:
          - catalog: metrics.defectDensity.name
          - name: Escaped defects
            description: Defects found after release
            mnemonic: ESC
            formula: count(DEF where escaped)
            controlRange: [0, 3]
            measurements:
              - catalog: DEF
              - entity: Incident
                acronym: INC
                properties: Severity
                unit: level
                scale: discrete
                procedure: Incident review
                frequency: Weekly
";

    async fn run(script: &AuthorScript) -> anyhow::Result<AuthorOutcome> {
        let t = Arc::new(english_bundle().unwrap());
        let store = Arc::new(InMemoryPlanStore::new());
        let finalizer = Finalizer::new(store, t.clone());
        script
            .run(Catalog::builtin(), FieldLimits::default(), &finalizer, t.as_ref())
            .await
    }

    #[tokio::test]
    async fn replays_catalog_and_custom_nodes() {
        let script = AuthorScript::from_yaml_str(SCRIPT).unwrap();
        let outcome = run(&script).await.unwrap();

        assert_eq!(outcome.plan.counts(), [1, 1, 2, 4]);
        assert_eq!(outcome.plan.associated_project.name, "Atlas");
        assert_eq!(outcome.review.metrics, 2);

        let mut texts = Vec::new();
        PlanPayload::from(&outcome.plan).for_each_text(|s| texts.push(s.to_string()));
        assert!(texts.iter().all(|s| !has_key_prefix(s)));
    }

    #[tokio::test]
    async fn node_without_choice_is_reported_with_its_position() {
        let mut script = AuthorScript::from_yaml_str(SCRIPT).unwrap();
        script.objectives.push(ObjectiveScript::default());

        let err = run(&script).await.unwrap_err();
        assert_eq!(err.to_string(), "objective #2");
        assert!(format!("{err:#}").contains("either `catalog` or a custom text"));
    }

    #[tokio::test]
    async fn empty_draft_cannot_reach_review() {
        let mut script = AuthorScript::from_yaml_str(SCRIPT).unwrap();
        script.objectives.clear();
        let err = run(&script).await.unwrap_err();
        assert!(err.to_string().contains("not ready for review"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let source = SCRIPT.replace("responsible: Ana", "responsible: Ana\n  owner: Bob");
        assert!(AuthorScript::from_yaml_str(&source).is_err());
    }
}
