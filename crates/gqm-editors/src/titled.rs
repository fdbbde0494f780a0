//! Objective and question editors
//!
//! Both levels have a single text field and a child list the editor never
//! touches, so one generic editor serves both.

use crate::error::EditorError;
use crate::mode::{EditorMode, Picker};
use crate::NodeEditor;
use gqm_catalog::Catalog;
use gqm_model::{Field, FieldErrors, FieldIssue, FieldLimits, ObjectiveDraft, QuestionDraft, Text};

/// Draft node identified by a single text field
pub trait TitledDraft: Clone + Default {
    /// Form field of the title
    const FIELD: Field;

    fn title(&self) -> &Text;

    fn set_title(&mut self, title: Text);
}

impl TitledDraft for ObjectiveDraft {
    const FIELD: Field = Field::ObjectiveTitle;

    fn title(&self) -> &Text {
        &self.title
    }

    fn set_title(&mut self, title: Text) {
        self.title = title;
    }
}

impl TitledDraft for QuestionDraft {
    const FIELD: Field = Field::QuestionText;

    fn title(&self) -> &Text {
        &self.text
    }

    fn set_title(&mut self, title: Text) {
        self.text = title;
    }
}

fn title_of<N: TitledDraft>(node: &N) -> &str {
    node.title().raw()
}

/// Editor for a node with a single title field
#[derive(Debug, Clone)]
pub struct TitledEditor<N: TitledDraft> {
    open: bool,
    mode: EditorMode,
    picker: Picker<N>,
    catalog_options: Vec<N>,
    title: String,
    editing: Option<N>,
    siblings: Vec<Text>,
    limits: FieldLimits,
}

/// Objective editor
pub type ObjectiveEditor = TitledEditor<ObjectiveDraft>;

/// Question editor
pub type QuestionEditor = TitledEditor<QuestionDraft>;

impl<N: TitledDraft> TitledEditor<N> {
    /// Editor offering `options`, with `siblings` as the natural keys already
    /// present under the same parent
    #[must_use]
    pub fn with_options(options: Vec<N>, siblings: Vec<Text>, limits: FieldLimits) -> Self {
        Self {
            open: false,
            mode: EditorMode::Pick,
            picker: Picker::default(),
            catalog_options: options,
            title: String::new(),
            editing: None,
            siblings,
            limits,
        }
    }

    /// Start a session; `editing` prefills the form from an existing node
    ///
    /// Keyed nodes reopen in predefined mode with their entry selected,
    /// literal ones in custom mode with their text.
    pub fn open(&mut self, editing: Option<&N>) {
        self.open = true;
        self.title.clear();
        self.picker = Picker::new(self.available_options());
        self.editing = editing.cloned();
        self.mode = EditorMode::Pick;

        if let Some(node) = editing {
            match node.title() {
                Text::Key(_) => {
                    self.picker.ensure_selected(node.clone(), title_of);
                    self.mode = EditorMode::Predefined;
                }
                Text::Literal(text) => {
                    self.title.clone_from(text);
                    self.mode = EditorMode::Custom;
                }
            }
        }
        tracing::debug!(field = ?N::FIELD, mode = ?self.mode, "editor opened");
    }

    fn available_options(&self) -> Vec<N> {
        self.catalog_options
            .iter()
            .filter(|o| !self.siblings.contains(o.title()))
            .cloned()
            .collect()
    }

    /// Catalog entries not already used under the same parent
    #[inline]
    #[must_use]
    pub fn predefined_options(&self) -> &[N] {
        self.picker.options()
    }

    /// Select a catalog entry by key and switch to predefined mode
    ///
    /// # Errors
    /// - `EditorError::Closed` without an open session
    /// - `EditorError::UnknownOption` if the key is not offered
    pub fn select(&mut self, key: &str) -> Result<(), EditorError> {
        if !self.open {
            return Err(EditorError::Closed);
        }
        if !self.picker.select(key, title_of) {
            return Err(EditorError::UnknownOption(key.to_string()));
        }
        self.mode = EditorMode::Predefined;
        Ok(())
    }

    /// Switch to the free-text form
    pub fn choose_custom(&mut self) {
        self.picker.clear();
        self.mode = EditorMode::Custom;
    }

    /// Return to the catalog/custom choice
    pub fn back_to_pick(&mut self) {
        self.picker.clear();
        self.mode = EditorMode::Pick;
    }

    /// Update the custom title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current field issues
    #[must_use]
    pub fn errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match self.mode {
            EditorMode::Pick => errors.add(N::FIELD, FieldIssue::Required),
            EditorMode::Predefined => {
                if self.picker.selected().is_none() {
                    errors.add(N::FIELD, FieldIssue::Required);
                }
            }
            EditorMode::Custom => {
                errors.check_required(N::FIELD, &self.title, self.limits.title_max);
                let candidate = Text::literal(self.title.trim());
                if !errors.has(N::FIELD) && self.clashes(&candidate) {
                    errors.add(
                        N::FIELD,
                        FieldIssue::Duplicate {
                            name: self.title.trim().to_string(),
                        },
                    );
                }
            }
        }
        errors
    }

    fn clashes(&self, candidate: &Text) -> bool {
        let own = self.editing.as_ref().map(TitledDraft::title);
        self.siblings
            .iter()
            .any(|s| s == candidate && Some(s) != own)
    }

    fn build(&self) -> Option<N> {
        let title = match self.mode {
            EditorMode::Pick => return None,
            EditorMode::Predefined => self.picker.selected()?.title().clone(),
            EditorMode::Custom => Text::literal(self.title.trim()),
        };
        let mut node = match (&self.editing, self.mode) {
            // editing keeps the children; a fresh pick brings the entry as is
            (Some(existing), _) => existing.clone(),
            (None, EditorMode::Predefined) => self.picker.selected()?.clone(),
            (None, _) => N::default(),
        };
        node.set_title(title);
        Some(node)
    }

    fn reset(&mut self) {
        self.open = false;
        self.mode = EditorMode::Pick;
        self.title.clear();
        self.editing = None;
        self.picker.clear();
    }
}

impl TitledEditor<ObjectiveDraft> {
    /// Objective editor over the catalog; `selected` are titles already in
    /// the plan
    #[must_use]
    pub fn new(catalog: &Catalog, selected: Vec<Text>, limits: FieldLimits) -> Self {
        Self::with_options(catalog.objectives().to_vec(), selected, limits)
    }
}

impl TitledEditor<QuestionDraft> {
    /// Question editor over the catalog; `selected` are the texts already
    /// attached to the objective
    #[must_use]
    pub fn new(catalog: &Catalog, selected: Vec<Text>, limits: FieldLimits) -> Self {
        Self::with_options(catalog.questions().to_vec(), selected, limits)
    }
}

impl<N: TitledDraft> NodeEditor for TitledEditor<N> {
    type Output = N;

    fn mode(&self) -> EditorMode {
        self.mode
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn can_create(&self) -> bool {
        self.open && self.errors().is_empty()
    }

    fn create(&mut self) -> Result<N, EditorError> {
        if !self.open {
            return Err(EditorError::Closed);
        }
        let errors = self.errors();
        if !errors.is_empty() {
            tracing::debug!(field = ?N::FIELD, %errors, "create blocked");
            return Err(EditorError::Invalid(errors));
        }
        let node = self.build().ok_or(EditorError::WrongMode {
            expected: EditorMode::Custom,
            actual: self.mode,
        })?;
        self.reset();
        Ok(node)
    }

    fn cancel(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqm_model::TranslationKey;

    fn objective_editor(selected: Vec<Text>) -> ObjectiveEditor {
        ObjectiveEditor::new(Catalog::builtin(), selected, FieldLimits::default())
    }

    #[test]
    fn predefined_emits_catalog_entry_verbatim() {
        let mut editor = objective_editor(vec![]);
        editor.open(None);
        assert!(!editor.can_create());

        editor.select("objective.reduceCosts").unwrap();
        assert_eq!(editor.mode(), EditorMode::Predefined);
        let objective = editor.create().unwrap();
        assert_eq!(
            objective.title,
            Text::Key(TranslationKey::from_static("objective.reduceCosts"))
        );
        assert!(!editor.is_open());
    }

    #[test]
    fn selected_entries_are_not_offered() {
        let taken = Text::Key(TranslationKey::from_static("objective.improveQuality"));
        let mut editor = objective_editor(vec![taken.clone()]);
        editor.open(None);
        assert!(editor.predefined_options().iter().all(|o| o.title != taken));
        assert_eq!(
            editor.select("objective.improveQuality"),
            Err(EditorError::UnknownOption("objective.improveQuality".to_string()))
        );
    }

    #[test]
    fn custom_requires_text() {
        let mut editor = objective_editor(vec![]);
        editor.open(None);
        editor.choose_custom();
        editor.set_title("   ");
        assert_eq!(editor.errors().get(Field::ObjectiveTitle), Some(&FieldIssue::Required));

        let err = editor.create().unwrap_err();
        assert!(err.field_errors().is_some());
        assert!(editor.is_open());

        editor.set_title("  Ship faster ");
        let objective = editor.create().unwrap();
        assert_eq!(objective.title, Text::literal("Ship faster"));
    }

    #[test]
    fn custom_rejects_duplicate_sibling() {
        let mut editor = QuestionEditor::new(
            Catalog::builtin(),
            vec![Text::literal("Why?")],
            FieldLimits::default(),
        );
        editor.open(None);
        editor.choose_custom();
        editor.set_title("Why?");
        assert!(matches!(
            editor.errors().get(Field::QuestionText),
            Some(FieldIssue::Duplicate { .. })
        ));
    }

    #[test]
    fn custom_length_limit() {
        let mut editor = ObjectiveEditor::new(
            Catalog::builtin(),
            vec![],
            FieldLimits::default().with_title_max(5),
        );
        editor.open(None);
        editor.choose_custom();
        editor.set_title("Too long title");
        assert_eq!(
            editor.errors().get(Field::ObjectiveTitle),
            Some(&FieldIssue::TooLong { max: 5, actual: 14 })
        );
    }

    #[test]
    fn editing_keeps_children_and_allows_own_title() {
        let existing = ObjectiveDraft::new(Text::literal("Quality"))
            .with_question(QuestionDraft::new(Text::literal("Why?")));
        let mut editor = objective_editor(vec![existing.title.clone()]);
        editor.open(Some(&existing));
        assert_eq!(editor.mode(), EditorMode::Custom);
        assert_eq!(editor.title(), "Quality");
        assert!(editor.can_create());

        editor.set_title("Quality first");
        let edited = editor.create().unwrap();
        assert_eq!(edited.title, Text::literal("Quality first"));
        assert_eq!(edited.questions.len(), 1);
    }

    #[test]
    fn editing_keyed_node_reopens_predefined() {
        let existing = ObjectiveDraft::new(Text::Key(TranslationKey::from_static(
            "objective.improveQuality",
        )));
        let mut editor = objective_editor(vec![existing.title.clone()]);
        editor.open(Some(&existing));
        assert_eq!(editor.mode(), EditorMode::Predefined);
        assert_eq!(editor.create().unwrap(), existing);
    }

    #[test]
    fn cancel_discards_state() {
        let mut editor = objective_editor(vec![]);
        editor.open(None);
        editor.choose_custom();
        editor.set_title("Draft text");
        editor.cancel();
        assert!(!editor.is_open());
        assert_eq!(editor.create(), Err(EditorError::Closed));

        editor.open(None);
        assert_eq!(editor.title(), "");
        assert_eq!(editor.mode(), EditorMode::Pick);
    }
}
