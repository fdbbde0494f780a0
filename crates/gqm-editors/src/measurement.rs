//! Measurement editor
//!
//! The acronym must be unique among the measurements of the parent metric.
//! A clash is reported as a field issue on the acronym and keeps `create`
//! disabled; it never overwrites the sibling.

use crate::error::EditorError;
use crate::mode::{EditorMode, Picker};
use crate::NodeEditor;
use gqm_catalog::Catalog;
use gqm_model::validation::acronym_taken;
use gqm_model::{Field, FieldErrors, FieldIssue, FieldLimits, MeasurementDraft, MeasurementScale, Text};

fn acronym_of(m: &MeasurementDraft) -> &str {
    &m.acronym
}

/// Create/edit form for one measurement
#[derive(Debug, Clone)]
pub struct MeasurementEditor {
    open: bool,
    mode: EditorMode,
    catalog_options: Vec<MeasurementDraft>,
    picker: Picker<MeasurementDraft>,
    form: MeasurementDraft,
    siblings: Vec<String>,
    editing_acronym: Option<String>,
    limits: FieldLimits,
}

impl MeasurementEditor {
    /// Editor over the catalog measurements
    #[must_use]
    pub fn new(catalog: &Catalog, limits: FieldLimits) -> Self {
        Self::with_options(catalog.measurements().to_vec(), limits)
    }

    #[must_use]
    pub fn with_options(options: Vec<MeasurementDraft>, limits: FieldLimits) -> Self {
        Self {
            open: false,
            mode: EditorMode::Pick,
            catalog_options: options,
            picker: Picker::default(),
            form: MeasurementDraft::default(),
            siblings: Vec::new(),
            editing_acronym: None,
            limits,
        }
    }

    /// Start a session against the current sibling acronyms
    ///
    /// `siblings` holds the acronyms of every measurement already under the
    /// metric, including the one being edited.
    pub fn open(&mut self, siblings: Vec<String>, editing: Option<&MeasurementDraft>) {
        self.open = true;
        self.siblings = siblings;
        self.editing_acronym = editing.map(|m| m.acronym.clone());
        self.form = editing.cloned().unwrap_or_default();
        self.mode = if editing.is_some() {
            EditorMode::Custom
        } else {
            EditorMode::Pick
        };

        let taken: Vec<&str> = self.siblings.iter().map(String::as_str).collect();
        let options = self
            .catalog_options
            .iter()
            .filter(|m| !acronym_taken(taken.iter().copied(), &m.acronym, None))
            .cloned()
            .collect();
        self.picker = Picker::new(options);
    }

    /// Catalog measurements whose acronym is still free
    #[inline]
    #[must_use]
    pub fn predefined_options(&self) -> &[MeasurementDraft] {
        self.picker.options()
    }

    /// Select a catalog measurement by acronym
    ///
    /// # Errors
    /// - `EditorError::Closed` without an open session
    /// - `EditorError::UnknownOption` if the acronym is not offered
    pub fn select(&mut self, acronym: &str) -> Result<(), EditorError> {
        if !self.open {
            return Err(EditorError::Closed);
        }
        if !self.picker.select(acronym, acronym_of) {
            return Err(EditorError::UnknownOption(acronym.to_string()));
        }
        self.mode = EditorMode::Predefined;
        Ok(())
    }

    pub fn choose_custom(&mut self) {
        self.picker.clear();
        self.mode = EditorMode::Custom;
    }

    pub fn back_to_pick(&mut self) {
        self.picker.clear();
        self.mode = EditorMode::Pick;
    }

    #[inline]
    #[must_use]
    pub fn form(&self) -> &MeasurementDraft {
        &self.form
    }

    pub fn set_entity(&mut self, value: impl Into<String>) {
        self.form.entity = Text::literal(value);
    }

    pub fn set_acronym(&mut self, value: impl Into<String>) {
        self.form.acronym = value.into();
    }

    pub fn set_properties(&mut self, value: impl Into<String>) {
        self.form.properties = Text::literal(value);
    }

    pub fn set_unit(&mut self, value: impl Into<String>) {
        self.form.unit = Text::literal(value);
    }

    pub fn set_scale(&mut self, scale: MeasurementScale) {
        self.form.scale = scale;
    }

    pub fn set_procedure(&mut self, value: impl Into<String>) {
        self.form.procedure = Text::literal(value);
    }

    pub fn set_frequency(&mut self, value: impl Into<String>) {
        self.form.frequency = Text::literal(value);
    }

    /// Blank clears the optional responsible
    pub fn set_responsible(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.form.responsible = if value.trim().is_empty() {
            None
        } else {
            Some(value)
        };
    }

    fn candidate(&self) -> Option<&MeasurementDraft> {
        match self.mode {
            EditorMode::Pick => None,
            EditorMode::Predefined => self.picker.selected(),
            EditorMode::Custom => Some(&self.form),
        }
    }

    /// Current field issues
    #[must_use]
    pub fn errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let Some(m) = self.candidate() else {
            errors.add(Field::MeasurementAcronym, FieldIssue::Required);
            return errors;
        };
        let l = &self.limits;

        errors.check_required_text(Field::MeasurementEntity, &m.entity, l.title_max);
        errors.check_required(Field::MeasurementAcronym, &m.acronym, l.acronym_max);
        errors.check_required_text(Field::MeasurementProperties, &m.properties, l.text_max);
        errors.check_required_text(Field::MeasurementUnit, &m.unit, l.label_max);
        errors.check_required_text(Field::MeasurementProcedure, &m.procedure, l.text_max);
        errors.check_required_text(Field::MeasurementFrequency, &m.frequency, l.label_max);
        if let Some(responsible) = &m.responsible {
            errors.check_len(Field::MeasurementResponsible, responsible, l.label_max);
        }

        let siblings = self.siblings.iter().map(String::as_str);
        if acronym_taken(siblings, &m.acronym, self.editing_acronym.as_deref()) {
            errors.add(
                Field::MeasurementAcronym,
                FieldIssue::DuplicateAcronym {
                    acronym: m.acronym.trim().to_string(),
                },
            );
        }
        errors
    }

    fn reset(&mut self) {
        self.open = false;
        self.mode = EditorMode::Pick;
        self.form = MeasurementDraft::default();
        self.siblings.clear();
        self.editing_acronym = None;
        self.picker.clear();
    }
}

impl NodeEditor for MeasurementEditor {
    type Output = MeasurementDraft;

    fn mode(&self) -> EditorMode {
        self.mode
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn can_create(&self) -> bool {
        self.open && self.errors().is_empty()
    }

    fn create(&mut self) -> Result<MeasurementDraft, EditorError> {
        if !self.open {
            return Err(EditorError::Closed);
        }
        let errors = self.errors();
        if !errors.is_empty() {
            tracing::debug!(%errors, "measurement create blocked");
            return Err(EditorError::Invalid(errors));
        }
        let mut measurement = self.candidate().cloned().ok_or(EditorError::WrongMode {
            expected: EditorMode::Custom,
            actual: self.mode,
        })?;
        measurement.acronym = measurement.acronym.trim().to_string();
        self.reset();
        Ok(measurement)
    }

    fn cancel(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> MeasurementEditor {
        MeasurementEditor::new(Catalog::builtin(), FieldLimits::default())
    }

    fn fill(editor: &mut MeasurementEditor, acronym: &str) {
        editor.choose_custom();
        editor.set_entity("Deployment");
        editor.set_acronym(acronym);
        editor.set_properties("Duration");
        editor.set_unit("minutes");
        editor.set_scale(MeasurementScale::Continuous);
        editor.set_procedure("Read pipeline logs");
        editor.set_frequency("Per deployment");
    }

    #[test]
    fn custom_measurement_round() {
        let mut editor = editor();
        editor.open(vec![], None);
        fill(&mut editor, " DPL ");
        editor.set_responsible("  ");
        let m = editor.create().unwrap();
        assert_eq!(m.acronym, "DPL");
        assert_eq!(m.entity, Text::literal("Deployment"));
        assert!(m.responsible.is_none());
    }

    #[test]
    fn missing_fields_block_create() {
        let mut editor = editor();
        editor.open(vec![], None);
        editor.choose_custom();
        editor.set_acronym("ABCD");
        let errors = editor.errors();
        assert!(errors.has(Field::MeasurementEntity));
        assert_eq!(
            errors.get(Field::MeasurementAcronym),
            Some(&FieldIssue::TooLong { max: 3, actual: 4 })
        );
        assert!(!editor.can_create());
    }

    #[test]
    fn duplicate_acronym_is_a_field_issue() {
        let mut editor = editor();
        editor.open(vec!["LDT".to_string()], None);
        fill(&mut editor, "LDT");
        assert_eq!(
            editor.errors().get(Field::MeasurementAcronym),
            Some(&FieldIssue::DuplicateAcronym {
                acronym: "LDT".to_string()
            })
        );
        assert!(!editor.can_create());
        assert!(matches!(editor.create(), Err(EditorError::Invalid(_))));
        assert!(editor.is_open());
    }

    #[test]
    fn editing_keeps_own_acronym() {
        let existing = MeasurementDraft {
            responsible: Some("Ana".to_string()),
            ..MeasurementDraft::new(Text::literal("Deployment"), "DPL")
        };
        let mut editor = editor();
        editor.open(vec!["DPL".to_string(), "CYC".to_string()], Some(&existing));
        fill(&mut editor, "DPL");
        assert!(editor.can_create());

        editor.set_acronym("CYC");
        assert!(!editor.can_create());
    }

    #[test]
    fn predefined_options_skip_taken_acronyms() {
        let mut editor = editor();
        editor.open(vec!["SDT".to_string()], None);
        assert!(editor.predefined_options().iter().all(|m| m.acronym != "SDT"));
        assert!(matches!(editor.select("SDT"), Err(EditorError::UnknownOption(_))));

        editor.select("EDT").unwrap();
        let m = editor.create().unwrap();
        assert!(m.entity.is_key());
        assert_eq!(m.acronym, "EDT");
    }

    #[test]
    fn pick_mode_cannot_create() {
        let mut editor = editor();
        editor.open(vec![], None);
        assert!(!editor.can_create());
        assert!(matches!(editor.create(), Err(EditorError::Invalid(_))));
    }
}
