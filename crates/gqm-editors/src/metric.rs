//! Metric editor: a two-step sub-wizard
//!
//! ```text
//! Pick ──select──▶ Predefined ──create──▶ done
//!   │
//!   └─custom──▶ Details ──next (fields valid)──▶ Measurements ──create (≥1)──▶ done
//!                  ▲                                  │
//!                  └──────────────back────────────────┘
//! ```
//!
//! Measurements are added through the nested [`MeasurementEditor`], which is
//! reopened against the current acronym set each time.

use crate::error::EditorError;
use crate::measurement::MeasurementEditor;
use crate::mode::{EditorMode, Picker};
use crate::NodeEditor;
use gqm_catalog::Catalog;
use gqm_model::{
    ControlRange, Field, FieldErrors, FieldIssue, FieldLimits, MeasurementDraft, MetricDraft, Text,
};
use serde::{Deserialize, Serialize};

/// Step of the custom metric form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStep {
    /// Scalar metric fields
    #[default]
    Details,
    /// Measurement list
    Measurements,
}

fn name_of(m: &MetricDraft) -> &str {
    m.name.raw()
}

/// Create/edit form for one metric
#[derive(Debug, Clone)]
pub struct MetricEditor {
    open: bool,
    mode: EditorMode,
    step: MetricStep,
    catalog_options: Vec<MetricDraft>,
    picker: Picker<MetricDraft>,
    form: MetricDraft,
    /// Measurement being edited through the nested editor, by index
    editing_measurement: Option<usize>,
    measurement_editor: MeasurementEditor,
    siblings: Vec<Text>,
    editing_name: Option<Text>,
    limits: FieldLimits,
}

impl MetricEditor {
    /// Metric editor over the catalog; `selected` are the names already
    /// attached to the question
    #[must_use]
    pub fn new(catalog: &Catalog, selected: Vec<Text>, limits: FieldLimits) -> Self {
        Self {
            open: false,
            mode: EditorMode::Pick,
            step: MetricStep::Details,
            catalog_options: catalog.metrics().to_vec(),
            picker: Picker::default(),
            form: MetricDraft::default(),
            editing_measurement: None,
            measurement_editor: MeasurementEditor::new(catalog, limits),
            siblings: selected,
            editing_name: None,
            limits,
        }
    }

    /// Start a session; editing always goes through the custom form
    pub fn open(&mut self, editing: Option<&MetricDraft>) {
        self.open = true;
        self.step = MetricStep::Details;
        self.editing_measurement = None;
        self.measurement_editor.cancel();
        self.editing_name = editing.map(|m| m.name.clone());
        self.form = editing.cloned().unwrap_or_default();
        self.mode = if editing.is_some() {
            EditorMode::Custom
        } else {
            EditorMode::Pick
        };
        let options = self
            .catalog_options
            .iter()
            .filter(|m| !self.siblings.contains(&m.name))
            .cloned()
            .collect();
        self.picker = Picker::new(options);
    }

    #[inline]
    #[must_use]
    pub fn predefined_options(&self) -> &[MetricDraft] {
        self.picker.options()
    }

    /// Select a catalog metric (with its default measurements)
    ///
    /// # Errors
    /// - `EditorError::Closed` without an open session
    /// - `EditorError::UnknownOption` if the key is not offered
    pub fn select(&mut self, key: &str) -> Result<(), EditorError> {
        if !self.open {
            return Err(EditorError::Closed);
        }
        if !self.picker.select(key, name_of) {
            return Err(EditorError::UnknownOption(key.to_string()));
        }
        self.mode = EditorMode::Predefined;
        Ok(())
    }

    pub fn choose_custom(&mut self) {
        self.picker.clear();
        self.mode = EditorMode::Custom;
        self.step = MetricStep::Details;
    }

    pub fn back_to_pick(&mut self) {
        self.picker.clear();
        self.mode = EditorMode::Pick;
        self.step = MetricStep::Details;
    }

    #[inline]
    #[must_use]
    pub fn step(&self) -> MetricStep {
        self.step
    }

    #[inline]
    #[must_use]
    pub fn form(&self) -> &MetricDraft {
        &self.form
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.form.name = Text::literal(value);
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.form.description = Text::literal(value);
    }

    pub fn set_mnemonic(&mut self, value: impl Into<String>) {
        self.form.mnemonic = value.into();
    }

    pub fn set_formula(&mut self, value: impl Into<String>) {
        self.form.formula = value.into();
    }

    pub fn set_control_range(&mut self, min: f64, max: f64) {
        self.form.control_range = ControlRange { min, max };
    }

    pub fn set_analysis_procedure(&mut self, value: impl Into<String>) {
        self.form.analysis_procedure = Text::literal(value);
    }

    pub fn set_analysis_frequency(&mut self, value: impl Into<String>) {
        self.form.analysis_frequency = Text::literal(value);
    }

    pub fn set_analysis_responsible(&mut self, value: impl Into<String>) {
        self.form.analysis_responsible = value.into();
    }

    /// Issues on the scalar fields of the first step
    #[must_use]
    pub fn details_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let (m, l) = (&self.form, &self.limits);

        errors.check_required_text(Field::MetricName, &m.name, l.title_max);
        errors.check_required_text(Field::MetricDescription, &m.description, l.text_max);
        errors.check_required(Field::MetricMnemonic, &m.mnemonic, l.mnemonic_max);
        errors.check_required(Field::MetricFormula, &m.formula, l.text_max);
        errors.check_text_len(Field::AnalysisProcedure, &m.analysis_procedure, l.text_max);
        errors.check_text_len(Field::AnalysisFrequency, &m.analysis_frequency, l.label_max);
        errors.check_len(Field::AnalysisResponsible, &m.analysis_responsible, l.label_max);
        if !m.control_range.is_valid() {
            errors.add(Field::MetricControlRange, FieldIssue::InvalidRange);
        }

        let own = self.editing_name.as_ref();
        let candidate = match &m.name {
            Text::Literal(text) => Text::literal(text.trim()),
            key @ Text::Key(_) => key.clone(),
        };
        if !errors.has(Field::MetricName)
            && self.siblings.iter().any(|s| s == &candidate && Some(s) != own)
        {
            errors.add(
                Field::MetricName,
                FieldIssue::Duplicate {
                    name: candidate.raw().to_string(),
                },
            );
        }
        errors
    }

    /// Whether forward navigation to the measurement step is enabled
    #[inline]
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.open
            && self.mode == EditorMode::Custom
            && self.step == MetricStep::Details
            && self.details_errors().is_empty()
    }

    /// Move from the details step to the measurement step
    ///
    /// # Errors
    /// - `EditorError::Closed` / `EditorError::WrongMode` outside the custom form
    /// - `EditorError::Invalid` while required fields are missing
    pub fn next(&mut self) -> Result<(), EditorError> {
        self.require_custom()?;
        let errors = self.details_errors();
        if !errors.is_empty() {
            return Err(EditorError::Invalid(errors));
        }
        self.step = MetricStep::Measurements;
        Ok(())
    }

    /// Back to the details step; always allowed
    pub fn back(&mut self) {
        self.step = MetricStep::Details;
    }

    fn require_custom(&self) -> Result<(), EditorError> {
        if !self.open {
            return Err(EditorError::Closed);
        }
        if self.mode != EditorMode::Custom {
            return Err(EditorError::WrongMode {
                expected: EditorMode::Custom,
                actual: self.mode,
            });
        }
        Ok(())
    }

    /// Measurements collected so far
    #[inline]
    #[must_use]
    pub fn measurements(&self) -> &[MeasurementDraft] {
        &self.form.measurements
    }

    /// Open the nested editor, for a new measurement or the one at `index`
    ///
    /// # Errors
    /// - `EditorError::WrongMode` outside the custom form
    /// - `EditorError::NoSuchItem` for an out-of-range index
    pub fn open_measurement_editor(&mut self, index: Option<usize>) -> Result<(), EditorError> {
        self.require_custom()?;
        let editing = match index {
            Some(i) => Some(
                self.form
                    .measurements
                    .get(i)
                    .ok_or(EditorError::NoSuchItem(i))?
                    .clone(),
            ),
            None => None,
        };
        let siblings = self.form.acronyms().map(str::to_string).collect();
        self.editing_measurement = index;
        self.measurement_editor.open(siblings, editing.as_ref());
        Ok(())
    }

    /// Nested measurement editor
    #[inline]
    pub fn measurement_editor(&mut self) -> &mut MeasurementEditor {
        &mut self.measurement_editor
    }

    /// Take the nested editor's measurement into the list
    ///
    /// # Errors
    /// Whatever the nested editor's `create` reports; the list is untouched.
    pub fn commit_measurement(&mut self) -> Result<(), EditorError> {
        let measurement = self.measurement_editor.create()?;
        match self.editing_measurement.take() {
            Some(i) if i < self.form.measurements.len() => self.form.measurements[i] = measurement,
            _ => self.form.measurements.push(measurement),
        }
        Ok(())
    }

    /// Close the nested editor without changes
    pub fn cancel_measurement(&mut self) {
        self.editing_measurement = None;
        self.measurement_editor.cancel();
    }

    /// Drop the measurement at `index`
    ///
    /// # Errors
    /// - `EditorError::NoSuchItem` for an out-of-range index
    pub fn remove_measurement(&mut self, index: usize) -> Result<MeasurementDraft, EditorError> {
        if index >= self.form.measurements.len() {
            return Err(EditorError::NoSuchItem(index));
        }
        Ok(self.form.measurements.remove(index))
    }

    /// All issues blocking `create`
    #[must_use]
    pub fn errors(&self) -> FieldErrors {
        match self.mode {
            EditorMode::Pick => {
                let mut errors = FieldErrors::new();
                errors.add(Field::MetricName, FieldIssue::Required);
                errors
            }
            EditorMode::Predefined => {
                let mut errors = FieldErrors::new();
                if self.picker.selected().is_none() {
                    errors.add(Field::MetricName, FieldIssue::Required);
                }
                errors
            }
            EditorMode::Custom => {
                let mut errors = self.details_errors();
                if self.step != MetricStep::Measurements || self.form.measurements.is_empty() {
                    errors.add(Field::Measurements, FieldIssue::AtLeastOne);
                }
                errors
            }
        }
    }

    fn reset(&mut self) {
        self.open = false;
        self.mode = EditorMode::Pick;
        self.step = MetricStep::Details;
        self.form = MetricDraft::default();
        self.editing_measurement = None;
        self.editing_name = None;
        self.measurement_editor.cancel();
        self.picker.clear();
    }
}

impl NodeEditor for MetricEditor {
    type Output = MetricDraft;

    fn mode(&self) -> EditorMode {
        self.mode
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn can_create(&self) -> bool {
        self.open && self.errors().is_empty()
    }

    fn create(&mut self) -> Result<MetricDraft, EditorError> {
        if !self.open {
            return Err(EditorError::Closed);
        }
        let errors = self.errors();
        if !errors.is_empty() {
            tracing::debug!(%errors, step = ?self.step, "metric create blocked");
            return Err(EditorError::Invalid(errors));
        }
        let mut metric = match self.mode {
            EditorMode::Predefined => self
                .picker
                .selected()
                .cloned()
                .ok_or(EditorError::WrongMode {
                    expected: EditorMode::Predefined,
                    actual: self.mode,
                })?,
            _ => self.form.clone(),
        };
        metric.mnemonic = metric.mnemonic.trim().to_string();
        if let Text::Literal(name) = &metric.name {
            metric.name = Text::literal(name.trim());
        }
        self.reset();
        Ok(metric)
    }

    fn cancel(&mut self) {
        self.reset();
    }
}
