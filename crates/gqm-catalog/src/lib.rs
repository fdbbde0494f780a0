//! GQM Catalog - predefined plan building blocks
//!
//! Read-only libraries of objectives, questions, metrics (each with its
//! default measurements) and measurements. Entries are identified by
//! translation keys, never by literal text.
//!
//! Drafts have no ids, so "already selected" filtering compares natural keys
//! (title, text, name, acronym) rather than identity.
//!
//! # Example
//!
//! ```rust
//! use gqm_catalog::{Catalog, CatalogLevel};
//! use gqm_model::Text;
//!
//! let catalog = Catalog::builtin();
//! let picked = catalog.pick_objective("objective.improveQuality").unwrap();
//!
//! let remaining = catalog.available_objectives(&[picked.title.clone()]);
//! assert!(remaining.iter().all(|o| o.title != picked.title));
//! assert!(catalog.pick(CatalogLevel::Question, "questions.defectRate").is_some());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod tables;

use gqm_i18n::{BundleError, MapTranslator};
use gqm_model::{MeasurementDraft, MetricDraft, ObjectiveDraft, QuestionDraft, Text};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// English strings for every built-in key
const EN_BUNDLE: &str = include_str!("../locales/en.yaml");

static BUILTIN: Lazy<Catalog> = Lazy::new(|| Catalog {
    objectives: tables::objectives(),
    questions: tables::questions(),
    metrics: tables::metrics(),
    measurements: tables::measurements(),
});

/// Hierarchy level of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogLevel {
    Objective,
    Question,
    Metric,
    Measurement,
}

impl CatalogLevel {
    pub const ALL: [CatalogLevel; 4] = [
        CatalogLevel::Objective,
        CatalogLevel::Question,
        CatalogLevel::Metric,
        CatalogLevel::Measurement,
    ];
}

impl Display for CatalogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CatalogLevel::Objective => "objective",
            CatalogLevel::Question => "question",
            CatalogLevel::Metric => "metric",
            CatalogLevel::Measurement => "measurement",
        })
    }
}

impl FromStr for CatalogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().trim_end_matches('s') {
            "objective" => Ok(CatalogLevel::Objective),
            "question" => Ok(CatalogLevel::Question),
            "metric" => Ok(CatalogLevel::Metric),
            "measurement" => Ok(CatalogLevel::Measurement),
            _ => Err(format!("unknown catalog level: {s}")),
        }
    }
}

/// Entry returned by [`Catalog::pick`]
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEntry {
    Objective(ObjectiveDraft),
    Question(QuestionDraft),
    Metric(MetricDraft),
    Measurement(MeasurementDraft),
}

impl CatalogEntry {
    /// Natural key of the entry (acronym for measurements)
    #[must_use]
    pub fn natural_key(&self) -> &str {
        match self {
            CatalogEntry::Objective(o) => o.title.raw(),
            CatalogEntry::Question(q) => q.text.raw(),
            CatalogEntry::Metric(m) => m.name.raw(),
            CatalogEntry::Measurement(m) => &m.acronym,
        }
    }
}

/// Library of predefined entries
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    objectives: Vec<ObjectiveDraft>,
    questions: Vec<QuestionDraft>,
    metrics: Vec<MetricDraft>,
    measurements: Vec<MeasurementDraft>,
}

impl Catalog {
    /// Built-in catalog
    #[inline]
    #[must_use]
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Catalog from custom tables
    #[must_use]
    pub fn new(
        objectives: Vec<ObjectiveDraft>,
        questions: Vec<QuestionDraft>,
        metrics: Vec<MetricDraft>,
        measurements: Vec<MeasurementDraft>,
    ) -> Self {
        Self {
            objectives,
            questions,
            metrics,
            measurements,
        }
    }

    #[inline]
    #[must_use]
    pub fn objectives(&self) -> &[ObjectiveDraft] {
        &self.objectives
    }

    #[inline]
    #[must_use]
    pub fn questions(&self) -> &[QuestionDraft] {
        &self.questions
    }

    #[inline]
    #[must_use]
    pub fn metrics(&self) -> &[MetricDraft] {
        &self.metrics
    }

    #[inline]
    #[must_use]
    pub fn measurements(&self) -> &[MeasurementDraft] {
        &self.measurements
    }

    /// Look up an entry by level and natural key
    ///
    /// Entries are returned verbatim, keys included.
    #[must_use]
    pub fn pick(&self, level: CatalogLevel, key: &str) -> Option<CatalogEntry> {
        match level {
            CatalogLevel::Objective => self.pick_objective(key).map(CatalogEntry::Objective),
            CatalogLevel::Question => self.pick_question(key).map(CatalogEntry::Question),
            CatalogLevel::Metric => self.pick_metric(key).map(CatalogEntry::Metric),
            CatalogLevel::Measurement => {
                self.pick_measurement(key).map(CatalogEntry::Measurement)
            }
        }
    }

    #[must_use]
    pub fn pick_objective(&self, key: &str) -> Option<ObjectiveDraft> {
        self.objectives.iter().find(|o| o.title.raw() == key).cloned()
    }

    #[must_use]
    pub fn pick_question(&self, key: &str) -> Option<QuestionDraft> {
        self.questions.iter().find(|q| q.text.raw() == key).cloned()
    }

    #[must_use]
    pub fn pick_metric(&self, key: &str) -> Option<MetricDraft> {
        self.metrics.iter().find(|m| m.name.raw() == key).cloned()
    }

    /// Measurements are picked by acronym
    #[must_use]
    pub fn pick_measurement(&self, acronym: &str) -> Option<MeasurementDraft> {
        self.measurements
            .iter()
            .find(|m| m.acronym == acronym)
            .cloned()
    }

    /// Objectives whose title is not already selected
    #[must_use]
    pub fn available_objectives(&self, selected: &[Text]) -> Vec<&ObjectiveDraft> {
        self.objectives
            .iter()
            .filter(|o| !selected.contains(&o.title))
            .collect()
    }

    /// Questions whose text is not already attached to the objective
    #[must_use]
    pub fn available_questions(&self, selected: &[Text]) -> Vec<&QuestionDraft> {
        self.questions
            .iter()
            .filter(|q| !selected.contains(&q.text))
            .collect()
    }

    /// Metrics whose name is not already attached to the question
    #[must_use]
    pub fn available_metrics(&self, selected: &[Text]) -> Vec<&MetricDraft> {
        self.metrics
            .iter()
            .filter(|m| !selected.contains(&m.name))
            .collect()
    }

    /// Measurements whose acronym is not already used by the metric
    #[must_use]
    pub fn available_measurements(&self, taken_acronyms: &[&str]) -> Vec<&MeasurementDraft> {
        self.measurements
            .iter()
            .filter(|m| {
                !gqm_model::validation::acronym_taken(taken_acronyms.iter().copied(), &m.acronym, None)
            })
            .collect()
    }

    /// Every translation key referenced by the catalog
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let measurements = self
            .measurements
            .iter()
            .chain(self.metrics.iter().flat_map(|m| m.measurements.iter()));
        let mut keys: Vec<&str> = self
            .objectives
            .iter()
            .map(|o| &o.title)
            .chain(self.questions.iter().map(|q| &q.text))
            .chain(self.metrics.iter().flat_map(|m| {
                [
                    &m.name,
                    &m.description,
                    &m.analysis_procedure,
                    &m.analysis_frequency,
                ]
            }))
            .chain(measurements.flat_map(|m| {
                [&m.entity, &m.properties, &m.unit, &m.procedure, &m.frequency]
            }))
            .filter_map(key_of)
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

fn key_of(text: &Text) -> Option<&str> {
    match text {
        Text::Key(k) => Some(k.as_str()),
        Text::Literal(_) => None,
    }
}

/// English translations for the built-in catalog
///
/// # Errors
/// Only if the embedded bundle is malformed.
pub fn english_bundle() -> Result<MapTranslator, BundleError> {
    MapTranslator::from_yaml_str("en", EN_BUNDLE)
}
