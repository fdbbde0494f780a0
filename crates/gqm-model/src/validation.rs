//! Field-level validation
//!
//! Validation problems are not errors in the control-flow sense. They are
//! collected per field into [`FieldErrors`], shown next to the field, and
//! block only the submit action they belong to.

use crate::text::Text;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Form field a validation issue is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    PlanName,
    AssociatedProject,
    PlanResponsible,
    ObjectiveTitle,
    QuestionText,
    MetricName,
    MetricDescription,
    MetricMnemonic,
    MetricFormula,
    MetricControlRange,
    AnalysisProcedure,
    AnalysisFrequency,
    AnalysisResponsible,
    Measurements,
    MeasurementEntity,
    MeasurementAcronym,
    MeasurementProperties,
    MeasurementUnit,
    MeasurementProcedure,
    MeasurementFrequency,
    MeasurementResponsible,
}

/// What is wrong with a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum FieldIssue {
    #[error("this field is required")]
    Required,

    #[error("at most {max} characters allowed (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("acronym {acronym:?} is already used by another measurement of this metric")]
    DuplicateAcronym { acronym: String },

    #[error("minimum must not exceed maximum")]
    InvalidRange,

    #[error("add at least one item")]
    AtLeastOne,

    #[error("{name:?} is already in the list")]
    Duplicate { name: String },

    #[error("{value:?} is not one of the offered choices")]
    UnknownChoice { value: String },
}

/// Per-field issues of one form, at most one issue per field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, FieldIssue>);

impl FieldErrors {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue; the first issue recorded for a field wins
    pub fn add(&mut self, field: Field, issue: FieldIssue) {
        self.0.entry(field).or_insert(issue);
    }

    #[inline]
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&FieldIssue> {
        self.0.get(&field)
    }

    #[inline]
    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldIssue)> {
        self.0.iter().map(|(f, i)| (*f, i))
    }

    /// Merge issues from another form section
    pub fn extend(&mut self, other: FieldErrors) {
        for (field, issue) in other.0 {
            self.add(field, issue);
        }
    }

    /// `Ok(value)` when no issues were recorded
    ///
    /// # Errors
    /// Returns `self` when at least one field has an issue.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Required literal string with a length limit
    pub fn check_required(&mut self, field: Field, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.add(field, FieldIssue::Required);
        } else {
            self.check_len(field, value, max);
        }
    }

    /// Optional literal string with a length limit
    pub fn check_len(&mut self, field: Field, value: &str, max: usize) {
        let actual = value.trim().chars().count();
        if actual > max {
            self.add(field, FieldIssue::TooLong { max, actual });
        }
    }

    /// Required text; keys are only checked for presence, their resolved
    /// length is checked at finalize
    pub fn check_required_text(&mut self, field: Field, value: &Text, max: usize) {
        match value {
            Text::Key(_) => {}
            Text::Literal(text) => self.check_required(field, text, max),
        }
    }

    /// Optional text with a length limit on literals
    pub fn check_text_len(&mut self, field: Field, value: &Text, max: usize) {
        if let Text::Literal(text) = value {
            self.check_len(field, text, max);
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, issue) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field:?}: {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Normalized form used to compare acronyms
#[inline]
#[must_use]
pub fn normalize_acronym(acronym: &str) -> String {
    acronym.trim().to_uppercase()
}

/// Check an acronym against the acronyms of its siblings
///
/// `own` is the acronym of the measurement being edited, if any; it does not
/// count as a clash with itself. Comparison ignores case and surrounding
/// whitespace.
#[must_use]
pub fn acronym_taken<'a>(
    siblings: impl IntoIterator<Item = &'a str>,
    candidate: &str,
    own: Option<&str>,
) -> bool {
    let candidate = normalize_acronym(candidate);
    let own = own.map(normalize_acronym);
    let mut skipped_own = false;
    for sibling in siblings {
        let sibling = normalize_acronym(sibling);
        if sibling != candidate {
            continue;
        }
        if !skipped_own && own.as_deref() == Some(sibling.as_str()) {
            skipped_own = true;
            continue;
        }
        return true;
    }
    false
}

/// First acronym that appears more than once, if any
#[must_use]
pub fn find_duplicate_acronym<'a>(acronyms: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut seen = std::collections::HashSet::new();
    acronyms
        .into_iter()
        .find(|a| !seen.insert(normalize_acronym(a)))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TranslationKey;
    use proptest::prelude::*;

    #[test]
    fn required_and_length() {
        let mut errors = FieldErrors::new();
        errors.check_required(Field::MetricName, "  ", 10);
        errors.check_required(Field::MetricMnemonic, "LDTX", 3);
        errors.check_required(Field::MetricFormula, "end-start", 100);

        assert_eq!(errors.get(Field::MetricName), Some(&FieldIssue::Required));
        assert_eq!(
            errors.get(Field::MetricMnemonic),
            Some(&FieldIssue::TooLong { max: 3, actual: 4 })
        );
        assert!(!errors.has(Field::MetricFormula));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn keys_skip_length_checks() {
        let mut errors = FieldErrors::new();
        let key = Text::Key(TranslationKey::from_static("metrics.leadTime.description"));
        errors.check_required_text(Field::MetricDescription, &key, 3);
        assert!(errors.is_empty());
    }

    #[test]
    fn first_issue_wins() {
        let mut errors = FieldErrors::new();
        errors.add(Field::QuestionText, FieldIssue::Required);
        errors.add(Field::QuestionText, FieldIssue::AtLeastOne);
        assert_eq!(errors.get(Field::QuestionText), Some(&FieldIssue::Required));
    }

    #[test]
    fn into_result() {
        assert_eq!(FieldErrors::new().into_result(5), Ok(5));

        let mut errors = FieldErrors::new();
        errors.add(Field::Measurements, FieldIssue::AtLeastOne);
        let err = errors.into_result(5).unwrap_err();
        assert!(err.to_string().contains("Measurements"));
    }

    #[test]
    fn acronym_clash_detection() {
        let siblings = ["LDT", "CYC"];
        assert!(acronym_taken(siblings, "LDT", None));
        assert!(acronym_taken(siblings, " ldt ", None));
        assert!(!acronym_taken(siblings, "THR", None));
        // editing LDT itself does not clash with its own entry
        assert!(!acronym_taken(siblings, "LDT", Some("LDT")));
        assert!(acronym_taken(["LDT", "LDT"], "LDT", Some("LDT")));
    }

    #[test]
    fn duplicate_acronym_scan() {
        assert_eq!(find_duplicate_acronym(["A", "B", "a"]), Some("a".to_string()));
        assert_eq!(find_duplicate_acronym(["A", "B"]), None);
    }

    proptest! {
        #[test]
        fn prop_taken_matches_membership(
            siblings in proptest::collection::vec("[A-Z]{1,3}", 0..6),
            candidate in "[A-Z]{1,3}",
        ) {
            let expected = siblings.iter().any(|s| s == &candidate);
            prop_assert_eq!(
                acronym_taken(siblings.iter().map(String::as_str), &candidate, None),
                expected
            );
        }
    }
}
