//! Field length limits

use serde::{Deserialize, Serialize};

/// Maximum lengths (in characters) enforced by editors and at finalize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLimits {
    /// Plan name, objective title, question text, metric name
    pub title_max: usize,
    /// Descriptions, procedures, formulas and other free text
    pub text_max: usize,
    /// People and short labels (responsible, unit, frequency)
    pub label_max: usize,
    /// Metric mnemonic
    pub mnemonic_max: usize,
    /// Measurement acronym
    pub acronym_max: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            title_max: 200,
            text_max: 1000,
            label_max: 100,
            mnemonic_max: 3,
            acronym_max: 3,
        }
    }
}

impl FieldLimits {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_title_max(mut self, max: usize) -> Self {
        self.title_max = max;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_text_max(mut self, max: usize) -> Self {
        self.text_max = max;
        self
    }
}
