//! Measurement scales and metric control ranges

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Scale of a measurement's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementScale {
    /// Real-valued
    #[default]
    Continuous,
    /// Countable
    Discrete,
}

impl MeasurementScale {
    /// All scales, in display order
    pub const ALL: [MeasurementScale; 2] = [MeasurementScale::Continuous, MeasurementScale::Discrete];

    /// Translation key of the scale's label
    #[inline]
    #[must_use]
    pub fn label_key(&self) -> &'static str {
        match self {
            MeasurementScale::Continuous => "scales.continuous",
            MeasurementScale::Discrete => "scales.discrete",
        }
    }

    /// Stored name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementScale::Continuous => "continuous",
            MeasurementScale::Discrete => "discrete",
        }
    }
}

impl Display for MeasurementScale {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasurementScale {
    type Err = ModelError;

    /// Accepts the stored name or the label key, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.strip_prefix("scales.").unwrap_or(&name) {
            "continuous" => Ok(MeasurementScale::Continuous),
            "discrete" => Ok(MeasurementScale::Discrete),
            _ => Err(ModelError::InvalidScale(s.to_string())),
        }
    }
}

/// Acceptable value range of a metric, stored as `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ControlRange {
    pub min: f64,
    pub max: f64,
}

impl ControlRange {
    /// Checked constructor
    ///
    /// # Errors
    /// - `ModelError::InvalidRange` if a bound is not finite or `min > max`
    pub fn new(min: f64, max: f64) -> Result<Self, ModelError> {
        let range = Self { min, max };
        if range.is_valid() {
            Ok(range)
        } else {
            Err(ModelError::InvalidRange { min, max })
        }
    }

    /// Finite bounds with `min <= max`
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Check whether a value falls inside the range (inclusive)
    #[inline]
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for ControlRange {
    fn default() -> Self {
        Self { min: 0.0, max: 100.0 }
    }
}

impl From<[f64; 2]> for ControlRange {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<ControlRange> for [f64; 2] {
    fn from(range: ControlRange) -> Self {
        [range.min, range.max]
    }
}
