use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Wizard steps, in their fixed order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    #[default]
    Basics,
    Objectives,
    Questions,
    Metrics,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        Self::Basics,
        Self::Objectives,
        Self::Questions,
        Self::Metrics,
        Self::Review,
    ];

    /// 1-based position shown on the step indicator
    #[must_use]
    pub fn number(self) -> usize {
        match self {
            Self::Basics => 1,
            Self::Objectives => 2,
            Self::Questions => 3,
            Self::Metrics => 4,
            Self::Review => 5,
        }
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Basics => Some(Self::Objectives),
            Self::Objectives => Some(Self::Questions),
            Self::Questions => Some(Self::Metrics),
            Self::Metrics => Some(Self::Review),
            Self::Review => None,
        }
    }

    #[must_use]
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Basics => None,
            Self::Objectives => Some(Self::Basics),
            Self::Questions => Some(Self::Objectives),
            Self::Metrics => Some(Self::Questions),
            Self::Review => Some(Self::Metrics),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basics => "basics",
            Self::Objectives => "objectives",
            Self::Questions => "questions",
            Self::Metrics => "metrics",
            Self::Review => "review",
        }
    }
}

impl Display for WizardStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step indicator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Locked,
    Available,
    Current,
}
