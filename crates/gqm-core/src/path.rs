//! Addressing of persisted nodes
//!
//! A persisted node is reached through the ids of its ancestors. The same
//! path type names delete targets and expanded tree rows.

use gqm_model::{MeasurementId, MetricId, ObjectiveId, Plan, QuestionId};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Id chain from the plan root to one node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "camelCase")]
pub enum NodePath {
    Objective {
        objective: ObjectiveId,
    },
    Question {
        objective: ObjectiveId,
        question: QuestionId,
    },
    Metric {
        objective: ObjectiveId,
        question: QuestionId,
        metric: MetricId,
    },
    Measurement {
        objective: ObjectiveId,
        question: QuestionId,
        metric: MetricId,
        measurement: MeasurementId,
    },
}

impl NodePath {
    #[inline]
    #[must_use]
    pub fn objective(objective: ObjectiveId) -> Self {
        Self::Objective { objective }
    }

    #[inline]
    #[must_use]
    pub fn question(objective: ObjectiveId, question: QuestionId) -> Self {
        Self::Question {
            objective,
            question,
        }
    }

    #[inline]
    #[must_use]
    pub fn metric(objective: ObjectiveId, question: QuestionId, metric: MetricId) -> Self {
        Self::Metric {
            objective,
            question,
            metric,
        }
    }

    #[inline]
    #[must_use]
    pub fn measurement(
        objective: ObjectiveId,
        question: QuestionId,
        metric: MetricId,
        measurement: MeasurementId,
    ) -> Self {
        Self::Measurement {
            objective,
            question,
            metric,
            measurement,
        }
    }

    /// Nesting depth, objectives at 0
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Objective { .. } => 0,
            Self::Question { .. } => 1,
            Self::Metric { .. } => 2,
            Self::Measurement { .. } => 3,
        }
    }

    /// Level name used in logs and messages
    #[must_use]
    pub fn level(&self) -> &'static str {
        match self {
            Self::Objective { .. } => "objective",
            Self::Question { .. } => "question",
            Self::Metric { .. } => "metric",
            Self::Measurement { .. } => "measurement",
        }
    }

    /// Whether the node still exists in `plan`
    #[must_use]
    pub fn exists_in(&self, plan: &Plan) -> bool {
        match self {
            Self::Objective { objective } => plan.objective(objective).is_some(),
            Self::Question {
                objective,
                question,
            } => plan.question(objective, question).is_some(),
            Self::Metric {
                objective,
                question,
                metric,
            } => plan.metric(objective, question, metric).is_some(),
            Self::Measurement {
                objective,
                question,
                metric,
                measurement,
            } => plan
                .metric(objective, question, metric)
                .and_then(|m| m.measurement(measurement))
                .is_some(),
        }
    }
}

impl Display for NodePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Objective { objective } => write!(f, "objective {objective}"),
            Self::Question {
                objective,
                question,
            } => write!(f, "question {objective}/{question}"),
            Self::Metric {
                objective,
                question,
                metric,
            } => write!(f, "metric {objective}/{question}/{metric}"),
            Self::Measurement {
                objective,
                question,
                metric,
                measurement,
            } => write!(f, "measurement {objective}/{question}/{metric}/{measurement}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_depth() {
        let path = NodePath::metric("o1".into(), "q1".into(), "m1".into());
        assert_eq!(path.to_string(), "metric o1/q1/m1");
        assert_eq!(path.depth(), 2);
        assert_eq!(path.level(), "metric");
    }

    #[test]
    fn same_position_under_different_parents_differs() {
        let a = NodePath::question("o1".into(), "q1".into());
        let b = NodePath::question("o2".into(), "q1".into());
        assert_ne!(a, b);
    }
}
