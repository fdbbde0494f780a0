//! Opaque identifiers assigned by the persistence collaborator
//!
//! Drafts never carry ids. Every id here comes back from storage and is
//! treated as an opaque string.

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier
            #[inline]
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Raw identifier
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

opaque_id!(
    /// Persisted plan identifier
    PlanId
);
opaque_id!(
    /// Persisted objective identifier
    ObjectiveId
);
opaque_id!(
    /// Persisted question identifier
    QuestionId
);
opaque_id!(
    /// Persisted metric identifier
    MetricId
);
opaque_id!(
    /// Persisted measurement identifier
    MeasurementId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_serializes_transparently() {
        let id = ObjectiveId::new("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");

        let back: ObjectiveId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn id_display() {
        assert_eq!(PlanId::from("p-1").to_string(), "p-1");
    }
}
