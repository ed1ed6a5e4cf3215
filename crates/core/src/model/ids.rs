use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifies the owning user. Every store query carries one explicitly;
/// there is no ambient "current user."
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(Uuid);

/// Unique identifier for a Subject
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(Uuid);

/// Unique identifier for a Revision Session
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(Uuid);

/// Unique identifier for a Calendar Event
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(Uuid);

macro_rules! impl_id {
    ($name:ident, $label:literal) => {
        impl $name {
            /// Wraps an existing UUID value
            #[must_use]
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// Generates a fresh random identifier
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the underlying UUID value
            #[must_use]
            pub fn value(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<Uuid>().map($name::new).map_err(|_| ParseIdError {
                    kind: $label.to_string(),
                })
            }
        }
    };
}

impl_id!(UserId, "UserId");
impl_id!(SubjectId, "SubjectId");
impl_id!(SessionId, "SessionId");
impl_id!(EventId, "EventId");

/// Error type for parsing an ID from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_id_roundtrips_through_display() {
        let original = SubjectId::generate();
        let parsed: SubjectId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn session_id_from_str_rejects_garbage() {
        let result = "not-a-uuid".parse::<SessionId>();
        assert!(result.is_err());
    }

    #[test]
    fn user_id_debug_names_the_type() {
        let id = UserId::new(Uuid::nil());
        assert!(format!("{id:?}").starts_with("UserId("));
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(EventId::generate(), EventId::generate());
    }
}
