//! Strongly typed entity identifiers.
//!
//! Every persisted entity is keyed by a UUID. Wrapping each in its own
//! newtype stops a `PetId` from being passed where an `ApplicationId` is
//! expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised when parsing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// The input was empty.
    #[error("{kind} id must not be empty")]
    Empty {
        /// Entity the identifier belongs to.
        kind: &'static str,
    },
    /// The input was not a UUID.
    #[error("{kind} id must be a valid UUID")]
    Invalid {
        /// Entity the identifier belongs to.
        kind: &'static str,
    },
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Validate and construct an identifier from borrowed input.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = id.as_ref();
                if raw.is_empty() {
                    return Err(IdValidationError::Empty { kind: $kind });
                }
                if raw.trim() != raw {
                    return Err(IdValidationError::Invalid { kind: $kind });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdValidationError::Invalid { kind: $kind })
            }

            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_entity_id! {
    /// Stable user identifier.
    UserId => "user"
}

define_entity_id! {
    /// Pet listing identifier.
    PetId => "pet"
}

define_entity_id! {
    /// Adoption application identifier.
    ApplicationId => "application"
}

define_entity_id! {
    /// Message identifier.
    MessageId => "message"
}

define_entity_id! {
    /// Notification identifier.
    NotificationId => "notification"
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", IdValidationError::Empty { kind: "pet" })]
    #[case("not-a-uuid", IdValidationError::Invalid { kind: "pet" })]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", IdValidationError::Invalid { kind: "pet" })]
    fn rejects_malformed_ids(#[case] raw: &str, #[case] expected: IdValidationError) {
        assert_eq!(PetId::new(raw), Err(expected));
    }

    #[rstest]
    fn serde_uses_plain_strings() {
        let id = ApplicationId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, "\"3fa85f64-5717-4562-b3fc-2c963f66afa6\"");
        let back: ApplicationId = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, id);
    }

    #[rstest]
    fn error_names_the_entity() {
        let err = NotificationId::new("x").expect_err("invalid id");
        assert_eq!(err.to_string(), "notification id must be a valid UUID");
    }
}
