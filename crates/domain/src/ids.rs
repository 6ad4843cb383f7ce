use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! define_key {
    ($name:ident, $entity:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Build a key, rejecting empty or whitespace-only input.
            pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(DomainError::invalid_id(concat!(
                        $entity,
                        " key cannot be empty"
                    )));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

// Scene marker keys, as emitted by the scene's picking layer
define_key!(LocationId, "location");

// Widget-hosted video identifiers
define_key!(VideoId, "video");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_keys_are_rejected() {
        assert!(LocationId::parse("").is_err());
        assert!(LocationId::parse("   ").is_err());
        assert!(VideoId::parse("").is_err());
    }

    #[test]
    fn keys_round_trip_through_display() {
        let id: LocationId = "old-harbour".parse().expect("valid key");
        assert_eq!(id.to_string(), "old-harbour");
        assert_eq!(id.as_str(), "old-harbour");
    }

    #[test]
    fn keys_serialize_as_plain_strings() {
        let id = LocationId::parse("lighthouse").expect("valid key");
        let json = serde_json::to_string(&id).expect("serializes");
        assert_eq!(json, "\"lighthouse\"");
    }
}
