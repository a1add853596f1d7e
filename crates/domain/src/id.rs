//! Typed identifiers.
//!
//! Every entity is keyed by a random UUID, stored as its hyphenated text
//! form. Text that is not a UUID is rejected as a [`ValidationError`], so a
//! malformed path segment surfaces as a client error rather than a lookup miss.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// A fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an identifier received from a caller or read back from
            /// the store.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::MalformedId`] when `text` is not a UUID.
            pub fn parse(text: &str) -> Result<Self, ValidationError> {
                Uuid::try_parse(text)
                    .map(Self)
                    .map_err(|_| ValidationError::MalformedId(text.to_string()))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.hyphenated().fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                Self::parse(text)
            }
        }
    };
}

define_id!(
    /// Identifies a [`Zone`](crate::zone::Zone).
    ZoneId
);

define_id!(
    /// Identifies a [`Light`](crate::light::Light).
    LightId
);

define_id!(
    /// Identifies a [`Scene`](crate::scene::Scene).
    SceneId
);

define_id!(
    /// Identifies a [`Pattern`](crate::pattern::Pattern).
    PatternId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_never_hand_out_the_same_light_id_twice() {
        assert_ne!(LightId::new(), LightId::new());
    }

    #[test]
    fn should_render_as_lowercase_hyphenated_text() {
        let id = ZoneId::parse("6F9619FF-8B86-D011-B42D-00C04FC964FF").unwrap();
        assert_eq!(id.to_string(), "6f9619ff-8b86-d011-b42d-00c04fc964ff");
        assert_eq!(id.to_string().parse::<ZoneId>().unwrap(), id);
    }

    #[test]
    fn should_serialize_as_plain_string() {
        let id = SceneId::parse("6f9619ff-8b86-d011-b42d-00c04fc964ff").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"6f9619ff-8b86-d011-b42d-00c04fc964ff\"");
        assert_eq!(serde_json::from_str::<SceneId>(&json).unwrap(), id);
    }

    #[test]
    fn should_report_malformed_id_as_validation_error() {
        assert_eq!(
            PatternId::parse("zone-7"),
            Err(ValidationError::MalformedId("zone-7".to_string()))
        );
        assert!("".parse::<LightId>().is_err());
    }
}
