//! Common error types used across the workspace.
//!
//! [`LightsError`] is the single error type that crosses port boundaries.
//! Each layer defines its own typed errors and converts via `#[from]`.

use std::fmt;

use crate::light::LightType;
use crate::pattern::PatternType;

/// Top-level error for every fallible operation in the core.
#[derive(Debug, thiserror::Error)]
pub enum LightsError {
    /// A request was malformed and was rejected before any write.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist.
    #[error("entity not found")]
    NotFound(#[from] NotFoundError),

    /// The store of record refused a write (uniqueness or foreign key).
    #[error("conflict")]
    Conflict(#[from] ConflictError),

    /// A pattern was routed to a backend that cannot render it.
    #[error("capability error")]
    Capability(#[from] CapabilityError),

    /// The target device is not reachable right now.
    #[error("device unavailable")]
    DeviceUnavailable(#[from] DeviceUnavailableError),

    /// A backend failed to discover or pair at startup.
    #[error("backend bootstrap failed")]
    Bootstrap(#[from] BootstrapError),

    /// The persistence collaborator failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Reasons a request is rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("invalid RVL channel {0}")]
    InvalidChannel(String),

    #[error("hue {0} is out of range, expected 0..360")]
    HueOutOfRange(u16),

    #[error("colour temperature {0}K is out of range")]
    TemperatureOutOfRange(u16),

    #[error("animation rate must be positive")]
    InvalidRate,

    #[error("backend-native id must not be empty")]
    EmptyNativeId,

    #[error("light {0} appears more than once in the scene")]
    DuplicateSceneLight(String),

    #[error("{0} lights cannot be created manually")]
    NotUserCreatable(LightType),

    #[error("{0} lights are removed by their backend, not by request")]
    BackendManaged(LightType),

    #[error("{pattern} patterns cannot be assigned to {backend} lights")]
    UnsupportedPattern {
        backend: LightType,
        pattern: PatternType,
    },

    #[error("light type cannot change from {from} to {to}")]
    TypeChanged { from: LightType, to: LightType },

    #[error("pattern type cannot change from {from} to {to}")]
    PatternTypeChanged { from: PatternType, to: PatternType },

    #[error("malformed identifier {0:?}")]
    MalformedId(String),

    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// A referenced entity that could not be found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A write refused by a store constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("{0} already exists")]
    Duplicate(String),

    #[error("{0} references a missing record")]
    MissingReference(String),
}

/// A pattern type that the target backend cannot render.
///
/// Pattern assignment is constrained when scenes are edited, so reaching
/// this at dispatch time means the stored data is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("pattern type {pattern} cannot be used with {backend} lights")]
pub struct CapabilityError {
    pub backend: LightType,
    pub pattern: PatternType,
}

/// Why a device could not be driven.
#[derive(Debug, thiserror::Error)]
pub enum DeviceUnavailableError {
    /// The backend never finished initialising, or failed to.
    #[error("{0} backend is disabled")]
    BackendDisabled(LightType),

    /// The device is registered in the store but was not discovered.
    #[error("{kind} device {native_id} is not currently discovered")]
    NotDiscovered { kind: LightType, native_id: String },

    /// The transport to the device failed.
    #[error("{kind} device {native_id} did not accept the command")]
    Transport {
        kind: LightType,
        native_id: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Discovery or pairing failure while starting a backend.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("no {0} devices discovered")]
    NothingDiscovered(LightType),

    #[error("{0} pairing requires the bridge link button to be pressed")]
    PairingRequired(LightType),

    #[error("{kind} discovery failed")]
    Discovery {
        kind: LightType,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Coarse classification used by outer layers for status mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Capability,
    DeviceUnavailable,
    Bootstrap,
    Storage,
}

impl LightsError {
    /// Classify this error without exposing its payload.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Capability(_) => ErrorKind::Capability,
            Self::DeviceUnavailable(_) => ErrorKind::DeviceUnavailable,
            Self::Bootstrap(_) => ErrorKind::Bootstrap,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// The innermost message, suitable for user-facing reports.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::NotFound(err) => err.to_string(),
            Self::Conflict(err) => err.to_string(),
            Self::Capability(err) => err.to_string(),
            Self::DeviceUnavailable(err) => err.to_string(),
            Self::Bootstrap(err) => err.to_string(),
            Self::Storage(err) => err.to_string(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Capability => "capability",
            Self::DeviceUnavailable => "device_unavailable",
            Self::Bootstrap => "bootstrap",
            Self::Storage => "storage",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_classify_validation_errors() {
        let err: LightsError = ValidationError::EmptyName.into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.detail(), "name must not be empty");
    }

    #[test]
    fn should_describe_capability_error_with_backend_and_pattern() {
        let err = CapabilityError {
            backend: LightType::Lifx,
            pattern: PatternType::Rainbow,
        };
        assert_eq!(
            err.to_string(),
            "pattern type rainbow cannot be used with lifx lights"
        );
    }

    #[test]
    fn should_describe_undiscovered_device() {
        let err: LightsError = DeviceUnavailableError::NotDiscovered {
            kind: LightType::PhilipsHue,
            native_id: "4".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);
        assert_eq!(
            err.detail(),
            "philips-hue device 4 is not currently discovered"
        );
    }

    #[test]
    fn should_display_error_kind_in_snake_case() {
        assert_eq!(ErrorKind::DeviceUnavailable.to_string(), "device_unavailable");
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }
}
