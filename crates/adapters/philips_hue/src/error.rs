//! Philips Hue adapter error types.

use homelights_domain::error::{BootstrapError, DeviceUnavailableError, LightsError};
use homelights_domain::light::LightType;

/// Bridge error type returned while the link button has not been pressed.
pub const LINK_BUTTON_NOT_PRESSED: u16 = 101;

/// Bridge error type for an unknown or revoked username.
pub const UNAUTHORIZED_USER: u16 = 1;

/// Errors specific to the Philips Hue adapter.
#[derive(Debug, thiserror::Error)]
pub enum HueError {
    #[error("Philips Hue backend is disabled")]
    Disabled,

    #[error("no Philips Hue bridge found on the network")]
    NoBridge,

    #[error("bridge link button not pressed")]
    LinkButtonNotPressed,

    /// Transport failure or non-success HTTP status.
    #[error("bridge request failed")]
    Http(#[from] reqwest::Error),

    /// The bridge answered with an error object.
    #[error("bridge error {kind}: {description}")]
    Api { kind: u16, description: String },

    /// The bridge answered with something other than the expected shape.
    #[error("unexpected bridge response: {0}")]
    UnexpectedResponse(String),

    #[error("failed to access Hue credentials file")]
    Credentials(#[source] std::io::Error),

    #[error("Hue credentials file is malformed")]
    CredentialsFormat(#[source] serde_json::Error),
}

impl HueError {
    /// Classify a bridge error object.
    #[must_use]
    pub fn from_api(kind: u16, description: impl Into<String>) -> Self {
        if kind == LINK_BUTTON_NOT_PRESSED {
            Self::LinkButtonNotPressed
        } else {
            Self::Api {
                kind,
                description: description.into(),
            }
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { kind, .. } if *kind == UNAUTHORIZED_USER)
    }

    /// Convert an error raised while discovering or pairing.
    #[must_use]
    pub fn into_domain(self) -> LightsError {
        match self {
            Self::Disabled => DeviceUnavailableError::BackendDisabled(LightType::PhilipsHue).into(),
            Self::LinkButtonNotPressed => BootstrapError::PairingRequired(LightType::PhilipsHue).into(),
            other => BootstrapError::Discovery {
                kind: LightType::PhilipsHue,
                source: Box::new(other),
            }
            .into(),
        }
    }

    /// Convert an error raised while driving the light `native_id`.
    #[must_use]
    pub fn into_transport(self, native_id: &str) -> LightsError {
        match self {
            Self::Disabled => DeviceUnavailableError::BackendDisabled(LightType::PhilipsHue).into(),
            other => DeviceUnavailableError::Transport {
                kind: LightType::PhilipsHue,
                native_id: native_id.to_string(),
                source: Box::new(other),
            }
            .into(),
        }
    }
}

impl From<HueError> for LightsError {
    fn from(err: HueError) -> Self {
        err.into_domain()
    }
}
