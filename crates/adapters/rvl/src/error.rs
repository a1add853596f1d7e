//! RVL adapter error types.

use std::net::SocketAddrV4;

use homelights_domain::error::{BootstrapError, DeviceUnavailableError, LightsError};
use homelights_domain::light::{LightType, RvlChannel};

/// Errors specific to the RVL adapter.
#[derive(Debug, thiserror::Error)]
pub enum RvlError {
    /// Disabled in configuration, or `init` has not bound a socket yet.
    #[error("RVL backend is disabled")]
    Disabled,

    /// The sending socket could not be opened.
    #[error("failed to bind RVL socket on {addr}")]
    Bind {
        addr: SocketAddrV4,
        #[source]
        source: std::io::Error,
    },

    /// A frame could not be broadcast.
    #[error("failed to send frame to RVL channel {channel}")]
    Send {
        channel: RvlChannel,
        #[source]
        source: std::io::Error,
    },
}

impl RvlError {
    /// Convert into the [`LightsError`] category the application reasons about.
    #[must_use]
    pub fn into_domain(self) -> LightsError {
        match self {
            Self::Disabled => DeviceUnavailableError::BackendDisabled(LightType::Rvl).into(),
            Self::Bind { .. } => BootstrapError::Discovery {
                kind: LightType::Rvl,
                source: Box::new(self),
            }
            .into(),
            Self::Send { channel, .. } => DeviceUnavailableError::Transport {
                kind: LightType::Rvl,
                native_id: channel.to_string(),
                source: Box::new(self),
            }
            .into(),
        }
    }
}

impl From<RvlError> for LightsError {
    fn from(err: RvlError) -> Self {
        err.into_domain()
    }
}
