//! LIFX adapter error types.

use std::net::SocketAddrV4;

use homelights_domain::error::{BootstrapError, DeviceUnavailableError, LightsError};
use homelights_domain::light::LightType;

/// Errors specific to the LIFX adapter.
#[derive(Debug, thiserror::Error)]
pub enum LifxError {
    #[error("LIFX backend is disabled")]
    Disabled,

    #[error("failed to bind LIFX socket on {addr}")]
    Bind {
        addr: SocketAddrV4,
        #[source]
        source: std::io::Error,
    },

    /// The discovery broadcast could not be sent.
    #[error("failed to broadcast LIFX discovery")]
    Discovery(#[source] std::io::Error),

    #[error("failed to send to LIFX device {mac}")]
    Send {
        mac: String,
        #[source]
        source: std::io::Error,
    },
}

impl LifxError {
    /// Convert into the [`LightsError`] category the application reasons about.
    #[must_use]
    pub fn into_domain(self) -> LightsError {
        match self {
            Self::Disabled => DeviceUnavailableError::BackendDisabled(LightType::Lifx).into(),
            Self::Send { ref mac, .. } => DeviceUnavailableError::Transport {
                kind: LightType::Lifx,
                native_id: mac.clone(),
                source: Box::new(self),
            }
            .into(),
            other @ (Self::Bind { .. } | Self::Discovery(_)) => BootstrapError::Discovery {
                kind: LightType::Lifx,
                source: Box::new(other),
            }
            .into(),
        }
    }
}

impl From<LifxError> for LightsError {
    fn from(err: LifxError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn should_display_send_error_with_mac() {
        let err = LifxError::Send {
            mac: "d0:73:d5:01:02:03".to_string(),
            source: io::Error::from(io::ErrorKind::HostUnreachable),
        };
        assert_eq!(
            err.to_string(),
            "failed to send to LIFX device d0:73:d5:01:02:03"
        );
    }

    #[test]
    fn should_convert_discovery_failure_to_bootstrap_error() {
        let err: LightsError =
            LifxError::Discovery(io::Error::from(io::ErrorKind::PermissionDenied)).into();
        assert!(matches!(
            err,
            LightsError::Bootstrap(BootstrapError::Discovery {
                kind: LightType::Lifx,
                ..
            })
        ));
    }

    #[test]
    fn should_convert_send_failure_to_transport_error() {
        let err: LightsError = LifxError::Send {
            mac: "d0:73:d5:01:02:03".to_string(),
            source: io::Error::from(io::ErrorKind::HostUnreachable),
        }
        .into();
        match err {
            LightsError::DeviceUnavailable(DeviceUnavailableError::Transport { native_id, .. }) => {
                assert_eq!(native_id, "d0:73:d5:01:02:03");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn should_convert_disabled_to_backend_disabled() {
        let err: LightsError = LifxError::Disabled.into();
        assert!(matches!(
            err,
            LightsError::DeviceUnavailable(DeviceUnavailableError::BackendDisabled(LightType::Lifx))
        ));
    }
}
