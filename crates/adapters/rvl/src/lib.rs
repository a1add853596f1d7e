//! # homelights-adapter-rvl
//!
//! Backend for RVL wireless lights. RVL receivers listen for broadcast
//! wave-parameter frames and pick out the ones addressed to their channel,
//! so there is nothing to discover: `init` binds the sending socket and
//! reports one device per channel.
//!
//! RVL records are created by hand, so this backend never reconciles.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `homelights-app` and `homelights-domain`.

mod config;
mod error;
pub mod frame;

pub use config::{DEFAULT_PORT, RvlConfig};
pub use error::RvlError;

use std::net::SocketAddrV4;
use std::sync::OnceLock;
use std::time::Duration;

use tokio::net::UdpSocket;

use homelights_app::ports::{DeviceHandle, LightBackend};
use homelights_app::resolver::LightCommand;
use homelights_domain::error::LightsError;
use homelights_domain::light::{LightType, RvlChannel};

use crate::frame::Frame;

/// One RVL channel as seen by the device registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RvlChannelHandle {
    channel: RvlChannel,
    native_id: String,
    label: String,
}

impl RvlChannelHandle {
    #[must_use]
    pub fn new(channel: RvlChannel) -> Self {
        Self {
            channel,
            native_id: channel.to_string(),
            label: format!("RVL channel {channel}"),
        }
    }

    #[must_use]
    pub fn channel(&self) -> RvlChannel {
        self.channel
    }
}

impl DeviceHandle for RvlChannelHandle {
    fn native_id(&self) -> &str {
        &self.native_id
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// UDP broadcast backend for RVL lights.
pub struct RvlBackend {
    config: RvlConfig,
    socket: OnceLock<UdpSocket>,
}

impl RvlBackend {
    #[must_use]
    pub fn new(config: RvlConfig) -> Self {
        Self {
            config,
            socket: OnceLock::new(),
        }
    }

    fn destination(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.config.broadcast, self.config.port)
    }

    async fn bind(&self) -> Result<(), RvlError> {
        let addr = SocketAddrV4::new(self.config.interface, 0);
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| RvlError::Bind { addr, source })?;
        socket
            .set_broadcast(true)
            .map_err(|source| RvlError::Bind { addr, source })?;
        if self.socket.set(socket).is_err() {
            tracing::debug!("RVL socket already bound, keeping the existing one");
        }
        Ok(())
    }
}

impl LightBackend for RvlBackend {
    type Device = RvlChannelHandle;

    fn kind(&self) -> LightType {
        LightType::Rvl
    }

    fn reconciles(&self) -> bool {
        false
    }

    async fn init(&self) -> Result<Vec<RvlChannelHandle>, LightsError> {
        if !self.config.enabled {
            return Err(RvlError::Disabled.into());
        }
        self.bind().await?;
        tracing::info!(
            destination = %self.destination(),
            "RVL socket bound"
        );
        Ok(RvlChannel::all().map(RvlChannelHandle::new).collect())
    }

    /// RVL frames switch instantly, so `transition` is ignored.
    async fn set_light_state(
        &self,
        device: &RvlChannelHandle,
        command: &LightCommand,
        _transition: Duration,
    ) -> Result<(), LightsError> {
        let socket = self.socket.get().ok_or(RvlError::Disabled)?;
        let bytes = Frame::from_command(device.channel, command).encode();
        socket
            .send_to(&bytes, self.destination())
            .await
            .map_err(|source| RvlError::Send {
                channel: device.channel,
                source,
            })?;
        tracing::debug!(channel = %device.channel, len = bytes.len(), "RVL frame sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    use homelights_app::resolver::{Effect, EffectorColor};
    use homelights_domain::error::DeviceUnavailableError;
    use homelights_domain::light::NUM_RVL_CHANNELS;

    use crate::frame::{Wave, WaveKind};

    async fn loopback() -> (RvlBackend, UdpSocket) {
        let receiver = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = receiver.local_addr().unwrap().port();
        let backend = RvlBackend::new(RvlConfig {
            enabled: true,
            interface: Ipv4Addr::LOCALHOST,
            port,
            broadcast: Ipv4Addr::LOCALHOST,
        });
        (backend, receiver)
    }

    async fn receive(receiver: &UdpSocket) -> Frame {
        let mut buf = [0u8; 64];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), receiver.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        Frame::decode(&buf[..len]).unwrap()
    }

    #[test]
    fn should_use_channel_number_as_native_id() {
        let handle = RvlChannelHandle::new(RvlChannel::try_from(6).unwrap());
        assert_eq!(handle.native_id(), "6");
        assert_eq!(handle.label(), "RVL channel 6");
    }

    #[tokio::test]
    async fn should_report_every_channel_on_init() {
        let (backend, _receiver) = loopback().await;

        let devices = backend.init().await.unwrap();

        assert_eq!(devices.len(), usize::from(NUM_RVL_CHANNELS));
        assert_eq!(devices[0].native_id(), "0");
        assert_eq!(devices[7].native_id(), "7");
        assert!(!backend.reconciles());
    }

    #[tokio::test]
    async fn should_fail_init_when_disabled() {
        let backend = RvlBackend::new(RvlConfig {
            enabled: false,
            ..RvlConfig::default()
        });

        let err = backend.init().await.unwrap_err();

        assert!(matches!(
            err,
            LightsError::DeviceUnavailable(DeviceUnavailableError::BackendDisabled(LightType::Rvl))
        ));
    }

    #[tokio::test]
    async fn should_refuse_to_send_before_init() {
        let (backend, _receiver) = loopback().await;
        let handle = RvlChannelHandle::new(RvlChannel::try_from(0).unwrap());

        let result = backend
            .set_light_state(&handle, &LightCommand::Off, Duration::ZERO)
            .await;

        assert!(matches!(result, Err(LightsError::DeviceUnavailable(_))));
    }

    #[tokio::test]
    async fn should_broadcast_frame_addressed_to_channel() {
        let (backend, receiver) = loopback().await;
        let devices = backend.init().await.unwrap();
        let command = LightCommand::On(EffectorColor {
            hue: 0.5,
            saturation: 1.0,
            brightness: 1.0,
            kelvin: None,
            effect: Effect::Pulse { rate: 8 },
        });

        backend
            .set_light_state(&devices[3], &command, Duration::from_millis(250))
            .await
            .unwrap();

        let frame = receive(&receiver).await;
        assert_eq!(frame.channel, 3);
        assert_eq!(
            frame.waves,
            vec![Wave {
                kind: WaveKind::Pulse,
                hue: 128,
                saturation: 255,
                value: 255,
                rate: 8,
            }]
        );
    }

    #[tokio::test]
    async fn should_send_black_wave_for_off() {
        let (backend, receiver) = loopback().await;
        let devices = backend.init().await.unwrap();

        backend
            .set_light_state(&devices[1], &LightCommand::Off, Duration::ZERO)
            .await
            .unwrap();

        let frame = receive(&receiver).await;
        assert_eq!(frame.channel, 1);
        assert_eq!(frame.waves, vec![Wave::BLACK]);
    }
}
