//! # homelights-adapter-lifx
//!
//! Backend for LIFX bulbs on the local network, spoken to directly over the
//! LAN protocol (no cloud account involved).
//!
//! `init` broadcasts a discovery request and returns every bulb that answers
//! within the configured timeout, keyed by MAC address. The application
//! reconciles the store against that list, so LIFX lights are never created
//! by hand.
//!
//! Commands are fire-and-forget: a `SetColor` followed by `SetLightPower`,
//! both fading over the dispatch transition.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `homelights-app` and `homelights-domain`.

mod config;
pub mod discovery;
mod error;
pub mod protocol;

pub use config::{LIFX_PORT, LifxConfig};
pub use error::LifxError;

use std::net::{SocketAddr, SocketAddrV4};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::net::UdpSocket;

use homelights_app::ports::{DeviceHandle, LightBackend};
use homelights_app::resolver::LightCommand;
use homelights_domain::error::LightsError;
use homelights_domain::light::LightType;

use crate::protocol::{Hsbk, Mac, Message, Packet};

/// Kelvin sent alongside HSV colours, where the bulb ignores it for
/// saturated colours and uses it as the white point otherwise.
pub const DEFAULT_KELVIN: u16 = 3500;
/// Kelvin range accepted by LIFX bulbs.
pub const MIN_KELVIN: u16 = 1500;
pub const MAX_KELVIN: u16 = 9000;

/// Source id stamped on every packet; replies echo it back.
const SOURCE: u32 = 0x484C_5458;

/// A bulb found during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifxDevice {
    mac: Mac,
    addr: SocketAddr,
    native_id: String,
    label: String,
}

impl LifxDevice {
    #[must_use]
    pub fn new(mac: Mac, addr: SocketAddr, label: Option<String>) -> Self {
        let native_id = mac.to_string();
        let label = label
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| native_id.clone());
        Self {
            mac,
            addr,
            native_id,
            label,
        }
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl DeviceHandle for LifxDevice {
    fn native_id(&self) -> &str {
        &self.native_id
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Map a resolved colour onto LIFX's 16-bit HSBK scales.
#[must_use]
pub fn to_hsbk(command: &LightCommand) -> Option<Hsbk> {
    let LightCommand::On(color) = command else {
        return None;
    };
    Some(Hsbk {
        hue: hue_level(color.hue),
        saturation: level(color.saturation),
        brightness: level(color.brightness),
        kelvin: color
            .kelvin
            .unwrap_or(DEFAULT_KELVIN)
            .clamp(MIN_KELVIN, MAX_KELVIN),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn level(fraction: f64) -> u16 {
    (fraction * f64::from(u16::MAX)).round().clamp(0.0, f64::from(u16::MAX)) as u16
}

/// The hue wheel wraps: `65536` is a full turn and lands back on `0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hue_level(fraction: f64) -> u16 {
    ((fraction * 65536.0).round().clamp(0.0, 65536.0) as u32 % 65536) as u16
}

/// LIFX LAN protocol backend.
pub struct LifxBackend {
    config: LifxConfig,
    socket: OnceLock<UdpSocket>,
    sequence: AtomicU8,
}

impl LifxBackend {
    #[must_use]
    pub fn new(config: LifxConfig) -> Self {
        Self {
            config,
            socket: OnceLock::new(),
            sequence: AtomicU8::new(0),
        }
    }

    async fn bind(&self) -> Result<&UdpSocket, LifxError> {
        if let Some(socket) = self.socket.get() {
            return Ok(socket);
        }
        let addr = SocketAddrV4::new(self.config.interface, 0);
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| LifxError::Bind { addr, source })?;
        socket
            .set_broadcast(true)
            .map_err(|source| LifxError::Bind { addr, source })?;
        Ok(self.socket.get_or_init(|| socket))
    }

    async fn send(&self, device: &LifxDevice, message: Message) -> Result<(), LifxError> {
        let socket = self.socket.get().ok_or(LifxError::Disabled)?;
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let packet = Packet::to_device(SOURCE, device.mac, sequence, message);
        socket
            .send_to(&packet.encode(), device.addr)
            .await
            .map_err(|source| LifxError::Send {
                mac: device.native_id.clone(),
                source,
            })?;
        Ok(())
    }
}

impl LightBackend for LifxBackend {
    type Device = LifxDevice;

    fn kind(&self) -> LightType {
        LightType::Lifx
    }

    fn reconciles(&self) -> bool {
        true
    }

    async fn init(&self) -> Result<Vec<LifxDevice>, LightsError> {
        if !self.config.enabled {
            return Err(LifxError::Disabled.into());
        }
        let socket = self.bind().await?;
        let broadcast = SocketAddr::from(SocketAddrV4::new(self.config.broadcast, self.config.port));

        tracing::info!(
            %broadcast,
            timeout_ms = self.config.discovery_timeout_ms,
            "LIFX discovery started"
        );
        let bulbs =
            discovery::discover_bulbs(socket, SOURCE, broadcast, self.config.discovery_timeout())
                .await?;
        tracing::info!(count = bulbs.len(), "LIFX discovery complete");

        Ok(bulbs
            .into_iter()
            .map(|bulb| LifxDevice::new(bulb.mac, bulb.addr, bulb.label))
            .collect())
    }

    async fn set_light_state(
        &self,
        device: &LifxDevice,
        command: &LightCommand,
        transition: Duration,
    ) -> Result<(), LightsError> {
        let duration = u32::try_from(transition.as_millis()).unwrap_or(u32::MAX);
        match to_hsbk(command) {
            Some(color) => {
                self.send(device, Message::SetColor { color, duration })
                    .await?;
                self.send(
                    device,
                    Message::SetLightPower {
                        level: u16::MAX,
                        duration,
                    },
                )
                .await?;
            }
            None => {
                self.send(device, Message::SetLightPower { level: 0, duration })
                    .await?;
            }
        }
        tracing::debug!(mac = %device.native_id, "LIFX state sent");
        Ok(())
    }
}
