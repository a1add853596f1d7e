//! LIFX backend configuration.

use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Deserialize;

/// UDP port every LIFX bulb listens on.
pub const LIFX_PORT: u16 = 56700;

/// Configuration for the LIFX backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LifxConfig {
    pub enabled: bool,
    /// Local interface address the socket binds to.
    pub interface: Ipv4Addr,
    /// Where discovery requests are broadcast.
    pub broadcast: Ipv4Addr,
    pub port: u16,
    /// How long discovery collects replies, in milliseconds.
    pub discovery_timeout_ms: u64,
}

impl LifxConfig {
    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }
}

impl Default for LifxConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interface: Ipv4Addr::UNSPECIFIED,
            broadcast: Ipv4Addr::BROADCAST,
            port: LIFX_PORT,
            discovery_timeout_ms: 2_000,
        }
    }
}
