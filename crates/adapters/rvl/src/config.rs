//! RVL backend configuration.

use std::net::Ipv4Addr;

use serde::Deserialize;

/// Default UDP port RVL receivers listen on.
pub const DEFAULT_PORT: u16 = 4978;

/// Configuration for the RVL backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RvlConfig {
    /// When `false`, `init` fails and every dispatch reports the backend
    /// as disabled.
    pub enabled: bool,
    /// Local interface address the sending socket binds to.
    pub interface: Ipv4Addr,
    /// Destination port for wave-parameter frames.
    pub port: u16,
    /// Destination address, usually the subnet broadcast address.
    pub broadcast: Ipv4Addr,
}

impl Default for RvlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interface: Ipv4Addr::UNSPECIFIED,
            port: DEFAULT_PORT,
            broadcast: Ipv4Addr::BROADCAST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_broadcast_on_all_interfaces() {
        let config = RvlConfig::default();
        assert!(config.enabled);
        assert_eq!(config.interface, Ipv4Addr::UNSPECIFIED);
        assert_eq!(config.broadcast, Ipv4Addr::BROADCAST);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn should_parse_partial_toml() {
        let config: RvlConfig = toml::from_str(
            r#"
            interface = "192.168.1.20"
            broadcast = "192.168.1.255"
            "#,
        )
        .unwrap();

        assert_eq!(config.interface, Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(config.broadcast, Ipv4Addr::new(192, 168, 1, 255));
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.enabled);
    }
}
