//! Philips Hue backend configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Public N-UPnP endpoint listing the bridges on the caller's network.
pub const DEFAULT_DISCOVERY_URL: &str = "https://discovery.meethue.com";

/// Configuration for the Philips Hue backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HueConfig {
    pub enabled: bool,
    /// Bridge host (`192.168.1.2`, `bridge.lan:8080` or a full `http://` URL).
    ///
    /// When unset, the first bridge reported by `discovery_url` is used.
    pub bridge_address: Option<String>,
    pub discovery_url: String,
    /// Application name sent when pairing (`<app>#<device>`).
    pub device_type: String,
    /// Where the bridge username is cached after pairing.
    pub credentials_path: PathBuf,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for HueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bridge_address: None,
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            device_type: "homelights#server".to_string(),
            credentials_path: PathBuf::from("hue-credentials.json"),
            timeout_secs: 10,
        }
    }
}
