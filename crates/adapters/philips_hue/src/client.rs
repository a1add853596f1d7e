//! Thin HTTP client over one bridge.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::api::{self, DiscoveredBridge, LightInfo, LightState, PairRequest};
use crate::error::HueError;

/// Ask the N-UPnP endpoint for bridges on the local network.
///
/// # Errors
///
/// Returns [`HueError::Http`] on transport failure or a non-success status.
pub async fn discover(
    http: &reqwest::Client,
    discovery_url: &str,
) -> Result<Vec<DiscoveredBridge>, HueError> {
    let bridges = http
        .get(discovery_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(bridges)
}

/// Normalise a configured or discovered bridge address into a base URL.
#[must_use]
pub fn base_url(address: &str) -> String {
    let address = address.trim_end_matches('/');
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}

#[derive(Debug, Clone)]
pub struct BridgeClient {
    http: reqwest::Client,
    base: String,
}

impl BridgeClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base: String) -> Self {
        Self { http, base }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Request a new username. Only succeeds shortly after the bridge's
    /// link button has been pressed.
    ///
    /// # Errors
    ///
    /// Returns [`HueError::LinkButtonNotPressed`] until the button is pressed.
    pub async fn pair(&self, device_type: &str) -> Result<String, HueError> {
        let value: Value = self
            .http
            .post(format!("{}/api", self.base))
            .json(&PairRequest {
                devicetype: device_type,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        api::parse_pairing(value)
    }

    /// List the lights paired with the bridge, keyed by bridge light id.
    ///
    /// # Errors
    ///
    /// Returns the bridge's error (unauthorized user included) or a
    /// transport error.
    pub async fn lights(&self, username: &str) -> Result<BTreeMap<String, LightInfo>, HueError> {
        let value: Value = self
            .http
            .get(format!("{}/api/{username}/lights", self.base))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        api::parse_lights(value)
    }

    /// Push a state update to one light.
    ///
    /// # Errors
    ///
    /// Returns the first error the bridge reported or a transport error.
    pub async fn set_state(
        &self,
        username: &str,
        light_id: &str,
        state: &LightState,
    ) -> Result<(), HueError> {
        let value: Value = self
            .http
            .put(format!("{}/api/{username}/lights/{light_id}/state", self.base))
            .json(state)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        api::parse_state_update(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_prefix_bare_address_with_http() {
        assert_eq!(base_url("192.168.1.2"), "http://192.168.1.2");
        assert_eq!(base_url("bridge.lan:8080/"), "http://bridge.lan:8080");
    }

    #[test]
    fn should_keep_full_url() {
        assert_eq!(base_url("https://bridge.lan"), "https://bridge.lan");
    }
}
