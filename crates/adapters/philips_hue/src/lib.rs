//! # homelights-adapter-philips-hue
//!
//! Backend for lights paired with a Philips Hue bridge.
//!
//! ## Startup
//!
//! 1. Use the configured bridge address, or the first bridge reported by the
//!    N-UPnP discovery endpoint.
//! 2. Reuse the cached username for that bridge. Without one (or when the
//!    bridge rejects it), pair: the bridge only issues a username right after
//!    its link button is pressed, so `init` fails with a pairing-required
//!    error until then.
//! 3. List the bridge's lights. The application reconciles the store against
//!    this list, so bridge lights appear and disappear on their own.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `homelights-app` and `homelights-domain`.

mod api;
mod client;
mod config;
mod credentials;
mod error;

pub use config::{DEFAULT_DISCOVERY_URL, HueConfig};
pub use error::HueError;

use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

use homelights_app::ports::{DeviceHandle, LightBackend};
use homelights_app::resolver::LightCommand;
use homelights_domain::error::LightsError;
use homelights_domain::light::LightType;

use crate::api::{LightInfo, LightState};
use crate::client::BridgeClient;
use crate::credentials::Credentials;

/// A light known to the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HueLightHandle {
    id: String,
    name: String,
}

impl DeviceHandle for HueLightHandle {
    fn native_id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

struct Session {
    client: BridgeClient,
    username: String,
}

/// Philips Hue bridge backend.
pub struct HueBackend {
    config: HueConfig,
    http: reqwest::Client,
    session: OnceLock<Session>,
}

impl HueBackend {
    /// # Errors
    ///
    /// Returns [`HueError::Http`] when the HTTP client cannot be built.
    pub fn new(config: HueConfig) -> Result<Self, HueError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            config,
            http,
            session: OnceLock::new(),
        })
    }

    async fn bridge_base(&self) -> Result<String, HueError> {
        if let Some(address) = &self.config.bridge_address {
            return Ok(client::base_url(address));
        }
        let bridges = client::discover(&self.http, &self.config.discovery_url).await?;
        let bridge = bridges.first().ok_or(HueError::NoBridge)?;
        tracing::info!(
            id = %bridge.id,
            address = %bridge.address,
            found = bridges.len(),
            "using discovered Hue bridge"
        );
        Ok(client::base_url(&bridge.address))
    }

    async fn connect(&self) -> Result<(Session, BTreeMap<String, LightInfo>), HueError> {
        let client = BridgeClient::new(self.http.clone(), self.bridge_base().await?);
        let path = &self.config.credentials_path;

        let cached = credentials::load(path)
            .await?
            .filter(|credentials| credentials.bridge == client.base());
        if let Some(credentials) = cached {
            match client.lights(&credentials.username).await {
                Ok(lights) => {
                    let session = Session {
                        client,
                        username: credentials.username,
                    };
                    return Ok((session, lights));
                }
                Err(err) if err.is_unauthorized() => {
                    tracing::warn!(bridge = client.base(), "cached Hue username rejected, pairing again");
                }
                Err(err) => return Err(err),
            }
        }

        let username = client.pair(&self.config.device_type).await?;
        tracing::info!(bridge = client.base(), "paired with Hue bridge");
        let credentials = Credentials {
            bridge: client.base().to_string(),
            username,
        };
        if let Err(err) = credentials::save(path, &credentials).await {
            tracing::warn!(%err, path = %path.display(), "could not cache Hue username");
        }

        let lights = client.lights(&credentials.username).await?;
        let session = Session {
            client,
            username: credentials.username,
        };
        Ok((session, lights))
    }
}

impl LightBackend for HueBackend {
    type Device = HueLightHandle;

    fn kind(&self) -> LightType {
        LightType::PhilipsHue
    }

    fn reconciles(&self) -> bool {
        true
    }

    async fn init(&self) -> Result<Vec<HueLightHandle>, LightsError> {
        if !self.config.enabled {
            return Err(HueError::Disabled.into());
        }
        let (session, lights) = self.connect().await?;
        tracing::info!(
            bridge = session.client.base(),
            lights = lights.len(),
            "Hue bridge ready"
        );
        if self.session.set(session).is_err() {
            tracing::debug!("Hue session already established, keeping the existing one");
        }
        Ok(lights
            .into_iter()
            .map(|(id, info)| HueLightHandle {
                id,
                name: info.name,
            })
            .collect())
    }

    async fn set_light_state(
        &self,
        device: &HueLightHandle,
        command: &LightCommand,
        transition: Duration,
    ) -> Result<(), LightsError> {
        let session = self
            .session
            .get()
            .ok_or_else(|| HueError::Disabled.into_transport(&device.id))?;
        let state = LightState::from_command(command, transition);
        session
            .client
            .set_state(&session.username, &device.id, &state)
            .await
            .map_err(|err| err.into_transport(&device.id))?;
        tracing::debug!(light = %device.id, on = state.on, "Hue state sent");
        Ok(())
    }
}
