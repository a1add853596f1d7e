//! Effector: one backend coupled with the registry of its devices.

use std::time::Duration;

use homelights_domain::error::{BootstrapError, LightsError};
use homelights_domain::light::{Light, LightType};
use homelights_domain::pattern::Pattern;
use homelights_domain::scene::Scene;
use homelights_domain::zone::ZoneState;

use crate::ports::{LightBackend, LightRepository};
use crate::reconciler;
use crate::registry::{DeviceRegistry, RegistryState};
use crate::resolver::{LightCommand, resolve};
use crate::services::light_service::LightService;

/// Observable state of one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    pub light_type: LightType,
    pub state: RegistryState,
    pub device_count: usize,
}

/// Owns a backend and the only writable handle on its registry.
pub struct Effector<B: LightBackend> {
    backend: B,
    registry: DeviceRegistry<B::Device>,
}

impl<B: LightBackend> Effector<B> {
    pub fn new(backend: B) -> Self {
        let registry = DeviceRegistry::new(backend.kind());
        Self { backend, registry }
    }

    pub fn kind(&self) -> LightType {
        self.backend.kind()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn registry(&self) -> &DeviceRegistry<B::Device> {
        &self.registry
    }

    pub fn status(&self) -> BackendStatus {
        BackendStatus {
            light_type: self.kind(),
            state: self.registry.state(),
            device_count: self.registry.len(),
        }
    }

    /// Discover devices, populate the registry, then reconcile the store.
    ///
    /// Runs once per process. On failure the registry is marked stale and
    /// every later dispatch to this backend reports the backend as disabled.
    /// An empty discovery is a failure too: reconciling against it would
    /// delete every record of this type.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Bootstrap`] when discovery or pairing fails,
    /// or the storage error that aborted reconciliation.
    #[tracing::instrument(skip_all, fields(backend = %self.kind()))]
    pub async fn start<R: LightRepository>(&self, lights: &LightService<R>) -> Result<usize, LightsError> {
        let result = self.bootstrap(lights).await;
        match &result {
            Ok(count) => tracing::info!(devices = count, "backend ready"),
            Err(err) => {
                tracing::warn!(%err, detail = %err.detail(), "backend disabled until restart");
                self.registry.mark_stale(err.detail());
            }
        }
        result
    }

    async fn bootstrap<R: LightRepository>(&self, lights: &LightService<R>) -> Result<usize, LightsError> {
        let devices = self.backend.init().await?;
        if devices.is_empty() {
            return Err(BootstrapError::NothingDiscovered(self.kind()).into());
        }
        if self.backend.reconciles() {
            reconciler::reconcile(self.kind(), lights, &devices).await?;
        }
        let count = devices.len();
        self.registry.populate(devices);
        Ok(count)
    }

    /// Resolve and push the command for one light.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::DeviceUnavailable`] when the device is not in
    /// the registry, the resolver's error for integrity or capability
    /// failures, or the backend's transport error.
    pub async fn apply(
        &self,
        light: &Light,
        zone_state: &ZoneState,
        scene: Option<&Scene>,
        patterns: &[Pattern],
        transition: Duration,
    ) -> Result<LightCommand, LightsError> {
        let device = self.registry.lookup(&light.native_id())?;
        let command = resolve(
            light,
            zone_state,
            scene,
            patterns,
            self.backend.supported_patterns(),
        )?;
        self.backend
            .set_light_state(&device, &command, transition)
            .await?;
        Ok(command)
    }
}
