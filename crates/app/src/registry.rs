//! Device registry: discovered devices of one backend, keyed by native id.
//!
//! A registry is written once by its backend's startup sequence and read
//! concurrently by every dispatch afterwards.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use homelights_domain::error::DeviceUnavailableError;
use homelights_domain::light::LightType;

use crate::ports::DeviceHandle;

/// Lifecycle of a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryState {
    /// The backend has not finished `init` yet.
    Uninitialized,
    /// Discovery succeeded; lookups are served.
    Populated,
    /// Discovery failed or found nothing. Holds the reason.
    Stale(String),
}

impl RegistryState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Populated => "populated",
            Self::Stale(_) => "stale",
        }
    }
}

struct Inner<D> {
    state: RegistryState,
    devices: HashMap<String, D>,
}

/// Discovered devices of a single backend.
pub struct DeviceRegistry<D> {
    kind: LightType,
    inner: RwLock<Inner<D>>,
}

impl<D: DeviceHandle> DeviceRegistry<D> {
    #[must_use]
    pub fn new(kind: LightType) -> Self {
        Self {
            kind,
            inner: RwLock::new(Inner {
                state: RegistryState::Uninitialized,
                devices: HashMap::new(),
            }),
        }
    }

    /// Replace the registry contents with `devices` and mark it populated.
    pub fn populate(&self, devices: impl IntoIterator<Item = D>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.devices = devices
            .into_iter()
            .map(|device| (device.native_id().to_string(), device))
            .collect();
        inner.state = RegistryState::Populated;
    }

    /// Mark the registry unusable, keeping whatever devices it held.
    pub fn mark_stale(&self, reason: impl Into<String>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.state = RegistryState::Stale(reason.into());
    }

    pub fn state(&self) -> RegistryState {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            .clone()
    }

    /// Find the device with `native_id`.
    ///
    /// # Errors
    ///
    /// - [`DeviceUnavailableError::BackendDisabled`] when the registry is not populated.
    /// - [`DeviceUnavailableError::NotDiscovered`] when no such device was discovered.
    pub fn lookup(&self, native_id: &str) -> Result<D, DeviceUnavailableError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        if inner.state != RegistryState::Populated {
            return Err(DeviceUnavailableError::BackendDisabled(self.kind));
        }
        inner
            .devices
            .get(native_id)
            .cloned()
            .ok_or_else(|| DeviceUnavailableError::NotDiscovered {
                kind: self.kind,
                native_id: native_id.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .devices
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every registered device.
    pub fn devices(&self) -> Vec<D> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .devices
            .values()
            .cloned()
            .collect()
    }
}
