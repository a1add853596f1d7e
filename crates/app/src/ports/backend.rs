//! Backend port: a device family that can be discovered and driven.
//!
//! Each backend adapter (RVL, Philips Hue, LIFX) implements [`LightBackend`].
//! The application wraps it in an [`Effector`](crate::effector::Effector),
//! which owns the device registry and the startup sequence.

use std::future::Future;
use std::time::Duration;

use homelights_domain::error::LightsError;
use homelights_domain::light::LightType;
use homelights_domain::pattern::PatternType;

use crate::resolver::LightCommand;

/// A discovered device, addressable by its backend-native id.
pub trait DeviceHandle: Clone + Send + Sync + 'static {
    /// The id the store of record keys this device by
    /// (RVL channel, Hue light id, LIFX MAC address).
    fn native_id(&self) -> &str;

    /// A human-readable name reported by the device, used when a new
    /// record is created during reconciliation.
    fn label(&self) -> &str;
}

/// A pluggable lighting backend.
///
/// The application calls [`init`](Self::init) exactly once at startup,
/// then [`set_light_state`](Self::set_light_state) for every dispatch.
pub trait LightBackend: Send + Sync {
    type Device: DeviceHandle;

    /// Which [`LightType`] this backend drives.
    fn kind(&self) -> LightType;

    /// Whether the store of record should be reconciled against discovery.
    ///
    /// Backends whose device set is fixed (RVL channels) return `false`.
    fn reconciles(&self) -> bool;

    /// Pattern types this backend can render.
    fn supported_patterns(&self) -> &'static [PatternType] {
        self.kind().supported_patterns()
    }

    /// Discover devices (and pair, where the backend requires it).
    fn init(&self) -> impl Future<Output = Result<Vec<Self::Device>, LightsError>> + Send;

    /// Push a resolved command to one device.
    fn set_light_state(
        &self,
        device: &Self::Device,
        command: &LightCommand,
        transition: Duration,
    ) -> impl Future<Output = Result<(), LightsError>> + Send;
}
