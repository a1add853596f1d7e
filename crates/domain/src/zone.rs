//! Zone: A physical area grouping lights controlled as a unit.

use serde::{Deserialize, Serialize};

use crate::color::MAX_BRIGHTNESS;
use crate::error::{LightsError, ValidationError};
use crate::id::{SceneId, ZoneId};

/// A named group of lights with its persisted control state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub power: bool,
    pub active_scene_id: Option<SceneId>,
    pub brightness: u8,
}

/// The instantaneous control target handed to the dispatcher.
///
/// Kept apart from [`Zone`] so callers can apply transient overrides
/// without writing them to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneState {
    pub zone_id: ZoneId,
    pub power: bool,
    pub brightness: u8,
}

impl Zone {
    /// Create a builder for constructing a [`Zone`].
    #[must_use]
    pub fn builder() -> ZoneBuilder {
        ZoneBuilder::default()
    }

    /// Snapshot the control-relevant part of this zone.
    #[must_use]
    pub fn state(&self) -> ZoneState {
        ZoneState {
            zone_id: self.id,
            power: self.power,
            brightness: self.brightness,
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), LightsError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Zone`].
///
/// New zones are powered off, at full brightness, with no scene.
#[derive(Debug, Default)]
pub struct ZoneBuilder {
    id: Option<ZoneId>,
    name: Option<String>,
    power: bool,
    active_scene_id: Option<SceneId>,
    brightness: Option<u8>,
}

impl ZoneBuilder {
    #[must_use]
    pub fn id(mut self, id: ZoneId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn power(mut self, power: bool) -> Self {
        self.power = power;
        self
    }

    #[must_use]
    pub fn active_scene_id(mut self, scene_id: SceneId) -> Self {
        self.active_scene_id = Some(scene_id);
        self
    }

    #[must_use]
    pub fn brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Consume the builder, validate, and return a [`Zone`].
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Zone, LightsError> {
        let zone = Zone {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            power: self.power,
            active_scene_id: self.active_scene_id,
            brightness: self.brightness.unwrap_or(MAX_BRIGHTNESS),
        };
        zone.validate()?;
        Ok(zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_zone_with_defaults() {
        let zone = Zone::builder().name("Living Room").build().unwrap();
        assert!(!zone.power);
        assert_eq!(zone.brightness, 255);
        assert!(zone.active_scene_id.is_none());
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = Zone::builder().build();
        assert!(matches!(
            result,
            Err(LightsError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_snapshot_state() {
        let zone = Zone::builder()
            .name("Kitchen")
            .power(true)
            .brightness(42)
            .build()
            .unwrap();
        let state = zone.state();
        assert_eq!(state.zone_id, zone.id);
        assert!(state.power);
        assert_eq!(state.brightness, 42);
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let zone = Zone::builder()
            .name("Bedroom")
            .active_scene_id(SceneId::new())
            .build()
            .unwrap();
        let json = serde_json::to_string(&zone).unwrap();
        let parsed: Zone = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, zone);
    }
}
