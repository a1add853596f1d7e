//! Scene: A named assignment of patterns to lights, reusable across zones.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::color::MAX_BRIGHTNESS;
use crate::error::{LightsError, ValidationError};
use crate::id::{LightId, PatternId, SceneId};

/// A named mapping from light to pattern with per-light brightness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub name: String,
    pub brightness: u8,
    pub lights: Vec<SceneLight>,
}

/// One light's entry within a scene.
///
/// An entry without a pattern is an explicit "off" for that light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneLight {
    pub light_id: LightId,
    pub pattern_id: Option<PatternId>,
    pub brightness: u8,
}

impl Scene {
    /// Create a builder for constructing a [`Scene`].
    #[must_use]
    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    /// Find the entry for `light_id`, if the scene covers that light.
    #[must_use]
    pub fn entry(&self, light_id: LightId) -> Option<&SceneLight> {
        self.lights.iter().find(|entry| entry.light_id == light_id)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] when `name` is empty or a light
    /// is listed twice.
    pub fn validate(&self) -> Result<(), LightsError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let mut seen = HashSet::with_capacity(self.lights.len());
        for entry in &self.lights {
            if !seen.insert(entry.light_id) {
                return Err(ValidationError::DuplicateSceneLight(entry.light_id.to_string()).into());
            }
        }
        Ok(())
    }

    /// Pattern ids referenced by this scene, without duplicates.
    #[must_use]
    pub fn pattern_ids(&self) -> HashSet<PatternId> {
        self.lights.iter().filter_map(|entry| entry.pattern_id).collect()
    }
}

/// Step-by-step builder for [`Scene`].
#[derive(Debug, Default)]
pub struct SceneBuilder {
    id: Option<SceneId>,
    name: Option<String>,
    brightness: Option<u8>,
    lights: Vec<SceneLight>,
}

impl SceneBuilder {
    #[must_use]
    pub fn id(mut self, id: SceneId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Assign `pattern_id` (or "off" with `None`) to a light.
    #[must_use]
    pub fn light(mut self, light_id: LightId, pattern_id: Option<PatternId>, brightness: u8) -> Self {
        self.lights.push(SceneLight {
            light_id,
            pattern_id,
            brightness,
        });
        self
    }

    /// Consume the builder, validate, and return a [`Scene`].
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] if `name` is missing or a light
    /// appears twice.
    pub fn build(self) -> Result<Scene, LightsError> {
        let scene = Scene {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            brightness: self.brightness.unwrap_or(MAX_BRIGHTNESS),
            lights: self.lights,
        };
        scene.validate()?;
        Ok(scene)
    }
}
