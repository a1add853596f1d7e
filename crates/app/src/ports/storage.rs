//! Storage port: Repository traits for the store of record.
//!
//! Every write either succeeds or reports a [`LightsError::Conflict`] for
//! uniqueness and foreign-key violations.

use std::future::Future;

use homelights_domain::error::LightsError;
use homelights_domain::id::{LightId, PatternId, SceneId, ZoneId};
use homelights_domain::light::Light;
use homelights_domain::pattern::Pattern;
use homelights_domain::scene::Scene;
use homelights_domain::zone::Zone;

/// Repository for persisting and querying [`Zone`]s.
pub trait ZoneRepository {
    /// Create a new zone in storage.
    fn create(&self, zone: Zone) -> impl Future<Output = Result<Zone, LightsError>> + Send;

    /// Get a zone by its unique identifier.
    fn get_by_id(&self, id: ZoneId)
    -> impl Future<Output = Result<Option<Zone>, LightsError>> + Send;

    /// Get all zones.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Zone>, LightsError>> + Send;

    /// Update an existing zone.
    fn update(&self, zone: Zone) -> impl Future<Output = Result<Zone, LightsError>> + Send;

    /// Delete a zone by its unique identifier.
    fn delete(&self, id: ZoneId) -> impl Future<Output = Result<(), LightsError>> + Send;
}

/// Repository for persisting and querying [`Light`]s of every backend.
pub trait LightRepository {
    /// Create a new light in storage.
    fn create(&self, light: Light) -> impl Future<Output = Result<Light, LightsError>> + Send;

    /// Get a light by its unique identifier.
    fn get_by_id(
        &self,
        id: LightId,
    ) -> impl Future<Output = Result<Option<Light>, LightsError>> + Send;

    /// Get all lights.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Light>, LightsError>> + Send;

    /// Update an existing light.
    fn update(&self, light: Light) -> impl Future<Output = Result<Light, LightsError>> + Send;

    /// Delete a light by its unique identifier, whatever its type.
    fn delete(&self, id: LightId) -> impl Future<Output = Result<(), LightsError>> + Send;
}

/// Repository for persisting and querying [`Scene`]s with their light entries.
pub trait SceneRepository {
    /// Create a new scene and its entries.
    fn create(&self, scene: Scene) -> impl Future<Output = Result<Scene, LightsError>> + Send;

    /// Get a scene by its unique identifier.
    fn get_by_id(
        &self,
        id: SceneId,
    ) -> impl Future<Output = Result<Option<Scene>, LightsError>> + Send;

    /// Get all scenes.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Scene>, LightsError>> + Send;

    /// Replace a scene and all of its entries.
    fn update(&self, scene: Scene) -> impl Future<Output = Result<Scene, LightsError>> + Send;

    /// Delete a scene by its unique identifier.
    fn delete(&self, id: SceneId) -> impl Future<Output = Result<(), LightsError>> + Send;
}

/// Repository for persisting and querying [`Pattern`]s.
pub trait PatternRepository {
    /// Create a new pattern in storage.
    fn create(&self, pattern: Pattern)
    -> impl Future<Output = Result<Pattern, LightsError>> + Send;

    /// Get a pattern by its unique identifier.
    fn get_by_id(
        &self,
        id: PatternId,
    ) -> impl Future<Output = Result<Option<Pattern>, LightsError>> + Send;

    /// Get all patterns.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Pattern>, LightsError>> + Send;

    /// Update an existing pattern.
    fn update(&self, pattern: Pattern)
    -> impl Future<Output = Result<Pattern, LightsError>> + Send;

    /// Delete a pattern by its unique identifier.
    fn delete(&self, id: PatternId) -> impl Future<Output = Result<(), LightsError>> + Send;
}
