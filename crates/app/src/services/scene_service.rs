//! Scene service: use-cases for managing scenes.
//!
//! Scene writes are where pattern assignment is constrained: an entry may
//! only point a light at a pattern its backend can render.

use homelights_domain::error::{LightsError, NotFoundError, ValidationError};
use homelights_domain::id::SceneId;
use homelights_domain::scene::Scene;

use crate::ports::{LightRepository, PatternRepository, SceneRepository};

/// Application service for scene CRUD operations.
pub struct SceneService<S, L, P> {
    repo: S,
    lights: L,
    patterns: P,
}

impl<S, L, P> SceneService<S, L, P>
where
    S: SceneRepository,
    L: LightRepository,
    P: PatternRepository,
{
    /// Create a new service backed by the scene repository, with read access
    /// to lights and patterns for assignment checks.
    pub fn new(repo: S, lights: L, patterns: P) -> Self {
        Self {
            repo,
            lights,
            patterns,
        }
    }

    /// Create a new scene after validating its entries.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] if invariants fail or an entry
    /// assigns a pattern the light cannot render, [`LightsError::NotFound`]
    /// if an entry references a missing light or pattern, or a storage
    /// error propagated from the repository.
    #[tracing::instrument(skip(self, scene), fields(scene_name = %scene.name, entries = scene.lights.len()))]
    pub async fn create_scene(&self, scene: Scene) -> Result<Scene, LightsError> {
        self.check_assignments(&scene).await?;
        self.repo.create(scene).await
    }

    /// Look up a scene by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::NotFound`] when no scene with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_scene(&self, id: SceneId) -> Result<Scene, LightsError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Scene",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all scenes.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_scenes(&self) -> Result<Vec<Scene>, LightsError> {
        self.repo.get_all().await
    }

    /// Replace a scene and its entries.
    ///
    /// # Errors
    ///
    /// Same as [`create_scene`](Self::create_scene).
    #[tracing::instrument(skip(self, scene), fields(scene_id = %scene.id))]
    pub async fn update_scene(&self, scene: Scene) -> Result<Scene, LightsError> {
        self.check_assignments(&scene).await?;
        self.repo.update(scene).await
    }

    /// Delete a scene by id. Zones showing it lose their active scene.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_scene(&self, id: SceneId) -> Result<(), LightsError> {
        self.repo.delete(id).await
    }

    async fn check_assignments(&self, scene: &Scene) -> Result<(), LightsError> {
        scene.validate()?;
        for entry in &scene.lights {
            let light = self.lights.get_by_id(entry.light_id).await?.ok_or_else(|| {
                NotFoundError {
                    entity: "Light",
                    id: entry.light_id.to_string(),
                }
            })?;
            let Some(pattern_id) = entry.pattern_id else {
                continue;
            };
            let pattern = self.patterns.get_by_id(pattern_id).await?.ok_or_else(|| {
                NotFoundError {
                    entity: "Pattern",
                    id: pattern_id.to_string(),
                }
            })?;
            let backend = light.light_type();
            let pattern = pattern.pattern_type();
            if !backend.supported_patterns().contains(&pattern) {
                return Err(ValidationError::UnsupportedPattern { backend, pattern }.into());
            }
        }
        Ok(())
    }
}
