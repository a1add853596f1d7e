//! Zone service: use-cases for managing zones.

use homelights_domain::error::{LightsError, NotFoundError};
use homelights_domain::id::ZoneId;
use homelights_domain::zone::Zone;

use crate::ports::ZoneRepository;

/// Application service for zone CRUD operations.
pub struct ZoneService<R> {
    repo: R,
}

impl<R: ZoneRepository> ZoneService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new zone after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, zone), fields(zone_name = %zone.name))]
    pub async fn create_zone(&self, zone: Zone) -> Result<Zone, LightsError> {
        zone.validate()?;
        self.repo.create(zone).await
    }

    /// Look up a zone by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::NotFound`] when no zone with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_zone(&self, id: ZoneId) -> Result<Zone, LightsError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Zone",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all zones.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_zones(&self) -> Result<Vec<Zone>, LightsError> {
        self.repo.get_all().await
    }

    /// Update an existing zone.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, zone), fields(zone_id = %zone.id))]
    pub async fn update_zone(&self, zone: Zone) -> Result<Zone, LightsError> {
        zone.validate()?;
        self.repo.update(zone).await
    }

    /// Delete a zone by id. Its lights become unassigned.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_zone(&self, id: ZoneId) -> Result<(), LightsError> {
        self.repo.delete(id).await
    }
}
