//! Pattern service: use-cases for managing patterns.

use homelights_domain::error::{LightsError, NotFoundError, ValidationError};
use homelights_domain::id::PatternId;
use homelights_domain::pattern::Pattern;

use crate::ports::PatternRepository;

/// Application service for pattern CRUD operations.
pub struct PatternService<R> {
    repo: R,
}

impl<R: PatternRepository> PatternService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new pattern after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, pattern), fields(pattern_name = %pattern.name, pattern_type = %pattern.pattern_type()))]
    pub async fn create_pattern(&self, pattern: Pattern) -> Result<Pattern, LightsError> {
        pattern.validate()?;
        self.repo.create(pattern).await
    }

    /// Look up a pattern by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::NotFound`] when no pattern with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_pattern(&self, id: PatternId) -> Result<Pattern, LightsError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Pattern",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all patterns.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_patterns(&self) -> Result<Vec<Pattern>, LightsError> {
        self.repo.get_all().await
    }

    /// Update an existing pattern.
    ///
    /// The pattern type is fixed at creation: scene entries were checked
    /// against their light's backend for that type.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] if invariants fail or the type
    /// changes, [`LightsError::NotFound`] if the pattern does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, pattern), fields(pattern_id = %pattern.id))]
    pub async fn update_pattern(&self, pattern: Pattern) -> Result<Pattern, LightsError> {
        pattern.validate()?;
        let existing = self.get_pattern(pattern.id).await?;
        let (from, to) = (existing.pattern_type(), pattern.pattern_type());
        if from != to {
            return Err(ValidationError::PatternTypeChanged { from, to }.into());
        }
        self.repo.update(pattern).await
    }

    /// Delete a pattern by id.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Conflict`] while a scene still references the
    /// pattern, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_pattern(&self, id: PatternId) -> Result<(), LightsError> {
        self.repo.delete(id).await
    }
}
