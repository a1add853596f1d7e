//! Storage-specific error type wrapping sqlx errors.

use homelights_domain::error::{ConflictError, LightsError};

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to (de)serialize a stored JSON value.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// The constrained column of a SQLite constraint message,
/// e.g. `lights.channel` from `UNIQUE constraint failed: lights.channel`.
fn constraint_target(message: &str) -> String {
    message
        .split_once(": ")
        .map_or(message, |(_, target)| target)
        .to_string()
}

/// SQLite reports a foreign key enforced through `ON DELETE RESTRICT` as
/// `SQLITE_CONSTRAINT_TRIGGER` (1811) rather than
/// `SQLITE_CONSTRAINT_FOREIGNKEY` (787).
fn is_restricted_reference(db: &dyn sqlx::error::DatabaseError) -> bool {
    db.code().as_deref() == Some("1811") && db.message().starts_with("FOREIGN KEY constraint failed")
}

impl From<StorageError> for LightsError {
    fn from(err: StorageError) -> Self {
        if let StorageError::Database(sqlx::Error::Database(db)) = &err {
            if db.is_unique_violation() {
                return ConflictError::Duplicate(constraint_target(db.message())).into();
            }
            if db.is_foreign_key_violation() || is_restricted_reference(db.as_ref()) {
                return ConflictError::MissingReference(constraint_target(db.message())).into();
            }
        }
        Self::Storage(Box::new(err))
    }
}
