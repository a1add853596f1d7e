//! # homelights-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `homelights-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//! - Report uniqueness and foreign-key violations as conflicts
//!
//! ## Dependency rule
//! Depends on `homelights-app` (for port traits) and `homelights-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod light_repo;
pub mod pattern_repo;
pub mod pool;
pub mod scene_repo;
pub mod zone_repo;

pub use light_repo::SqliteLightRepository;
pub use pattern_repo::SqlitePatternRepository;
pub use pool::{Config, Database};
pub use scene_repo::SqliteSceneRepository;
pub use zone_repo::SqliteZoneRepository;
