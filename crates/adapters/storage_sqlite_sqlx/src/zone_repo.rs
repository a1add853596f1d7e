//! `SQLite` implementation of [`ZoneRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use homelights_app::ports::ZoneRepository;
use homelights_domain::error::{LightsError, NotFoundError};
use homelights_domain::id::{SceneId, ZoneId};
use homelights_domain::zone::Zone;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Zone`].
struct Wrapper(Zone);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Zone> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let power: bool = row.try_get("power")?;
        let active_scene_id: Option<String> = row.try_get("active_scene_id")?;
        let brightness: u8 = row.try_get("brightness")?;

        let id = ZoneId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let active_scene_id = active_scene_id
            .map(|s| SceneId::from_str(&s))
            .transpose()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Zone {
            id,
            name,
            power,
            active_scene_id,
            brightness,
        }))
    }
}

const INSERT: &str =
    "INSERT INTO zones (id, name, power, active_scene_id, brightness) VALUES (?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM zones WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM zones ORDER BY name";
const UPDATE: &str =
    "UPDATE zones SET name = ?, power = ?, active_scene_id = ?, brightness = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM zones WHERE id = ?";

/// `SQLite`-backed zone repository.
#[derive(Clone)]
pub struct SqliteZoneRepository {
    pool: SqlitePool,
}

impl SqliteZoneRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ZoneRepository for SqliteZoneRepository {
    fn create(&self, zone: Zone) -> impl Future<Output = Result<Zone, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(zone.id.to_string())
                .bind(&zone.name)
                .bind(zone.power)
                .bind(zone.active_scene_id.map(|id| id.to_string()))
                .bind(zone.brightness)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(zone)
        }
    }

    fn get_by_id(
        &self,
        id: ZoneId,
    ) -> impl Future<Output = Result<Option<Zone>, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Zone>, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(&self, zone: Zone) -> impl Future<Output = Result<Zone, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(UPDATE)
                .bind(&zone.name)
                .bind(zone.power)
                .bind(zone.active_scene_id.map(|id| id.to_string()))
                .bind(zone.brightness)
                .bind(zone.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Err(NotFoundError {
                    entity: "Zone",
                    id: zone.id.to_string(),
                }
                .into());
            }
            Ok(zone)
        }
    }

    fn delete(&self, id: ZoneId) -> impl Future<Output = Result<(), LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::tests::memory_pool;
    use homelights_domain::error::ConflictError;

    async fn setup() -> SqliteZoneRepository {
        SqliteZoneRepository::new(memory_pool().await)
    }

    fn test_zone() -> Zone {
        Zone::builder().name("Living Room").build().unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_zone_when_valid() {
        let repo = setup().await;
        let zone = test_zone();
        let id = zone.id;

        repo.create(zone).await.unwrap();

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.name, "Living Room");
        assert!(!fetched.power);
        assert_eq!(fetched.brightness, 255);
    }

    #[tokio::test]
    async fn should_return_none_when_zone_not_found() {
        let repo = setup().await;
        let result = repo.get_by_id(ZoneId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn should_reject_duplicate_zone_name() {
        let repo = setup().await;
        repo.create(test_zone()).await.unwrap();

        let result = repo.create(test_zone()).await;
        assert!(matches!(
            result,
            Err(LightsError::Conflict(ConflictError::Duplicate(_)))
        ));
    }

    #[tokio::test]
    async fn should_reject_unknown_active_scene() {
        let repo = setup().await;
        let zone = Zone::builder()
            .name("Hall")
            .active_scene_id(SceneId::new())
            .build()
            .unwrap();

        let result = repo.create(zone).await;
        assert!(matches!(
            result,
            Err(LightsError::Conflict(ConflictError::MissingReference(_)))
        ));
    }

    #[tokio::test]
    async fn should_update_control_state() {
        let repo = setup().await;
        let mut zone = test_zone();
        let id = zone.id;
        repo.create(zone.clone()).await.unwrap();

        zone.power = true;
        zone.brightness = 0;
        repo.update(zone).await.unwrap();

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert!(fetched.power);
        assert_eq!(fetched.brightness, 0);
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_missing_zone() {
        let repo = setup().await;
        let result = repo.update(test_zone()).await;
        assert!(matches!(result, Err(LightsError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_delete_zone_when_exists() {
        let repo = setup().await;
        let zone = test_zone();
        let id = zone.id;
        repo.create(zone).await.unwrap();

        repo.delete(id).await.unwrap();

        assert!(repo.get_by_id(id).await.unwrap().is_none());
        assert!(repo.get_all().await.unwrap().is_empty());
    }
}
