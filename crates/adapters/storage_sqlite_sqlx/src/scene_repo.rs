//! `SQLite` implementation of [`SceneRepository`].
//!
//! A scene spans the `scenes` row and its `scene_lights` entries. Writes
//! touch both inside one transaction.

use std::collections::HashMap;
use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, Sqlite, SqlitePool, Transaction};

use homelights_app::ports::SceneRepository;
use homelights_domain::error::{LightsError, NotFoundError};
use homelights_domain::id::{LightId, PatternId, SceneId};
use homelights_domain::scene::{Scene, SceneLight};

use crate::error::StorageError;

/// Wrapper for converting a `scenes` row into a [`Scene`] without entries.
struct Wrapper(Scene);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let brightness: u8 = row.try_get("brightness")?;

        let id = SceneId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Scene {
            id,
            name,
            brightness,
            lights: Vec::new(),
        }))
    }
}

/// Wrapper for a `scene_lights` row, tagged with its owning scene.
struct EntryWrapper(SceneId, SceneLight);

impl<'r> FromRow<'r, SqliteRow> for EntryWrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let scene_id: String = row.try_get("scene_id")?;
        let light_id: String = row.try_get("light_id")?;
        let pattern_id: Option<String> = row.try_get("pattern_id")?;
        let brightness: u8 = row.try_get("brightness")?;

        let scene_id =
            SceneId::from_str(&scene_id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let light_id =
            LightId::from_str(&light_id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let pattern_id = pattern_id
            .map(|s| PatternId::from_str(&s))
            .transpose()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(
            scene_id,
            SceneLight {
                light_id,
                pattern_id,
                brightness,
            },
        ))
    }
}

const INSERT: &str = "INSERT INTO scenes (id, name, brightness) VALUES (?, ?, ?)";
const INSERT_ENTRY: &str = "INSERT INTO scene_lights (scene_id, light_id, pattern_id, brightness, position) VALUES (?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM scenes WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM scenes ORDER BY name";
const SELECT_ENTRIES_BY_SCENE: &str =
    "SELECT * FROM scene_lights WHERE scene_id = ? ORDER BY position";
const SELECT_ALL_ENTRIES: &str = "SELECT * FROM scene_lights ORDER BY scene_id, position";
const UPDATE: &str = "UPDATE scenes SET name = ?, brightness = ? WHERE id = ?";
const DELETE_ENTRIES: &str = "DELETE FROM scene_lights WHERE scene_id = ?";
const DELETE_BY_ID: &str = "DELETE FROM scenes WHERE id = ?";

async fn insert_entries(
    tx: &mut Transaction<'_, Sqlite>,
    scene: &Scene,
) -> Result<(), StorageError> {
    for (position, entry) in (0_i64..).zip(&scene.lights) {
        sqlx::query(INSERT_ENTRY)
            .bind(scene.id.to_string())
            .bind(entry.light_id.to_string())
            .bind(entry.pattern_id.map(|id| id.to_string()))
            .bind(entry.brightness)
            .bind(position)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

/// `SQLite`-backed scene repository.
#[derive(Clone)]
pub struct SqliteSceneRepository {
    pool: SqlitePool,
}

impl SqliteSceneRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SceneRepository for SqliteSceneRepository {
    fn create(&self, scene: Scene) -> impl Future<Output = Result<Scene, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            sqlx::query(INSERT)
                .bind(scene.id.to_string())
                .bind(&scene.name)
                .bind(scene.brightness)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            insert_entries(&mut tx, &scene).await?;
            tx.commit().await.map_err(StorageError::from)?;

            Ok(scene)
        }
    }

    fn get_by_id(
        &self,
        id: SceneId,
    ) -> impl Future<Output = Result<Option<Scene>, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;
            let Some(Wrapper(mut scene)) = row else {
                return Ok(None);
            };

            let entries: Vec<EntryWrapper> = sqlx::query_as(SELECT_ENTRIES_BY_SCENE)
                .bind(id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            scene.lights = entries.into_iter().map(|w| w.1).collect();

            Ok(Some(scene))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Scene>, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            let entries: Vec<EntryWrapper> = sqlx::query_as(SELECT_ALL_ENTRIES)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            let mut by_scene: HashMap<SceneId, Vec<SceneLight>> = HashMap::new();
            for EntryWrapper(scene_id, entry) in entries {
                by_scene.entry(scene_id).or_default().push(entry);
            }

            Ok(rows
                .into_iter()
                .map(|Wrapper(mut scene)| {
                    scene.lights = by_scene.remove(&scene.id).unwrap_or_default();
                    scene
                })
                .collect())
        }
    }

    fn update(&self, scene: Scene) -> impl Future<Output = Result<Scene, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            let result = sqlx::query(UPDATE)
                .bind(&scene.name)
                .bind(scene.brightness)
                .bind(scene.id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            if result.rows_affected() == 0 {
                return Err(NotFoundError {
                    entity: "Scene",
                    id: scene.id.to_string(),
                }
                .into());
            }
            sqlx::query(DELETE_ENTRIES)
                .bind(scene.id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            insert_entries(&mut tx, &scene).await?;
            tx.commit().await.map_err(StorageError::from)?;

            Ok(scene)
        }
    }

    fn delete(&self, id: SceneId) -> impl Future<Output = Result<(), LightsError>> + Send {
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
