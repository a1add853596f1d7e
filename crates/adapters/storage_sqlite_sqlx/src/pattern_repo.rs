//! `SQLite` implementation of [`PatternRepository`].
//!
//! Pattern data is stored as JSON next to its `type` tag.

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use homelights_app::ports::PatternRepository;
use homelights_domain::error::{LightsError, NotFoundError};
use homelights_domain::id::PatternId;
use homelights_domain::pattern::{Pattern, PatternKind};

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Pattern`].
struct Wrapper(Pattern);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Pattern> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let tag: String = row.try_get("type")?;
        let data: String = row.try_get("data")?;

        let id = PatternId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let data: serde_json::Value =
            serde_json::from_str(&data).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let kind: PatternKind =
            serde_json::from_value(serde_json::json!({ "type": tag, "data": data }))
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Pattern { id, name, kind }))
    }
}

/// Split a [`PatternKind`] into its `type` tag and JSON `data` columns.
fn encode_kind(kind: &PatternKind) -> Result<(String, String), StorageError> {
    let mut value = serde_json::to_value(kind)?;
    let data = value
        .get_mut("data")
        .map(serde_json::Value::take)
        .unwrap_or(serde_json::Value::Null);
    Ok((kind.pattern_type().to_string(), serde_json::to_string(&data)?))
}

const INSERT: &str = "INSERT INTO patterns (id, name, type, data) VALUES (?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM patterns WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM patterns ORDER BY name";
const UPDATE: &str = "UPDATE patterns SET name = ?, type = ?, data = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM patterns WHERE id = ?";

/// `SQLite`-backed pattern repository.
#[derive(Clone)]
pub struct SqlitePatternRepository {
    pool: SqlitePool,
}

impl SqlitePatternRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl PatternRepository for SqlitePatternRepository {
    fn create(
        &self,
        pattern: Pattern,
    ) -> impl Future<Output = Result<Pattern, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let (tag, data) = encode_kind(&pattern.kind)?;
            sqlx::query(INSERT)
                .bind(pattern.id.to_string())
                .bind(&pattern.name)
                .bind(tag)
                .bind(data)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(pattern)
        }
    }

    fn get_by_id(
        &self,
        id: PatternId,
    ) -> impl Future<Output = Result<Option<Pattern>, LightsError>> + Send {
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

    fn get_all(&self) -> impl Future<Output = Result<Vec<Pattern>, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        pattern: Pattern,
    ) -> impl Future<Output = Result<Pattern, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let (tag, data) = encode_kind(&pattern.kind)?;
            let result = sqlx::query(UPDATE)
                .bind(&pattern.name)
                .bind(tag)
                .bind(data)
                .bind(pattern.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Err(NotFoundError {
                    entity: "Pattern",
                    id: pattern.id.to_string(),
                }
                .into());
            }
            Ok(pattern)
        }
    }

    fn delete(&self, id: PatternId) -> impl Future<Output = Result<(), LightsError>> + Send {
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
    use homelights_domain::color::Color;
    use homelights_domain::error::ConflictError;
    use homelights_domain::pattern::{ColorCyclePattern, PulsePattern, RainbowPattern, WavePattern};

    async fn setup() -> SqlitePatternRepository {
        SqlitePatternRepository::new(memory_pool().await)
    }

    #[tokio::test]
    async fn should_roundtrip_every_pattern_kind() {
        let repo = setup().await;
        let patterns = vec![
            Pattern::builder()
                .name("Teal")
                .solid(Color::hsv(170, 255))
                .build()
                .unwrap(),
            Pattern::builder()
                .name("Candle")
                .solid(Color::temperature(2200))
                .build()
                .unwrap(),
            Pattern::builder()
                .name("Breathe")
                .kind(PatternKind::Pulse(PulsePattern {
                    color: Color::hsv(10, 200),
                    rate: 8,
                }))
                .build()
                .unwrap(),
            Pattern::builder()
                .name("Rainbow")
                .kind(PatternKind::Rainbow(RainbowPattern { rate: 2 }))
                .build()
                .unwrap(),
            Pattern::builder()
                .name("Tide")
                .kind(PatternKind::Wave(WavePattern {
                    wave_hue: 0,
                    foreground_hue: 170,
                    background_hue: 85,
                    rate: 8,
                }))
                .build()
                .unwrap(),
            Pattern::builder()
                .name("Cycle")
                .kind(PatternKind::ColorCycle(ColorCyclePattern { rate: 4 }))
                .build()
                .unwrap(),
        ];
        for pattern in &patterns {
            repo.create(pattern.clone()).await.unwrap();
        }
        for pattern in &patterns {
            assert_eq!(&repo.get_by_id(pattern.id).await.unwrap().unwrap(), pattern);
        }
    }

    #[tokio::test]
    async fn should_store_type_tag_in_its_own_column() {
        let repo = setup().await;
        let pattern = Pattern::builder()
            .name("Teal")
            .solid(Color::hsv(170, 255))
            .build()
            .unwrap();
        repo.create(pattern.clone()).await.unwrap();

        let (tag, data): (String, String) =
            sqlx::query_as("SELECT type, data FROM patterns WHERE id = ?")
                .bind(pattern.id.to_string())
                .fetch_one(&repo.pool)
                .await
                .unwrap();
        assert_eq!(tag, "solid");
        let data: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(data["color"]["hue"], 170);
    }

    #[tokio::test]
    async fn should_reject_duplicate_pattern_name() {
        let repo = setup().await;
        repo.create(Pattern::builder().name("Warm").build().unwrap())
            .await
            .unwrap();
        let result = repo
            .create(Pattern::builder().name("Warm").build().unwrap())
            .await;
        assert!(matches!(
            result,
            Err(LightsError::Conflict(ConflictError::Duplicate(_)))
        ));
    }

    #[tokio::test]
    async fn should_update_and_delete_pattern() {
        let repo = setup().await;
        let mut pattern = Pattern::builder().name("Warm").build().unwrap();
        repo.create(pattern.clone()).await.unwrap();

        pattern.kind = PatternKind::Rainbow(RainbowPattern { rate: 9 });
        repo.update(pattern.clone()).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap(), vec![pattern.clone()]);

        repo.delete(pattern.id).await.unwrap();
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_refuse_to_delete_pattern_still_used_by_a_scene() {
        let repo = setup().await;
        let pattern = Pattern::builder().name("Warm").build().unwrap();
        repo.create(pattern.clone()).await.unwrap();

        sqlx::query("INSERT INTO scenes (id, name, brightness) VALUES ('s', 'Evening', 255)")
            .execute(&repo.pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO lights (id, name, type, channel) VALUES ('l', 'Strip', 'rvl', 0)")
            .execute(&repo.pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO scene_lights (scene_id, light_id, pattern_id, brightness, position) \
             VALUES ('s', 'l', ?, 255, 0)",
        )
        .bind(pattern.id.to_string())
        .execute(&repo.pool)
        .await
        .unwrap();

        let result = repo.delete(pattern.id).await;

        assert!(matches!(
            result,
            Err(LightsError::Conflict(ConflictError::MissingReference(_)))
        ));
        assert_eq!(repo.get_by_id(pattern.id).await.unwrap(), Some(pattern));
    }
}
