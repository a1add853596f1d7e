//! `SQLite` implementation of [`LightRepository`].
//!
//! Every backend shares the `lights` table. The `type` column selects which
//! of `channel`, `philips_hue_id` or `lifx_id` carries the native id.

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use homelights_app::ports::LightRepository;
use homelights_domain::error::{LightsError, NotFoundError};
use homelights_domain::id::{LightId, ZoneId};
use homelights_domain::light::{Light, LightKind, LightType, RvlChannel};

use crate::error::StorageError;

fn decode_error(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}

/// Wrapper for converting database rows into domain [`Light`].
struct Wrapper(Light);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Light> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let tag: String = row.try_get("type")?;
        let zone_id: Option<String> = row.try_get("zone_id")?;

        let id = LightId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let zone_id = zone_id
            .map(|s| ZoneId::from_str(&s))
            .transpose()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        let kind = match LightType::from_tag(&tag) {
            Some(LightType::Rvl) => {
                let channel: Option<i64> = row.try_get("channel")?;
                let channel = channel.ok_or_else(|| decode_error(format!("rvl light {id} has no channel")))?;
                LightKind::Rvl {
                    channel: RvlChannel::try_from(channel)
                        .map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
                }
            }
            Some(LightType::PhilipsHue) => {
                let philips_hue_id: Option<String> = row.try_get("philips_hue_id")?;
                LightKind::PhilipsHue {
                    philips_hue_id: philips_hue_id.ok_or_else(|| {
                        decode_error(format!("philips-hue light {id} has no bridge id"))
                    })?,
                }
            }
            Some(LightType::Lifx) => {
                let lifx_id: Option<String> = row.try_get("lifx_id")?;
                LightKind::Lifx {
                    lifx_id: lifx_id
                        .ok_or_else(|| decode_error(format!("lifx light {id} has no MAC")))?,
                }
            }
            None => return Err(decode_error(format!("unknown light type {tag:?}"))),
        };

        Ok(Self(Light {
            id,
            name,
            zone_id,
            kind,
        }))
    }
}

/// Column values for the three backend-native columns.
fn native_columns(kind: &LightKind) -> (Option<u8>, Option<&str>, Option<&str>) {
    match kind {
        LightKind::Rvl { channel } => (Some(channel.get()), None, None),
        LightKind::PhilipsHue { philips_hue_id } => (None, Some(philips_hue_id.as_str()), None),
        LightKind::Lifx { lifx_id } => (None, None, Some(lifx_id.as_str())),
    }
}

const INSERT: &str = "INSERT INTO lights (id, name, type, channel, philips_hue_id, lifx_id, zone_id) VALUES (?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM lights WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM lights ORDER BY name";
const UPDATE: &str = "UPDATE lights SET name = ?, type = ?, channel = ?, philips_hue_id = ?, lifx_id = ?, zone_id = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM lights WHERE id = ?";

/// `SQLite`-backed light repository.
#[derive(Clone)]
pub struct SqliteLightRepository {
    pool: SqlitePool,
}

impl SqliteLightRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl LightRepository for SqliteLightRepository {
    fn create(&self, light: Light) -> impl Future<Output = Result<Light, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let (channel, philips_hue_id, lifx_id) = native_columns(&light.kind);
            sqlx::query(INSERT)
                .bind(light.id.to_string())
                .bind(&light.name)
                .bind(light.light_type().as_str())
                .bind(channel)
                .bind(philips_hue_id)
                .bind(lifx_id)
                .bind(light.zone_id.map(|id| id.to_string()))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(light)
        }
    }

    fn get_by_id(
        &self,
        id: LightId,
    ) -> impl Future<Output = Result<Option<Light>, LightsError>> + Send {
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

    fn get_all(&self) -> impl Future<Output = Result<Vec<Light>, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(&self, light: Light) -> impl Future<Output = Result<Light, LightsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let (channel, philips_hue_id, lifx_id) = native_columns(&light.kind);
            let result = sqlx::query(UPDATE)
                .bind(&light.name)
                .bind(light.light_type().as_str())
                .bind(channel)
                .bind(philips_hue_id)
                .bind(lifx_id)
                .bind(light.zone_id.map(|id| id.to_string()))
                .bind(light.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Err(NotFoundError {
                    entity: "Light",
                    id: light.id.to_string(),
                }
                .into());
            }
            Ok(light)
        }
    }

    fn delete(&self, id: LightId) -> impl Future<Output = Result<(), LightsError>> + Send {
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
