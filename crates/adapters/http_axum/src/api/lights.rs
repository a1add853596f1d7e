//! JSON REST handlers for lights.
//!
//! RVL lights are created with a numeric `channel`, Philips Hue lights with
//! the bridge's `philips_hue_id`. LIFX lights only appear through discovery.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use homelights_app::ports::{
    LightRepository, PatternRepository, SceneRepository, ZoneDispatch, ZoneRepository,
};
use homelights_app::services::light_service::NewLight;
use homelights_domain::id::{LightId, ZoneId};
use homelights_domain::light::{Light, LightKind, LightType, RvlChannel};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// Request body for creating a light.
///
/// `channel` is kept as a raw JSON number so fractional or out-of-range
/// values surface as validation errors rather than decode failures.
#[derive(Deserialize)]
pub struct CreateLightRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub light_type: LightType,
    pub zone_id: Option<String>,
    pub channel: Option<serde_json::Number>,
    pub philips_hue_id: Option<String>,
}

/// Request body for updating a light. Absent fields are left unchanged;
/// `zone_id: null` unassigns the light.
#[derive(Deserialize)]
pub struct UpdateLightRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub zone_id: Option<Option<String>>,
    pub channel: Option<serde_json::Number>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Light>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<Light>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Light>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/lights`
pub async fn list<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
) -> Result<ListResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let lights = state.light_service.list_lights().await?;
    Ok(ListResponse::Ok(Json(lights)))
}

/// `GET /api/lights/:id`
pub async fn get<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let light_id = LightId::parse(&id)?;
    let light = state.light_service.get_light(light_id).await?;
    Ok(GetResponse::Ok(Json(light)))
}

/// `POST /api/lights`
pub async fn create<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    ApiJson(req): ApiJson<CreateLightRequest>,
) -> Result<CreateResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let zone_id = req.zone_id.as_deref().map(ZoneId::parse).transpose()?;
    let native_id = match req.light_type {
        LightType::Rvl => req
            .channel
            .map(|c| RvlChannel::from_number(&c))
            .transpose()?
            .map(|c| c.to_string()),
        LightType::PhilipsHue => req.philips_hue_id,
        LightType::Lifx => None,
    };

    let created = state
        .light_service
        .create_light(NewLight {
            name: req.name,
            zone_id,
            light_type: req.light_type,
            native_id: native_id.unwrap_or_default(),
        })
        .await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/lights/:id`
pub async fn update<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateLightRequest>,
) -> Result<GetResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let light_id = LightId::parse(&id)?;
    let mut light = state.light_service.get_light(light_id).await?;

    if let Some(name) = req.name {
        light.name = name;
    }
    if let Some(zone_id) = req.zone_id {
        light.zone_id = zone_id.as_deref().map(ZoneId::parse).transpose()?;
    }
    if let Some(channel) = req.channel {
        light.kind = LightKind::Rvl {
            channel: RvlChannel::from_number(&channel)?,
        };
    }

    let updated = state.light_service.update_light(light).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/lights/:id`
pub async fn delete<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let light_id = LightId::parse(&id)?;
    state.light_service.delete_light(light_id).await?;
    Ok(DeleteResponse::NoContent)
}
