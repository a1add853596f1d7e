//! JSON REST handlers for zones and the zone control entry points.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use homelights_app::dispatcher::{DispatchReport, LightOutcome};
use homelights_app::ports::{
    LightRepository, PatternRepository, SceneRepository, ZoneDispatch, ZoneRepository,
};
use homelights_app::resolver::{Effect, LightCommand};
use homelights_domain::id::{LightId, SceneId, ZoneId};
use homelights_domain::light::LightType;
use homelights_domain::zone::{Zone, ZoneState};

use crate::error::{ApiError, ApiJson, public_detail};
use crate::state::AppState;

/// Request body for creating a zone.
#[derive(Deserialize)]
pub struct CreateZoneRequest {
    pub name: String,
    #[serde(default)]
    pub power: bool,
    pub brightness: Option<u8>,
}

/// Request body for renaming a zone.
#[derive(Deserialize)]
pub struct UpdateZoneRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct PowerRequest {
    pub power: bool,
}

#[derive(Deserialize)]
pub struct BrightnessRequest {
    pub brightness: u8,
}

/// `scene_id: null` clears the active scene.
#[derive(Deserialize)]
pub struct SceneRequest {
    pub scene_id: Option<String>,
}

/// A transient control target, applied but not stored.
#[derive(Deserialize)]
pub struct ApplyStateRequest {
    pub power: bool,
    pub brightness: u8,
    pub scene_id: Option<String>,
}

/// Per-light line of a dispatch report.
#[derive(Serialize)]
pub struct OutcomeBody {
    pub light_id: LightId,
    pub light_type: LightType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

#[derive(Serialize)]
pub struct OutcomeError {
    pub kind: String,
    pub detail: String,
}

/// The command a light accepted.
#[derive(Serialize)]
#[serde(tag = "power", rename_all = "lowercase")]
pub enum CommandBody {
    Off,
    On {
        hue: f64,
        saturation: f64,
        brightness: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        kelvin: Option<u16>,
        effect: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        rate: Option<u8>,
    },
}

impl From<&LightCommand> for CommandBody {
    fn from(command: &LightCommand) -> Self {
        match command {
            LightCommand::Off => Self::Off,
            LightCommand::On(color) => {
                let (effect, rate) = match color.effect {
                    Effect::Steady => ("steady", None),
                    Effect::Pulse { rate } => ("pulse", Some(rate)),
                    Effect::Rainbow { rate } => ("rainbow", Some(rate)),
                    Effect::Wave { rate, .. } => ("wave", Some(rate)),
                    Effect::ColorCycle { rate } => ("color-cycle", Some(rate)),
                };
                Self::On {
                    hue: color.hue,
                    saturation: color.saturation,
                    brightness: color.brightness,
                    kelvin: color.kelvin,
                    effect,
                    rate,
                }
            }
        }
    }
}

impl From<&LightOutcome> for OutcomeBody {
    fn from(outcome: &LightOutcome) -> Self {
        let (command, error) = match &outcome.result {
            Ok(command) => (Some(CommandBody::from(command)), None),
            Err(err) => (
                None,
                Some(OutcomeError {
                    kind: err.kind().to_string(),
                    detail: public_detail(err),
                }),
            ),
        };
        Self {
            light_id: outcome.light_id,
            light_type: outcome.light_type,
            command,
            error,
        }
    }
}

/// JSON form of a [`DispatchReport`].
///
/// Device failures are reported here; the HTTP status stays 200.
#[derive(Serialize)]
pub struct DispatchReportBody {
    pub zone_id: ZoneId,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<OutcomeBody>,
}

impl From<DispatchReport> for DispatchReportBody {
    fn from(report: DispatchReport) -> Self {
        Self {
            zone_id: report.zone_id,
            succeeded: report.succeeded(),
            failed: report.failed(),
            outcomes: report.outcomes.iter().map(OutcomeBody::from).collect(),
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Zone>>),
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
    Ok(Json<Zone>),
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
    Created(Json<Zone>),
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

/// Possible responses from the control endpoints.
pub enum DispatchResponse {
    Ok(Json<DispatchReportBody>),
}

impl IntoResponse for DispatchResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

impl From<DispatchReport> for DispatchResponse {
    fn from(report: DispatchReport) -> Self {
        Self::Ok(Json(report.into()))
    }
}

fn parse_scene_id(scene_id: Option<&str>) -> Result<Option<SceneId>, ApiError> {
    Ok(scene_id.map(SceneId::parse).transpose()?)
}

/// `GET /api/zones`
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
    let zones = state.zone_service.list_zones().await?;
    Ok(ListResponse::Ok(Json(zones)))
}

/// `GET /api/zones/:id`
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
    let zone_id = ZoneId::parse(&id)?;
    let zone = state.zone_service.get_zone(zone_id).await?;
    Ok(GetResponse::Ok(Json(zone)))
}

/// `POST /api/zones`
pub async fn create<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    ApiJson(req): ApiJson<CreateZoneRequest>,
) -> Result<CreateResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let mut builder = Zone::builder().name(req.name).power(req.power);
    if let Some(brightness) = req.brightness {
        builder = builder.brightness(brightness);
    }

    let zone = builder.build()?;
    let created = state.zone_service.create_zone(zone).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/zones/:id`
pub async fn update<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateZoneRequest>,
) -> Result<GetResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let zone_id = ZoneId::parse(&id)?;
    let mut zone = state.zone_service.get_zone(zone_id).await?;
    zone.name = req.name;
    let updated = state.zone_service.update_zone(zone).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/zones/:id`
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
    let zone_id = ZoneId::parse(&id)?;
    state.zone_service.delete_zone(zone_id).await?;
    Ok(DeleteResponse::NoContent)
}

/// `PUT /api/zones/:id/power`
pub async fn set_power<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<PowerRequest>,
) -> Result<DispatchResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let zone_id = ZoneId::parse(&id)?;
    let report = state.control_service.set_power(zone_id, req.power).await?;
    Ok(report.into())
}

/// `PUT /api/zones/:id/brightness`
pub async fn set_brightness<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<BrightnessRequest>,
) -> Result<DispatchResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let zone_id = ZoneId::parse(&id)?;
    let report = state
        .control_service
        .set_brightness(zone_id, req.brightness)
        .await?;
    Ok(report.into())
}

/// `PUT /api/zones/:id/scene`
pub async fn set_scene<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<SceneRequest>,
) -> Result<DispatchResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let zone_id = ZoneId::parse(&id)?;
    let scene_id = parse_scene_id(req.scene_id.as_deref())?;
    let report = state.control_service.set_scene(zone_id, scene_id).await?;
    Ok(report.into())
}

/// `POST /api/zones/:id/state`
pub async fn apply_state<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ApplyStateRequest>,
) -> Result<DispatchResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let zone_state = ZoneState {
        zone_id: ZoneId::parse(&id)?,
        power: req.power,
        brightness: req.brightness,
    };
    let scene_id = parse_scene_id(req.scene_id.as_deref())?;
    let report = state
        .control_service
        .apply_zone_state(zone_state, scene_id)
        .await?;
    Ok(report.into())
}

/// `POST /api/zones/:id/reapply`
pub async fn reapply<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    Path(id): Path<String>,
) -> Result<DispatchResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let zone_id = ZoneId::parse(&id)?;
    let report = state.control_service.reapply_zone(zone_id).await?;
    Ok(report.into())
}
