//! JSON REST handlers for scenes.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use homelights_app::ports::{
    LightRepository, PatternRepository, SceneRepository, ZoneDispatch, ZoneRepository,
};
use homelights_domain::color::MAX_BRIGHTNESS;
use homelights_domain::id::{LightId, PatternId, SceneId};
use homelights_domain::scene::{Scene, SceneBuilder};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// Request body for creating or replacing a scene.
#[derive(Deserialize)]
pub struct SceneRequest {
    pub name: String,
    pub brightness: Option<u8>,
    #[serde(default)]
    pub lights: Vec<SceneLightRequest>,
}

/// One entry of [`SceneRequest`]. A `null` pattern turns the light off.
#[derive(Deserialize)]
pub struct SceneLightRequest {
    pub light_id: String,
    pub pattern_id: Option<String>,
    pub brightness: Option<u8>,
}

impl SceneRequest {
    fn into_builder(self) -> Result<SceneBuilder, ApiError> {
        let mut builder = Scene::builder().name(self.name);
        if let Some(brightness) = self.brightness {
            builder = builder.brightness(brightness);
        }
        for entry in self.lights {
            let light_id = LightId::parse(&entry.light_id)?;
            let pattern_id = entry.pattern_id.as_deref().map(PatternId::parse).transpose()?;
            builder = builder.light(
                light_id,
                pattern_id,
                entry.brightness.unwrap_or(MAX_BRIGHTNESS),
            );
        }
        Ok(builder)
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Scene>>),
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
    Ok(Json<Scene>),
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
    Created(Json<Scene>),
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

/// `GET /api/scenes`
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
    let scenes = state.scene_service.list_scenes().await?;
    Ok(ListResponse::Ok(Json(scenes)))
}

/// `GET /api/scenes/:id`
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
    let scene_id = SceneId::parse(&id)?;
    let scene = state.scene_service.get_scene(scene_id).await?;
    Ok(GetResponse::Ok(Json(scene)))
}

/// `POST /api/scenes`
pub async fn create<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    ApiJson(req): ApiJson<SceneRequest>,
) -> Result<CreateResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let scene = req.into_builder()?.build()?;
    let created = state.scene_service.create_scene(scene).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/scenes/:id`
///
/// Replaces the scene's name, brightness and every entry.
pub async fn update<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<SceneRequest>,
) -> Result<GetResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let scene_id = SceneId::parse(&id)?;
    let scene = req.into_builder()?.id(scene_id).build()?;
    let updated = state.scene_service.update_scene(scene).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/scenes/:id`
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
    let scene_id = SceneId::parse(&id)?;
    state.scene_service.delete_scene(scene_id).await?;
    Ok(DeleteResponse::NoContent)
}
