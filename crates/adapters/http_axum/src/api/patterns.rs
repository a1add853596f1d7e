//! JSON REST handlers for patterns.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use homelights_app::ports::{
    LightRepository, PatternRepository, SceneRepository, ZoneDispatch, ZoneRepository,
};
use homelights_domain::id::PatternId;
use homelights_domain::pattern::{Pattern, PatternKind};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// Request body for creating or replacing a pattern.
#[derive(Deserialize)]
pub struct PatternRequest {
    pub name: String,
    pub kind: PatternKind,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Pattern>>),
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
    Ok(Json<Pattern>),
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
    Created(Json<Pattern>),
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

/// `GET /api/patterns`
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
    let patterns = state.pattern_service.list_patterns().await?;
    Ok(ListResponse::Ok(Json(patterns)))
}

/// `GET /api/patterns/:id`
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
    let pattern_id = PatternId::parse(&id)?;
    let pattern = state.pattern_service.get_pattern(pattern_id).await?;
    Ok(GetResponse::Ok(Json(pattern)))
}

/// `POST /api/patterns`
pub async fn create<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    ApiJson(req): ApiJson<PatternRequest>,
) -> Result<CreateResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let pattern = Pattern::builder().name(req.name).kind(req.kind).build()?;
    let created = state.pattern_service.create_pattern(pattern).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/patterns/:id`
pub async fn update<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<PatternRequest>,
) -> Result<GetResponse, ApiError>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    let pattern_id = PatternId::parse(&id)?;
    let pattern = Pattern::builder()
        .id(pattern_id)
        .name(req.name)
        .kind(req.kind)
        .build()?;
    let updated = state.pattern_service.update_pattern(pattern).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/patterns/:id`
///
/// Refused with a conflict while a scene still references the pattern.
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
    let pattern_id = PatternId::parse(&id)?;
    state.pattern_service.delete_pattern(pattern_id).await?;
    Ok(DeleteResponse::NoContent)
}
