//! Backend registry status.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use homelights_app::dispatcher::BackendStatus;
use homelights_app::ports::{
    LightRepository, PatternRepository, SceneRepository, ZoneDispatch, ZoneRepository,
};
use homelights_app::registry::RegistryState;
use homelights_domain::light::LightType;

use crate::state::AppState;

#[derive(Serialize)]
pub struct BackendStatusBody {
    pub light_type: LightType,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub device_count: usize,
}

impl From<BackendStatus> for BackendStatusBody {
    fn from(status: BackendStatus) -> Self {
        let reason = match &status.state {
            RegistryState::Stale(reason) => Some(reason.clone()),
            RegistryState::Uninitialized | RegistryState::Populated => None,
        };
        Self {
            light_type: status.light_type,
            state: status.state.as_str(),
            reason,
            device_count: status.device_count,
        }
    }
}

/// `GET /api/backends`
pub async fn list<Z, L, S, P, D>(
    State(state): State<AppState<Z, L, S, P, D>>,
) -> Json<Vec<BackendStatusBody>>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    Json(
        state
            .dispatch
            .backend_status()
            .into_iter()
            .map(BackendStatusBody::from)
            .collect(),
    )
}
