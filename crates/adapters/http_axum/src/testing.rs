//! Test wiring: in-memory `SQLite` repositories and a dispatcher that
//! resolves commands without driving any device.

use std::future::Future;
use std::sync::Mutex;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use homelights_adapter_storage_sqlite_sqlx::{
    Config, SqliteLightRepository, SqlitePatternRepository, SqliteSceneRepository,
    SqliteZoneRepository,
};
use homelights_app::dispatcher::{BackendStatus, DispatchReport, LightOutcome};
use homelights_app::ports::ZoneDispatch;
use homelights_app::registry::RegistryState;
use homelights_app::resolver::resolve;
use homelights_app::services::light_service::LightService;
use homelights_app::services::pattern_service::PatternService;
use homelights_app::services::scene_service::SceneService;
use homelights_app::services::zone_service::ZoneService;
use homelights_domain::light::{Light, LightType};
use homelights_domain::pattern::Pattern;
use homelights_domain::scene::Scene;
use homelights_domain::zone::ZoneState;

use crate::state::AppState;

pub(crate) type TestState = AppState<
    SqliteZoneRepository,
    SqliteLightRepository,
    SqliteSceneRepository,
    SqlitePatternRepository,
    ResolvingDispatch,
>;

/// Resolves each light's command and records the zone states it saw.
#[derive(Default)]
pub(crate) struct ResolvingDispatch {
    pub(crate) calls: Mutex<Vec<ZoneState>>,
}

impl ZoneDispatch for ResolvingDispatch {
    fn apply_zone_state(
        &self,
        zone_state: &ZoneState,
        scene: Option<&Scene>,
        lights: &[Light],
        patterns: &[Pattern],
    ) -> impl Future<Output = DispatchReport> + Send {
        self.calls.lock().unwrap().push(*zone_state);
        let outcomes = lights
            .iter()
            .filter(|light| light.zone_id == Some(zone_state.zone_id))
            .map(|light| LightOutcome {
                light_id: light.id,
                light_type: light.light_type(),
                result: resolve(
                    light,
                    zone_state,
                    scene,
                    patterns,
                    light.light_type().supported_patterns(),
                ),
            })
            .collect();
        let report = DispatchReport {
            zone_id: zone_state.zone_id,
            outcomes,
        };
        async { report }
    }

    fn backend_status(&self) -> Vec<BackendStatus> {
        LightType::ALL
            .into_iter()
            .map(|light_type| BackendStatus {
                light_type,
                state: RegistryState::Uninitialized,
                device_count: 0,
            })
            .collect()
    }
}

pub(crate) async fn test_state() -> TestState {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");
    let pool = db.pool().clone();

    AppState::new(
        ZoneService::new(SqliteZoneRepository::new(pool.clone())),
        LightService::new(SqliteLightRepository::new(pool.clone())),
        SceneService::new(
            SqliteSceneRepository::new(pool.clone()),
            SqliteLightRepository::new(pool.clone()),
            SqlitePatternRepository::new(pool.clone()),
        ),
        PatternService::new(SqlitePatternRepository::new(pool)),
        ResolvingDispatch::default(),
    )
}

/// Send one request through `app` and decode the JSON response, if any.
pub(crate) async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
