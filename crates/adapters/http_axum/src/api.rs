//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod backends;
#[allow(clippy::missing_errors_doc)]
pub mod lights;
#[allow(clippy::missing_errors_doc)]
pub mod patterns;
#[allow(clippy::missing_errors_doc)]
pub mod scenes;
#[allow(clippy::missing_errors_doc)]
pub mod zones;

use axum::Router;
use axum::routing::{get, post, put};

use homelights_app::ports::{
    LightRepository, PatternRepository, SceneRepository, ZoneDispatch, ZoneRepository,
};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<Z, L, S, P, D>() -> Router<AppState<Z, L, S, P, D>>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    Router::new()
        // Zones
        .route(
            "/zones",
            get(zones::list::<Z, L, S, P, D>).post(zones::create::<Z, L, S, P, D>),
        )
        .route(
            "/zones/{id}",
            get(zones::get::<Z, L, S, P, D>)
                .put(zones::update::<Z, L, S, P, D>)
                .delete(zones::delete::<Z, L, S, P, D>),
        )
        .route("/zones/{id}/power", put(zones::set_power::<Z, L, S, P, D>))
        .route(
            "/zones/{id}/brightness",
            put(zones::set_brightness::<Z, L, S, P, D>),
        )
        .route("/zones/{id}/scene", put(zones::set_scene::<Z, L, S, P, D>))
        .route(
            "/zones/{id}/state",
            post(zones::apply_state::<Z, L, S, P, D>),
        )
        .route(
            "/zones/{id}/reapply",
            post(zones::reapply::<Z, L, S, P, D>),
        )
        // Lights
        .route(
            "/lights",
            get(lights::list::<Z, L, S, P, D>).post(lights::create::<Z, L, S, P, D>),
        )
        .route(
            "/lights/{id}",
            get(lights::get::<Z, L, S, P, D>)
                .put(lights::update::<Z, L, S, P, D>)
                .delete(lights::delete::<Z, L, S, P, D>),
        )
        // Scenes
        .route(
            "/scenes",
            get(scenes::list::<Z, L, S, P, D>).post(scenes::create::<Z, L, S, P, D>),
        )
        .route(
            "/scenes/{id}",
            get(scenes::get::<Z, L, S, P, D>)
                .put(scenes::update::<Z, L, S, P, D>)
                .delete(scenes::delete::<Z, L, S, P, D>),
        )
        // Patterns
        .route(
            "/patterns",
            get(patterns::list::<Z, L, S, P, D>).post(patterns::create::<Z, L, S, P, D>),
        )
        .route(
            "/patterns/{id}",
            get(patterns::get::<Z, L, S, P, D>)
                .put(patterns::update::<Z, L, S, P, D>)
                .delete(patterns::delete::<Z, L, S, P, D>),
        )
        // Backends
        .route("/backends", get(backends::list::<Z, L, S, P, D>))
}
