//! Shared application state for axum handlers.

use std::sync::Arc;

use homelights_app::ports::{
    LightRepository, PatternRepository, SceneRepository, ZoneDispatch, ZoneRepository,
};
use homelights_app::services::control_service::ControlService;
use homelights_app::services::light_service::LightService;
use homelights_app::services::pattern_service::PatternService;
use homelights_app::services::scene_service::SceneService;
use homelights_app::services::zone_service::ZoneService;

/// Application state shared across all axum handlers.
///
/// Generic over the four repositories and the dispatcher to avoid dynamic
/// dispatch. `Clone` is implemented manually so only the `Arc` wrappers are
/// cloned.
pub struct AppState<Z, L, S, P, D> {
    /// Zone CRUD service.
    pub zone_service: Arc<ZoneService<Z>>,
    /// Light CRUD service.
    pub light_service: Arc<LightService<L>>,
    /// Scene CRUD service.
    pub scene_service: Arc<SceneService<S, L, P>>,
    /// Pattern CRUD service.
    pub pattern_service: Arc<PatternService<P>>,
    /// Zone control entry points.
    pub control_service: Arc<ControlService<Z, S, L, P, D>>,
    /// Dispatcher, queried for backend status.
    pub dispatch: Arc<D>,
}

impl<Z, L, S, P, D> Clone for AppState<Z, L, S, P, D> {
    fn clone(&self) -> Self {
        Self {
            zone_service: Arc::clone(&self.zone_service),
            light_service: Arc::clone(&self.light_service),
            scene_service: Arc::clone(&self.scene_service),
            pattern_service: Arc::clone(&self.pattern_service),
            control_service: Arc::clone(&self.control_service),
            dispatch: Arc::clone(&self.dispatch),
        }
    }
}

impl<Z, L, S, P, D> AppState<Z, L, S, P, D>
where
    Z: ZoneRepository + Send + Sync + 'static,
    L: LightRepository + Send + Sync + 'static,
    S: SceneRepository + Send + Sync + 'static,
    P: PatternRepository + Send + Sync + 'static,
    D: ZoneDispatch + 'static,
{
    /// Create the state from service instances, wiring the control service
    /// onto the same services the CRUD handlers use.
    pub fn new(
        zone_service: ZoneService<Z>,
        light_service: LightService<L>,
        scene_service: SceneService<S, L, P>,
        pattern_service: PatternService<P>,
        dispatch: D,
    ) -> Self {
        let zone_service = Arc::new(zone_service);
        let light_service = Arc::new(light_service);
        let scene_service = Arc::new(scene_service);
        let pattern_service = Arc::new(pattern_service);
        let dispatch = Arc::new(dispatch);
        let control_service = Arc::new(ControlService::new(
            Arc::clone(&zone_service),
            Arc::clone(&scene_service),
            Arc::clone(&light_service),
            Arc::clone(&pattern_service),
            Arc::clone(&dispatch),
        ));
        Self {
            zone_service,
            light_service,
            scene_service,
            pattern_service,
            control_service,
            dispatch,
        }
    }
}
