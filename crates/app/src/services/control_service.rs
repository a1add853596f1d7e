//! Control service: the zone control entry points.
//!
//! Each operation reads what it needs from the store, persists the zone
//! change where there is one, and dispatches the resulting state. Lookup
//! failures abort the request before anything is written or sent; device
//! failures end up in the returned [`DispatchReport`].

use std::sync::Arc;

use homelights_domain::error::LightsError;
use homelights_domain::id::{SceneId, ZoneId};
use homelights_domain::scene::Scene;
use homelights_domain::zone::{Zone, ZoneState};

use crate::dispatcher::DispatchReport;
use crate::ports::{LightRepository, PatternRepository, SceneRepository, ZoneDispatch, ZoneRepository};
use crate::services::light_service::LightService;
use crate::services::pattern_service::PatternService;
use crate::services::scene_service::SceneService;
use crate::services::zone_service::ZoneService;

pub struct ControlService<Z, S, L, P, D> {
    zones: Arc<ZoneService<Z>>,
    scenes: Arc<SceneService<S, L, P>>,
    lights: Arc<LightService<L>>,
    patterns: Arc<PatternService<P>>,
    dispatch: Arc<D>,
}

impl<Z, S, L, P, D> ControlService<Z, S, L, P, D>
where
    Z: ZoneRepository,
    S: SceneRepository,
    L: LightRepository,
    P: PatternRepository,
    D: ZoneDispatch,
{
    pub fn new(
        zones: Arc<ZoneService<Z>>,
        scenes: Arc<SceneService<S, L, P>>,
        lights: Arc<LightService<L>>,
        patterns: Arc<PatternService<P>>,
        dispatch: Arc<D>,
    ) -> Self {
        Self {
            zones,
            scenes,
            lights,
            patterns,
            dispatch,
        }
    }

    /// Switch a zone on or off.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::NotFound`] if the zone or its active scene is
    /// missing, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn set_power(&self, zone_id: ZoneId, power: bool) -> Result<DispatchReport, LightsError> {
        let mut zone = self.zones.get_zone(zone_id).await?;
        let scene = self.load_scene(zone.active_scene_id).await?;
        zone.power = power;
        let zone = self.zones.update_zone(zone).await?;
        self.dispatch_zone(&zone.state(), scene.as_ref()).await
    }

    /// Change a zone's brightness.
    ///
    /// # Errors
    ///
    /// Same as [`set_power`](Self::set_power).
    #[tracing::instrument(skip(self))]
    pub async fn set_brightness(
        &self,
        zone_id: ZoneId,
        brightness: u8,
    ) -> Result<DispatchReport, LightsError> {
        let mut zone = self.zones.get_zone(zone_id).await?;
        let scene = self.load_scene(zone.active_scene_id).await?;
        zone.brightness = brightness;
        let zone = self.zones.update_zone(zone).await?;
        self.dispatch_zone(&zone.state(), scene.as_ref()).await
    }

    /// Activate a scene on a zone, or clear it with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::NotFound`] if the zone or the scene is
    /// missing; the zone is left untouched in that case.
    #[tracing::instrument(skip(self))]
    pub async fn set_scene(
        &self,
        zone_id: ZoneId,
        scene_id: Option<SceneId>,
    ) -> Result<DispatchReport, LightsError> {
        let mut zone = self.zones.get_zone(zone_id).await?;
        let scene = self.load_scene(scene_id).await?;
        zone.active_scene_id = scene_id;
        let zone = self.zones.update_zone(zone).await?;
        self.dispatch_zone(&zone.state(), scene.as_ref()).await
    }

    /// Apply a transient control target without persisting it.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::NotFound`] if the zone or the scene is
    /// missing, or a storage error.
    #[tracing::instrument(skip(self), fields(zone_id = %zone_state.zone_id))]
    pub async fn apply_zone_state(
        &self,
        zone_state: ZoneState,
        scene_id: Option<SceneId>,
    ) -> Result<DispatchReport, LightsError> {
        self.zones.get_zone(zone_state.zone_id).await?;
        let scene = self.load_scene(scene_id).await?;
        self.dispatch_zone(&zone_state, scene.as_ref()).await
    }

    /// Re-send a zone's persisted state, e.g. after its devices came back.
    ///
    /// # Errors
    ///
    /// Same as [`set_power`](Self::set_power).
    #[tracing::instrument(skip(self))]
    pub async fn reapply_zone(&self, zone_id: ZoneId) -> Result<DispatchReport, LightsError> {
        let zone: Zone = self.zones.get_zone(zone_id).await?;
        let scene = self.load_scene(zone.active_scene_id).await?;
        self.dispatch_zone(&zone.state(), scene.as_ref()).await
    }

    async fn load_scene(&self, scene_id: Option<SceneId>) -> Result<Option<Scene>, LightsError> {
        match scene_id {
            Some(id) => self.scenes.get_scene(id).await.map(Some),
            None => Ok(None),
        }
    }

    async fn dispatch_zone(
        &self,
        zone_state: &ZoneState,
        scene: Option<&Scene>,
    ) -> Result<DispatchReport, LightsError> {
        let lights = self.lights.list_lights().await?;
        let patterns = self.patterns.list_patterns().await?;
        Ok(self
            .dispatch
            .apply_zone_state(zone_state, scene, &lights, &patterns)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex;

    use homelights_domain::color::Color;
    use homelights_domain::error::NotFoundError;
    use homelights_domain::light::Light;
    use homelights_domain::pattern::Pattern;

    use crate::dispatcher::BackendStatus;
    use crate::testing::{
        InMemoryLightRepo, InMemoryPatternRepo, InMemorySceneRepo, InMemoryZoneRepo,
    };

    /// Records what it was asked to dispatch instead of driving devices.
    #[derive(Default)]
    struct RecordingDispatch {
        calls: Mutex<Vec<(ZoneState, Option<SceneId>, usize)>>,
    }

    impl ZoneDispatch for RecordingDispatch {
        fn apply_zone_state(
            &self,
            zone_state: &ZoneState,
            scene: Option<&Scene>,
            lights: &[Light],
            _patterns: &[Pattern],
        ) -> impl Future<Output = DispatchReport> + Send {
            self.calls
                .lock()
                .unwrap()
                .push((*zone_state, scene.map(|s| s.id), lights.len()));
            let report = DispatchReport {
                zone_id: zone_state.zone_id,
                outcomes: Vec::new(),
            };
            async { report }
        }

        fn backend_status(&self) -> Vec<BackendStatus> {
            Vec::new()
        }
    }

    type Service = ControlService<
        InMemoryZoneRepo,
        InMemorySceneRepo,
        InMemoryLightRepo,
        InMemoryPatternRepo,
        RecordingDispatch,
    >;

    struct Fixture {
        svc: Service,
        zones: Arc<ZoneService<InMemoryZoneRepo>>,
        dispatch: Arc<RecordingDispatch>,
        zone: Zone,
        scene: Scene,
    }

    async fn fixture() -> Fixture {
        let zones = Arc::new(ZoneService::new(InMemoryZoneRepo::default()));
        let scene_lights = InMemoryLightRepo::default();
        let scene_patterns = InMemoryPatternRepo::default();
        let lights = Arc::new(LightService::new(InMemoryLightRepo::default()));
        let patterns = Arc::new(PatternService::new(InMemoryPatternRepo::default()));

        let zone = zones
            .create_zone(Zone::builder().name("Lounge").build().unwrap())
            .await
            .unwrap();
        let light = Light::builder()
            .name("Desk")
            .zone_id(zone.id)
            .lifx("aa")
            .build()
            .unwrap();
        lights.register_discovered(light.clone()).await.unwrap();
        LightRepository::create(&scene_lights, light.clone()).await.unwrap();
        let pattern = Pattern::builder()
            .name("Red")
            .solid(Color::hsv(0, 255))
            .build()
            .unwrap();
        patterns.create_pattern(pattern.clone()).await.unwrap();
        PatternRepository::create(&scene_patterns, pattern.clone()).await.unwrap();

        let scenes = Arc::new(SceneService::new(
            InMemorySceneRepo::default(),
            scene_lights,
            scene_patterns,
        ));
        let scene = scenes
            .create_scene(
                Scene::builder()
                    .name("Bright")
                    .light(light.id, Some(pattern.id), 255)
                    .build()
                    .unwrap(),
            )
            .await
            .unwrap();

        let dispatch = Arc::new(RecordingDispatch::default());
        let svc = ControlService::new(
            Arc::clone(&zones),
            scenes,
            lights,
            patterns,
            Arc::clone(&dispatch),
        );
        Fixture {
            svc,
            zones,
            dispatch,
            zone,
            scene,
        }
    }

    #[tokio::test]
    async fn should_persist_power_and_dispatch() {
        let f = fixture().await;

        f.svc.set_power(f.zone.id, true).await.unwrap();

        assert!(f.zones.get_zone(f.zone.id).await.unwrap().power);
        let calls = f.dispatch.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.power);
        assert_eq!(calls[0].1, None);
        assert_eq!(calls[0].2, 1);
    }

    #[tokio::test]
    async fn should_activate_scene_and_keep_it_for_later_changes() {
        let f = fixture().await;

        f.svc.set_scene(f.zone.id, Some(f.scene.id)).await.unwrap();
        f.svc.set_brightness(f.zone.id, 64).await.unwrap();

        let zone = f.zones.get_zone(f.zone.id).await.unwrap();
        assert_eq!(zone.active_scene_id, Some(f.scene.id));
        assert_eq!(zone.brightness, 64);
        let calls = f.dispatch.calls.lock().unwrap();
        assert_eq!(calls[1].0.brightness, 64);
        assert_eq!(calls[1].1, Some(f.scene.id));
    }

    #[tokio::test]
    async fn should_abort_without_writing_when_scene_is_missing() {
        let f = fixture().await;

        let result = f.svc.set_scene(f.zone.id, Some(SceneId::new())).await;

        assert!(matches!(
            result,
            Err(LightsError::NotFound(NotFoundError { entity: "Scene", .. }))
        ));
        assert_eq!(f.zones.get_zone(f.zone.id).await.unwrap().active_scene_id, None);
        assert!(f.dispatch.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_zone() {
        let f = fixture().await;
        let result = f.svc.set_power(ZoneId::new(), true).await;
        assert!(matches!(result, Err(LightsError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_apply_transient_state_without_persisting() {
        let f = fixture().await;
        let state = ZoneState {
            zone_id: f.zone.id,
            power: true,
            brightness: 12,
        };

        f.svc.apply_zone_state(state, Some(f.scene.id)).await.unwrap();

        let zone = f.zones.get_zone(f.zone.id).await.unwrap();
        assert!(!zone.power);
        assert_eq!(zone.brightness, 255);
        assert_eq!(f.dispatch.calls.lock().unwrap()[0].0, state);
    }

    #[tokio::test]
    async fn should_reapply_persisted_state() {
        let f = fixture().await;
        f.svc.set_power(f.zone.id, true).await.unwrap();

        f.svc.reapply_zone(f.zone.id).await.unwrap();

        let calls = f.dispatch.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, calls[1].0);
    }
}
