//! Dispatcher: apply one zone's control target to all of its lights.
//!
//! Every light of the zone is driven concurrently and every outcome is
//! collected, so one unreachable device neither blocks nor fails its
//! siblings. A call completes when the slowest device has settled.

use std::collections::BTreeMap;
use std::time::Duration;

use futures::future::join_all;

use homelights_domain::error::LightsError;
use homelights_domain::id::{LightId, ZoneId};
use homelights_domain::light::{Light, LightKind, LightType};
use homelights_domain::pattern::Pattern;
use homelights_domain::scene::Scene;
use homelights_domain::zone::ZoneState;

pub use crate::effector::BackendStatus;
use crate::effector::Effector;
use crate::ports::{LightBackend, LightRepository, ZoneDispatch};
use crate::resolver::LightCommand;
use crate::services::light_service::LightService;

/// Transition applied to every state change unless configured otherwise.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(250);

/// What happened to one light during a dispatch.
#[derive(Debug)]
pub struct LightOutcome {
    pub light_id: LightId,
    pub light_type: LightType,
    pub result: Result<LightCommand, LightsError>,
}

/// Aggregate result of one `apply_zone_state` call.
#[derive(Debug)]
pub struct DispatchReport {
    pub zone_id: ZoneId,
    pub outcomes: Vec<LightOutcome>,
}

impl DispatchReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// `true` when every light accepted its command (or the zone has none).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }

    /// The command sent to `light_id`, if it succeeded.
    #[must_use]
    pub fn command_for(&self, light_id: LightId) -> Option<&LightCommand> {
        self.outcomes
            .iter()
            .find(|o| o.light_id == light_id)
            .and_then(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&LightOutcome, &LightsError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|err| (o, err)))
    }
}

/// Routes each light to the effector of its backend.
pub struct Dispatcher<R: LightBackend, H: LightBackend, L: LightBackend> {
    rvl: Effector<R>,
    philips_hue: Effector<H>,
    lifx: Effector<L>,
    transition: Duration,
}

impl<R, H, L> Dispatcher<R, H, L>
where
    R: LightBackend,
    H: LightBackend,
    L: LightBackend,
{
    pub fn new(rvl: R, philips_hue: H, lifx: L) -> Self {
        Self {
            rvl: Effector::new(rvl),
            philips_hue: Effector::new(philips_hue),
            lifx: Effector::new(lifx),
            transition: DEFAULT_TRANSITION,
        }
    }

    #[must_use]
    pub fn with_transition(mut self, transition: Duration) -> Self {
        self.transition = transition;
        self
    }

    pub fn rvl(&self) -> &Effector<R> {
        &self.rvl
    }

    pub fn philips_hue(&self) -> &Effector<H> {
        &self.philips_hue
    }

    pub fn lifx(&self) -> &Effector<L> {
        &self.lifx
    }

    /// Start every backend concurrently. Failures stay with their backend.
    pub async fn start_all<LR: LightRepository>(&self, lights: &LightService<LR>) -> Vec<BackendStatus> {
        let (rvl, hue, lifx) = futures::join!(
            self.rvl.start(lights),
            self.philips_hue.start(lights),
            self.lifx.start(lights),
        );
        for (kind, result) in [
            (LightType::Rvl, rvl),
            (LightType::PhilipsHue, hue),
            (LightType::Lifx, lifx),
        ] {
            if let Err(err) = result {
                tracing::debug!(backend = %kind, kind = %err.kind(), "backend start failed");
            }
        }
        self.backend_status()
    }

    async fn apply_light(
        &self,
        light: &Light,
        zone_state: &ZoneState,
        scene: Option<&Scene>,
        patterns: &[Pattern],
    ) -> LightOutcome {
        let result = match &light.kind {
            LightKind::Rvl { .. } => {
                self.rvl
                    .apply(light, zone_state, scene, patterns, self.transition)
                    .await
            }
            LightKind::PhilipsHue { .. } => {
                self.philips_hue
                    .apply(light, zone_state, scene, patterns, self.transition)
                    .await
            }
            LightKind::Lifx { .. } => {
                self.lifx
                    .apply(light, zone_state, scene, patterns, self.transition)
                    .await
            }
        };
        if let Err(err) = &result {
            tracing::warn!(
                light_id = %light.id,
                light_type = %light.light_type(),
                kind = %err.kind(),
                detail = %err.detail(),
                "light dispatch failed"
            );
        }
        LightOutcome {
            light_id: light.id,
            light_type: light.light_type(),
            result,
        }
    }
}

impl<R, H, L> ZoneDispatch for Dispatcher<R, H, L>
where
    R: LightBackend,
    H: LightBackend,
    L: LightBackend,
{
    #[tracing::instrument(skip_all, fields(zone_id = %zone_state.zone_id, power = zone_state.power))]
    async fn apply_zone_state(
        &self,
        zone_state: &ZoneState,
        scene: Option<&Scene>,
        lights: &[Light],
        patterns: &[Pattern],
    ) -> DispatchReport {
        let members: Vec<&Light> = lights
            .iter()
            .filter(|light| light.zone_id == Some(zone_state.zone_id))
            .collect();

        let mut groups: BTreeMap<LightType, usize> = BTreeMap::new();
        for light in &members {
            *groups.entry(light.light_type()).or_default() += 1;
        }
        tracing::debug!(?groups, "dispatching zone state");

        let outcomes = join_all(
            members
                .into_iter()
                .map(|light| self.apply_light(light, zone_state, scene, patterns)),
        )
        .await;

        let report = DispatchReport {
            zone_id: zone_state.zone_id,
            outcomes,
        };
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "zone state dispatched"
        );
        report
    }

    fn backend_status(&self) -> Vec<BackendStatus> {
        vec![
            self.rvl.status(),
            self.philips_hue.status(),
            self.lifx.status(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effector::tests::FakeBackend;
    use crate::registry::RegistryState;
    use crate::resolver::Effect;
    use crate::testing::InMemoryLightRepo;
    use homelights_domain::color::Color;
    use homelights_domain::error::DeviceUnavailableError;
    use homelights_domain::light::RvlChannel;

    type TestDispatcher = Dispatcher<FakeBackend, FakeBackend, FakeBackend>;

    fn dispatcher(rvl: FakeBackend, hue: FakeBackend, lifx: FakeBackend) -> TestDispatcher {
        Dispatcher::new(rvl, hue, lifx)
    }

    async fn started(d: TestDispatcher) -> TestDispatcher {
        let svc = LightService::new(InMemoryLightRepo::default());
        d.start_all(&svc).await;
        d
    }

    fn zone_state(zone_id: ZoneId, power: bool) -> ZoneState {
        ZoneState {
            zone_id,
            power,
            brightness: 255,
        }
    }

    struct Setup {
        zone: ZoneId,
        lights: Vec<Light>,
        scene: Scene,
        patterns: Vec<Pattern>,
    }

    fn setup() -> Setup {
        let zone = ZoneId::new();
        let rvl = Light::builder()
            .name("Strip")
            .zone_id(zone)
            .rvl(RvlChannel::try_from(3).unwrap())
            .build()
            .unwrap();
        let hue = Light::builder()
            .name("Hall")
            .zone_id(zone)
            .philips_hue("1")
            .build()
            .unwrap();
        let lifx = Light::builder()
            .name("Desk")
            .zone_id(zone)
            .lifx("aa")
            .build()
            .unwrap();
        let elsewhere = Light::builder()
            .name("Porch")
            .zone_id(ZoneId::new())
            .lifx("bb")
            .build()
            .unwrap();
        let solid = Pattern::builder()
            .name("Teal")
            .solid(Color::hsv(170, 255))
            .build()
            .unwrap();
        let scene = Scene::builder()
            .name("Evening")
            .brightness(200)
            .light(rvl.id, Some(solid.id), 255)
            .light(hue.id, Some(solid.id), 128)
            .light(lifx.id, None, 255)
            .build()
            .unwrap();
        Setup {
            zone,
            lights: vec![rvl, hue, lifx, elsewhere],
            scene,
            patterns: vec![solid],
        }
    }

    fn backends() -> (FakeBackend, FakeBackend, FakeBackend) {
        (
            FakeBackend::new(LightType::Rvl, &[("3", "3")]),
            FakeBackend::new(LightType::PhilipsHue, &[("1", "Hall")]),
            FakeBackend::new(LightType::Lifx, &[("aa", "Desk"), ("bb", "Porch")]),
        )
    }

    #[tokio::test]
    async fn should_drive_only_lights_of_the_zone() {
        let s = setup();
        let (rvl, hue, lifx) = backends();
        let d = started(dispatcher(rvl, hue, lifx)).await;

        let report = d
            .apply_zone_state(&zone_state(s.zone, true), Some(&s.scene), &s.lights, &s.patterns)
            .await;

        assert_eq!(report.outcomes.len(), 3);
        assert!(report.is_complete());
        assert_eq!(d.lifx().backend().sent(), vec![("aa".to_string(), LightCommand::Off)]);
        assert_eq!(d.rvl().backend().sent().len(), 1);
    }

    #[tokio::test]
    async fn should_send_resolved_colour_and_off() {
        let s = setup();
        let (rvl, hue, lifx) = backends();
        let d = started(dispatcher(rvl, hue, lifx)).await;

        let report = d
            .apply_zone_state(&zone_state(s.zone, true), Some(&s.scene), &s.lights, &s.patterns)
            .await;

        let Some(LightCommand::On(color)) = report.command_for(s.lights[1].id) else {
            panic!("hue light should be on");
        };
        assert_eq!(color.hue, 170.0 / 360.0);
        assert_eq!(color.saturation, 1.0);
        assert!((color.brightness - (200.0 / 255.0) * (128.0 / 255.0)).abs() < 1e-12);
        assert_eq!(color.effect, Effect::Steady);
        assert_eq!(report.command_for(s.lights[2].id), Some(&LightCommand::Off));
    }

    #[tokio::test]
    async fn should_turn_everything_off_when_powered_down() {
        let s = setup();
        let (rvl, hue, lifx) = backends();
        let d = started(dispatcher(rvl, hue, lifx)).await;

        let report = d
            .apply_zone_state(&zone_state(s.zone, false), Some(&s.scene), &s.lights, &s.patterns)
            .await;

        assert!(report.is_complete());
        for outcome in &report.outcomes {
            assert_eq!(outcome.result.as_ref().ok(), Some(&LightCommand::Off));
        }
    }

    #[tokio::test]
    async fn should_isolate_a_failing_light() {
        let s = setup();
        let (rvl, hue, lifx) = backends();
        let d = started(dispatcher(rvl, hue.failing_on("1"), lifx)).await;

        let report = d
            .apply_zone_state(&zone_state(s.zone, true), Some(&s.scene), &s.lights, &s.patterns)
            .await;

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        let (outcome, err) = report.failures().next().unwrap();
        assert_eq!(outcome.light_type, LightType::PhilipsHue);
        assert!(matches!(
            err,
            LightsError::DeviceUnavailable(DeviceUnavailableError::Transport { .. })
        ));
        assert_eq!(d.rvl().backend().sent().len(), 1);
        assert_eq!(d.lifx().backend().sent().len(), 1);
    }

    #[tokio::test]
    async fn should_report_undiscovered_device_without_aborting_siblings() {
        let s = setup();
        let (rvl, _, lifx) = backends();
        let hue = FakeBackend::new(LightType::PhilipsHue, &[("9", "Other")]);
        let d = started(dispatcher(rvl, hue, lifx)).await;

        let report = d
            .apply_zone_state(&zone_state(s.zone, true), Some(&s.scene), &s.lights, &s.patterns)
            .await;

        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.failures().next().unwrap().1,
            LightsError::DeviceUnavailable(DeviceUnavailableError::NotDiscovered { .. })
        ));
    }

    #[tokio::test]
    async fn should_report_every_backend_status() {
        let (rvl, hue, _) = backends();
        let d = started(dispatcher(rvl, hue, FakeBackend::new(LightType::Lifx, &[]))).await;

        let status = d.backend_status();
        assert_eq!(status.len(), 3);
        assert_eq!(status[0].state, RegistryState::Populated);
        assert_eq!(status[1].device_count, 1);
        assert!(matches!(status[2].state, RegistryState::Stale(_)));
    }

    #[tokio::test]
    async fn should_complete_empty_zone() {
        let (rvl, hue, lifx) = backends();
        let d = started(dispatcher(rvl, hue, lifx)).await;
        let report = d
            .apply_zone_state(&zone_state(ZoneId::new(), true), None, &[], &[])
            .await;
        assert!(report.outcomes.is_empty());
        assert!(report.is_complete());
    }
}
