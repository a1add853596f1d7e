//! Dispatch port: fan a zone's control target out to its lights.
//!
//! [`ControlService`](crate::services::control_service::ControlService)
//! depends on this trait rather than on the concrete
//! [`Dispatcher`](crate::dispatcher::Dispatcher), so the service is not
//! generic over every backend.

use std::future::Future;

use homelights_domain::light::Light;
use homelights_domain::pattern::Pattern;
use homelights_domain::scene::Scene;
use homelights_domain::zone::ZoneState;

use crate::dispatcher::{BackendStatus, DispatchReport};

pub trait ZoneDispatch: Send + Sync {
    /// Apply `zone_state` with `scene` to every light of the zone.
    ///
    /// `lights` may contain lights of other zones; they are ignored.
    /// Per-light failures are reported in the returned [`DispatchReport`],
    /// never raised.
    fn apply_zone_state(
        &self,
        zone_state: &ZoneState,
        scene: Option<&Scene>,
        lights: &[Light],
        patterns: &[Pattern],
    ) -> impl Future<Output = DispatchReport> + Send;

    /// Current registry state of every backend.
    fn backend_status(&self) -> Vec<BackendStatus>;
}
