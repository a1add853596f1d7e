//! Reconciler: diff discovered devices against persisted light records.
//!
//! Identity is the backend-native id alone. A device renamed on the
//! physical side keeps its record, and its stored name may go stale.

use std::collections::HashSet;

use homelights_domain::error::LightsError;
use homelights_domain::id::LightId;
use homelights_domain::light::{Light, LightKind, LightType};

use crate::ports::{DeviceHandle, LightRepository};
use crate::services::light_service::LightService;

/// Writes needed to bring the store in line with discovery.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub create: Vec<Light>,
    pub delete: Vec<LightId>,
}

impl ReconcilePlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.delete.is_empty()
    }
}

/// Compute the diff for one backend.
///
/// Creates a record for every device in `discovered` whose native id has no
/// record of type `kind`, and deletes every record of type `kind` whose
/// native id was not discovered. Records of other types are never touched.
///
/// # Errors
///
/// Returns [`LightsError::Validation`] when a discovered native id cannot
/// form a light of type `kind`.
pub fn plan<D: DeviceHandle>(
    kind: LightType,
    discovered: &[D],
    persisted: &[Light],
) -> Result<ReconcilePlan, LightsError> {
    let known: HashSet<String> = persisted
        .iter()
        .filter(|light| light.light_type() == kind)
        .map(Light::native_id)
        .collect();
    let present: HashSet<&str> = discovered.iter().map(|device| device.native_id()).collect();

    let mut create = Vec::new();
    let mut queued = HashSet::new();
    for device in discovered {
        let native_id = device.native_id();
        if known.contains(native_id) || !queued.insert(native_id) {
            continue;
        }
        let name = if device.label().is_empty() {
            native_id
        } else {
            device.label()
        };
        create.push(Light {
            id: LightId::new(),
            name: name.to_string(),
            zone_id: None,
            kind: LightKind::from_native_id(kind, native_id)?,
        });
    }

    let delete = persisted
        .iter()
        .filter(|light| light.light_type() == kind)
        .filter(|light| !present.contains(light.native_id().as_str()))
        .map(|light| light.id)
        .collect();

    Ok(ReconcilePlan { create, delete })
}

/// Diff and apply for one backend, returning the plan that was executed.
///
/// # Errors
///
/// Propagates the first failed read or write. Writes already made stay made.
#[tracing::instrument(skip(lights, discovered), fields(discovered = discovered.len()))]
pub async fn reconcile<D, R>(
    kind: LightType,
    lights: &LightService<R>,
    discovered: &[D],
) -> Result<ReconcilePlan, LightsError>
where
    D: DeviceHandle,
    R: LightRepository,
{
    let persisted = lights.list_lights_of_type(kind).await?;
    let plan = plan(kind, discovered, &persisted)?;
    for light in &plan.create {
        lights.register_discovered(light.clone()).await?;
    }
    for id in &plan.delete {
        lights.remove_stale_light(*id).await?;
    }
    tracing::info!(
        created = plan.create.len(),
        deleted = plan.delete.len(),
        "reconciliation complete"
    );
    Ok(plan)
}
