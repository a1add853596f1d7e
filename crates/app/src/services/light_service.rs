//! Light service: use-cases for managing lights of every backend.
//!
//! Two lifecycles meet here. RVL and Philips Hue records are created on
//! request; LIFX records are created only by reconciliation. Philips Hue
//! records are removed only by their backend.

use homelights_domain::error::{LightsError, NotFoundError, ValidationError};
use homelights_domain::id::{LightId, ZoneId};
use homelights_domain::light::{Light, LightKind, LightType};

use crate::ports::LightRepository;

/// A request to register a light by hand.
///
/// `native_id` is the backend-native identifier as typed by the user:
/// the RVL channel in decimal, or the Hue bridge light id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLight {
    pub name: String,
    pub zone_id: Option<ZoneId>,
    pub light_type: LightType,
    pub native_id: String,
}

/// Application service for light CRUD operations.
pub struct LightService<R> {
    repo: R,
}

impl<R: LightRepository> LightService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Register a light on user request.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] for LIFX requests, malformed RVL
    /// channels, or empty names. Nothing is written in that case.
    /// Returns [`LightsError::Conflict`] when the channel or Hue id is taken.
    #[tracing::instrument(skip(self, request), fields(light_name = %request.name, light_type = %request.light_type))]
    pub async fn create_light(&self, request: NewLight) -> Result<Light, LightsError> {
        if request.light_type == LightType::Lifx {
            return Err(ValidationError::NotUserCreatable(request.light_type).into());
        }
        let kind = LightKind::from_native_id(request.light_type, &request.native_id)?;
        let light = Light {
            id: LightId::new(),
            name: request.name,
            zone_id: request.zone_id,
            kind,
        };
        light.validate()?;
        self.repo.create(light).await
    }

    /// Persist a light found by backend discovery.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, light), fields(light_type = %light.light_type(), native_id = %light.native_id()))]
    pub async fn register_discovered(&self, light: Light) -> Result<Light, LightsError> {
        light.validate()?;
        self.repo.create(light).await
    }

    /// Look up a light by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::NotFound`] when no light with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_light(&self, id: LightId) -> Result<Light, LightsError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Light",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all lights.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_lights(&self) -> Result<Vec<Light>, LightsError> {
        self.repo.get_all().await
    }

    /// List the lights of one backend.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_lights_of_type(&self, kind: LightType) -> Result<Vec<Light>, LightsError> {
        let mut lights = self.repo.get_all().await?;
        lights.retain(|light| light.light_type() == kind);
        Ok(lights)
    }

    /// Update an existing light.
    ///
    /// The name and zone can always change. An RVL light may move to
    /// another channel; the native id of discovered lights is fixed.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::NotFound`] if the light does not exist,
    /// [`LightsError::Validation`] if invariants fail or the backend
    /// identity changes, or a storage error from the repository.
    #[tracing::instrument(skip(self, light), fields(light_id = %light.id))]
    pub async fn update_light(&self, light: Light) -> Result<Light, LightsError> {
        light.validate()?;
        let existing = self.get_light(light.id).await?;
        let (from, to) = (existing.light_type(), light.light_type());
        if from != to {
            return Err(ValidationError::TypeChanged { from, to }.into());
        }
        if from != LightType::Rvl && existing.kind != light.kind {
            return Err(ValidationError::BackendManaged(from).into());
        }
        self.repo.update(light).await
    }

    /// Delete a light on user request.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] for Philips Hue lights, which are
    /// removed only when the bridge stops reporting them.
    /// Returns [`LightsError::NotFound`] if the light does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn delete_light(&self, id: LightId) -> Result<(), LightsError> {
        let light = self.get_light(id).await?;
        if light.light_type() == LightType::PhilipsHue {
            return Err(ValidationError::BackendManaged(LightType::PhilipsHue).into());
        }
        self.repo.delete(id).await
    }

    /// Delete a light that its backend no longer reports, whatever its type.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn remove_stale_light(&self, id: LightId) -> Result<(), LightsError> {
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryLightRepo;
    use homelights_domain::light::NUM_RVL_CHANNELS;

    fn make_service() -> LightService<InMemoryLightRepo> {
        LightService::new(InMemoryLightRepo::default())
    }

    fn request(light_type: LightType, native_id: &str) -> NewLight {
        NewLight {
            name: "Lamp".to_string(),
            zone_id: None,
            light_type,
            native_id: native_id.to_string(),
        }
    }

    #[tokio::test]
    async fn should_create_rvl_light_for_every_valid_channel() {
        let svc = make_service();
        for channel in 0..NUM_RVL_CHANNELS {
            let light = svc
                .create_light(request(LightType::Rvl, &channel.to_string()))
                .await
                .unwrap();
            assert_eq!(light.native_id(), channel.to_string());
        }
        assert_eq!(svc.list_lights().await.unwrap().len(), usize::from(NUM_RVL_CHANNELS));
    }

    #[tokio::test]
    async fn should_reject_invalid_channel_without_writing() {
        let svc = make_service();
        for channel in ["-1", "8", "255", "2.5", "one", ""] {
            let result = svc.create_light(request(LightType::Rvl, channel)).await;
            assert!(
                matches!(result, Err(LightsError::Validation(_))),
                "channel {channel:?} should be rejected"
            );
        }
        assert_eq!(svc.repo.writes(), 0);
    }

    #[tokio::test]
    async fn should_create_philips_hue_light() {
        let svc = make_service();
        let light = svc
            .create_light(request(LightType::PhilipsHue, "3"))
            .await
            .unwrap();
        assert_eq!(
            light.kind,
            LightKind::PhilipsHue {
                philips_hue_id: "3".to_string()
            }
        );
    }

    #[tokio::test]
    async fn should_reject_manual_lifx_creation() {
        let svc = make_service();
        let result = svc
            .create_light(request(LightType::Lifx, "d0:73:d5:01:02:03"))
            .await;
        assert!(matches!(
            result,
            Err(LightsError::Validation(ValidationError::NotUserCreatable(
                LightType::Lifx
            )))
        ));
        assert_eq!(svc.repo.writes(), 0);
    }

    #[tokio::test]
    async fn should_register_discovered_lifx_light() {
        let svc = make_service();
        let light = Light::builder()
            .name("Desk")
            .lifx("d0:73:d5:01:02:03")
            .build()
            .unwrap();
        svc.register_discovered(light).await.unwrap();
        assert_eq!(svc.list_lights_of_type(LightType::Lifx).await.unwrap().len(), 1);
        assert!(svc.list_lights_of_type(LightType::Rvl).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_reject_user_delete_of_philips_hue_light() {
        let svc = make_service();
        let light = svc
            .create_light(request(LightType::PhilipsHue, "7"))
            .await
            .unwrap();

        let result = svc.delete_light(light.id).await;
        assert!(matches!(
            result,
            Err(LightsError::Validation(ValidationError::BackendManaged(
                LightType::PhilipsHue
            )))
        ));
        assert!(svc.get_light(light.id).await.is_ok());

        svc.remove_stale_light(light.id).await.unwrap();
        assert!(matches!(
            svc.get_light(light.id).await,
            Err(LightsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_delete_rvl_light_on_request() {
        let svc = make_service();
        let light = svc.create_light(request(LightType::Rvl, "0")).await.unwrap();
        svc.delete_light(light.id).await.unwrap();
        assert!(svc.list_lights().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_return_not_found_when_deleting_missing_light() {
        let svc = make_service();
        let result = svc.delete_light(LightId::new()).await;
        assert!(matches!(result, Err(LightsError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_move_rvl_light_to_another_channel_and_zone() {
        let svc = make_service();
        let mut light = svc.create_light(request(LightType::Rvl, "1")).await.unwrap();
        let zone = ZoneId::new();
        light.zone_id = Some(zone);
        light.kind = LightKind::from_native_id(LightType::Rvl, "4").unwrap();

        let saved = svc.update_light(light).await.unwrap();
        assert_eq!(saved.zone_id, Some(zone));
        assert_eq!(saved.native_id(), "4");
    }

    #[tokio::test]
    async fn should_reject_type_change_on_update() {
        let svc = make_service();
        let mut light = svc.create_light(request(LightType::Rvl, "1")).await.unwrap();
        light.kind = LightKind::PhilipsHue {
            philips_hue_id: "1".to_string(),
        };
        let result = svc.update_light(light).await;
        assert!(matches!(
            result,
            Err(LightsError::Validation(ValidationError::TypeChanged { .. }))
        ));
    }

    #[tokio::test]
    async fn should_reject_native_id_change_for_hue_light() {
        let svc = make_service();
        let mut light = svc
            .create_light(request(LightType::PhilipsHue, "1"))
            .await
            .unwrap();
        light.kind = LightKind::PhilipsHue {
            philips_hue_id: "2".to_string(),
        };
        let result = svc.update_light(light).await;
        assert!(matches!(
            result,
            Err(LightsError::Validation(ValidationError::BackendManaged(_)))
        ));
    }
}
