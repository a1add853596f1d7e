//! # homelights-app
//!
//! Application layer: use-cases, lighting-state dispatch and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ZoneRepository`, `LightRepository`, `SceneRepository`, `PatternRepository`: CRUD
//!   - `LightBackend`: discover devices and push light states for one device family
//! - Keep one **device registry** per backend, written once at startup
//! - **Reconcile** persisted light records against discovered devices
//! - **Resolve** the colour each light should show for a zone state and scene
//! - **Dispatch** a zone state to all of its lights concurrently, collecting every outcome
//! - Provide CRUD services and the zone control service used by the HTTP layer
//!
//! ## Dependency rule
//! Depends on `homelights-domain` only (plus `futures` for joining device calls).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod dispatcher;
pub mod effector;
pub mod ports;
pub mod reconciler;
pub mod registry;
pub mod resolver;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
