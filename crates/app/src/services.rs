//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod control_service;
pub mod light_service;
pub mod pattern_service;
pub mod scene_service;
pub mod zone_service;
