//! # homelights-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for zones, lights, scenes and patterns
//!   (`/api/zones`, `/api/lights`, `/api/scenes`, `/api/patterns`)
//! - Expose the zone control entry points (power, brightness, scene, transient state)
//!   and return the per-light dispatch report
//! - Report backend registry status (`/api/backends`)
//! - Map [`LightsError`](homelights_domain::error::LightsError) kinds to status codes
//!
//! ## Dependency rule
//! Depends on `homelights-app` (for port traits and services) and `homelights-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
