//! # homelights-domain
//!
//! Pure domain model for the homelights lighting controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, the error taxonomy
//! - Define **Zones** (areas whose lights are controlled as a unit)
//! - Define **Lights** (one variant per device backend)
//! - Define **Scenes** (light → pattern assignments, reusable across zones)
//! - Define **Patterns** (colour and effect definitions)
//! - Colour maths shared by every backend (hue/saturation/brightness normalisation)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod color;
pub mod error;
pub mod id;

pub mod light;
pub mod pattern;
pub mod scene;
pub mod zone;
