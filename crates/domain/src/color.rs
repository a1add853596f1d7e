//! Stored colour models and the normalisation maths shared by every backend.
//!
//! Storage keeps integers: hue in degrees `[0, 360)`, saturation and
//! brightness in `[0, 255]`. Backends receive `[0, 1]` fractions and convert
//! them to their own wire units.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Upper bound of every stored brightness and saturation scalar.
pub const MAX_BRIGHTNESS: u8 = 255;

/// Lowest colour temperature accepted, in Kelvin.
pub const MIN_TEMPERATURE: u16 = 1000;

/// Highest colour temperature accepted, in Kelvin.
pub const MAX_TEMPERATURE: u16 = 20000;

const FULL_CIRCLE: u16 = 360;

/// A stored colour, tagged by model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Color {
    Hsv(HsvColor),
    Temperature(TemperatureColor),
}

/// Hue in degrees and saturation on the 0–255 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvColor {
    pub hue: u16,
    pub saturation: u8,
}

/// White light described by its colour temperature in Kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureColor {
    pub temperature: u16,
}

impl Color {
    /// Shorthand for an HSV colour.
    #[must_use]
    pub fn hsv(hue: u16, saturation: u8) -> Self {
        Self::Hsv(HsvColor { hue, saturation })
    }

    /// Shorthand for a colour temperature.
    #[must_use]
    pub fn temperature(kelvin: u16) -> Self {
        Self::Temperature(TemperatureColor {
            temperature: kelvin,
        })
    }

    /// Check that the stored values are inside their documented ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::HueOutOfRange`] for a hue of 360 or more and
    /// [`ValidationError::TemperatureOutOfRange`] outside
    /// `MIN_TEMPERATURE..=MAX_TEMPERATURE`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Hsv(hsv) => validate_hue(hsv.hue),
            Self::Temperature(t)
                if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&t.temperature) =>
            {
                Err(ValidationError::TemperatureOutOfRange(t.temperature))
            }
            _ => Ok(()),
        }
    }
}

/// Reject hues of a full turn or more.
///
/// # Errors
///
/// Returns [`ValidationError::HueOutOfRange`] for a hue of 360 or more.
pub fn validate_hue(hue: u16) -> Result<(), ValidationError> {
    if hue >= FULL_CIRCLE {
        return Err(ValidationError::HueOutOfRange(hue));
    }
    Ok(())
}

/// Map a stored hue in degrees onto `[0, 1)`.
///
/// 360 wraps to 0, so both ends of the circle produce exactly `0.0`.
#[must_use]
pub fn hue_fraction(hue: u16) -> f64 {
    f64::from(hue % FULL_CIRCLE) / f64::from(FULL_CIRCLE)
}

/// Map a stored 0–255 scalar onto `[0, 1]`. Exact at both ends.
#[must_use]
pub fn unit_fraction(value: u8) -> f64 {
    f64::from(value) / f64::from(MAX_BRIGHTNESS)
}

/// Combine the scene, per-light and zone brightness scalars into one
/// normalised brightness.
///
/// The integer product is formed first so the result does not depend on
/// argument order and is rounded once.
#[must_use]
pub fn compose_brightness(scene: u8, light: u8, zone: u8) -> f64 {
    let product = u32::from(scene) * u32::from(light) * u32::from(zone);
    f64::from(product) / f64::from(u32::from(MAX_BRIGHTNESS).pow(3))
}
