//! Pattern: A colour or effect definition referenced by scene entries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::{Color, validate_hue};
use crate::error::{LightsError, ValidationError};
use crate::id::PatternId;

/// A named, reusable colour/effect definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: PatternId,
    pub name: String,
    pub kind: PatternKind,
}

/// Pattern variants with their type-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum PatternKind {
    /// A single steady colour.
    Solid(SolidPattern),
    /// A colour breathing in and out at `rate`.
    Pulse(PulsePattern),
    /// A hue sweep across the full colour wheel at `rate`.
    Rainbow(RainbowPattern),
    /// A travelling band over a pulsing foreground and a steady background.
    Wave(WavePattern),
    /// The whole strip stepping through the colour wheel in unison.
    ColorCycle(ColorCyclePattern),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidPattern {
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulsePattern {
    pub color: Color,
    pub rate: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RainbowPattern {
    pub rate: u8,
}

/// Hues are in degrees, `0..360`, all at full saturation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WavePattern {
    pub wave_hue: u16,
    pub foreground_hue: u16,
    pub background_hue: u16,
    pub rate: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorCyclePattern {
    pub rate: u8,
}

/// Data-free discriminant of [`PatternKind`], used for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternType {
    Solid,
    Pulse,
    Rainbow,
    Wave,
    ColorCycle,
}

impl PatternKind {
    #[must_use]
    pub fn pattern_type(&self) -> PatternType {
        match self {
            Self::Solid(_) => PatternType::Solid,
            Self::Pulse(_) => PatternType::Pulse,
            Self::Rainbow(_) => PatternType::Rainbow,
            Self::Wave(_) => PatternType::Wave,
            Self::ColorCycle(_) => PatternType::ColorCycle,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Solid(solid) => solid.color.validate(),
            Self::Pulse(pulse) => {
                if pulse.rate == 0 {
                    return Err(ValidationError::InvalidRate);
                }
                pulse.color.validate()
            }
            Self::Wave(wave) => {
                if wave.rate == 0 {
                    return Err(ValidationError::InvalidRate);
                }
                validate_hue(wave.wave_hue)?;
                validate_hue(wave.foreground_hue)?;
                validate_hue(wave.background_hue)
            }
            Self::Rainbow(RainbowPattern { rate }) | Self::ColorCycle(ColorCyclePattern { rate })
                if *rate == 0 =>
            {
                Err(ValidationError::InvalidRate)
            }
            Self::Rainbow(_) | Self::ColorCycle(_) => Ok(()),
        }
    }
}

impl Pattern {
    /// Create a builder for constructing a [`Pattern`].
    #[must_use]
    pub fn builder() -> PatternBuilder {
        PatternBuilder::default()
    }

    #[must_use]
    pub fn pattern_type(&self) -> PatternType {
        self.kind.pattern_type()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] when the name is empty or the
    /// pattern data is out of range.
    pub fn validate(&self) -> Result<(), LightsError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        self.kind.validate()?;
        Ok(())
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solid => f.write_str("solid"),
            Self::Pulse => f.write_str("pulse"),
            Self::Rainbow => f.write_str("rainbow"),
            Self::Wave => f.write_str("wave"),
            Self::ColorCycle => f.write_str("color-cycle"),
        }
    }
}

/// Step-by-step builder for [`Pattern`].
#[derive(Debug, Default)]
pub struct PatternBuilder {
    id: Option<PatternId>,
    name: Option<String>,
    kind: Option<PatternKind>,
}

impl PatternBuilder {
    #[must_use]
    pub fn id(mut self, id: PatternId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: PatternKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn solid(self, color: Color) -> Self {
        self.kind(PatternKind::Solid(SolidPattern { color }))
    }

    /// Consume the builder, validate, and return a [`Pattern`].
    ///
    /// A builder without a kind yields a solid 2700K white.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] if `name` is missing or the data
    /// is out of range.
    pub fn build(self) -> Result<Pattern, LightsError> {
        let pattern = Pattern {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            kind: self.kind.unwrap_or(PatternKind::Solid(SolidPattern {
                color: Color::temperature(2700),
            })),
        };
        pattern.validate()?;
        Ok(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_solid_pattern() {
        let pattern = Pattern::builder()
            .name("Blue")
            .solid(Color::hsv(240, 255))
            .build()
            .unwrap();
        assert_eq!(pattern.pattern_type(), PatternType::Solid);
    }

    #[test]
    fn should_reject_empty_name() {
        let result = Pattern::builder().solid(Color::hsv(0, 0)).build();
        assert!(matches!(
            result,
            Err(LightsError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_reject_out_of_range_colour() {
        let result = Pattern::builder()
            .name("Bad")
            .solid(Color::hsv(400, 10))
            .build();
        assert!(matches!(
            result,
            Err(LightsError::Validation(ValidationError::HueOutOfRange(400)))
        ));
    }

    #[test]
    fn should_reject_zero_rate_animation() {
        let result = Pattern::builder()
            .name("Still")
            .kind(PatternKind::Rainbow(RainbowPattern { rate: 0 }))
            .build();
        assert!(matches!(
            result,
            Err(LightsError::Validation(ValidationError::InvalidRate))
        ));
    }

    #[test]
    fn should_serialize_kind_with_type_and_data() {
        let kind = PatternKind::Solid(SolidPattern {
            color: Color::hsv(170, 255),
        });
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "solid",
                "data": { "color": { "type": "hsv", "hue": 170, "saturation": 255 } }
            })
        );
    }

    #[test]
    fn should_deserialize_pulse_pattern() {
        let json = r#"{"type":"pulse","data":{"color":{"type":"hsv","hue":120,"saturation":255},"rate":16}}"#;
        let kind: PatternKind = serde_json::from_str(json).unwrap();
        assert_eq!(kind.pattern_type(), PatternType::Pulse);
    }

    #[test]
    fn should_deserialize_color_cycle_with_kebab_case_tag() {
        let kind: PatternKind =
            serde_json::from_str(r#"{"type":"color-cycle","data":{"rate":4}}"#).unwrap();
        assert_eq!(kind, PatternKind::ColorCycle(ColorCyclePattern { rate: 4 }));
        assert_eq!(kind.pattern_type().to_string(), "color-cycle");
    }

    #[test]
    fn should_reject_wave_with_out_of_range_hue() {
        let wave = WavePattern {
            wave_hue: 0,
            foreground_hue: 170,
            background_hue: 360,
            rate: 8,
        };
        let result = Pattern::builder()
            .name("Tide")
            .kind(PatternKind::Wave(wave))
            .build();
        assert!(matches!(
            result,
            Err(LightsError::Validation(ValidationError::HueOutOfRange(360)))
        ));

        let still = Pattern::builder()
            .name("Tide")
            .kind(PatternKind::Wave(WavePattern { rate: 0, background_hue: 85, ..wave }))
            .build();
        assert!(matches!(
            still,
            Err(LightsError::Validation(ValidationError::InvalidRate))
        ));
    }
}
