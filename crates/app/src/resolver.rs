//! Color/pattern resolver: Decides what one light should show.
//!
//! [`resolve`] is pure: it looks only at the light, the zone's control
//! target, the active scene and the pattern table, and returns either
//! [`LightCommand::Off`] or a normalised [`EffectorColor`].

use homelights_domain::color::{Color, compose_brightness, hue_fraction, unit_fraction};
use homelights_domain::error::{CapabilityError, LightsError, NotFoundError};
use homelights_domain::light::Light;
use homelights_domain::pattern::{Pattern, PatternKind, PatternType};
use homelights_domain::scene::Scene;
use homelights_domain::zone::ZoneState;

/// What a backend should make a device do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightCommand {
    Off,
    On(EffectorColor),
}

/// A colour normalised for backend consumption.
///
/// `hue` is in `[0, 1)`, `saturation` and `brightness` in `[0, 1]`.
/// Temperature colours carry `kelvin` with hue and saturation pinned to 0;
/// each backend picks its own kelvin default when `kelvin` is `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectorColor {
    pub hue: f64,
    pub saturation: f64,
    pub brightness: f64,
    pub kelvin: Option<u16>,
    pub effect: Effect,
}

/// Animation applied on top of the colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Steady,
    Pulse { rate: u8 },
    Rainbow { rate: u8 },
    /// The colour's hue is the pulsing foreground; the band and the
    /// background carry their own hues, in degrees.
    Wave {
        rate: u8,
        wave_hue: u16,
        background_hue: u16,
    },
    ColorCycle { rate: u8 },
}

impl EffectorColor {
    fn from_color(color: Color, brightness: f64, effect: Effect) -> Self {
        match color {
            Color::Hsv(hsv) => Self {
                hue: hue_fraction(hsv.hue),
                saturation: unit_fraction(hsv.saturation),
                brightness,
                kelvin: None,
                effect,
            },
            Color::Temperature(t) => Self {
                hue: 0.0,
                saturation: 0.0,
                brightness,
                kelvin: Some(t.temperature),
                effect,
            },
        }
    }

    /// Effects that sweep every hue themselves start from red.
    fn full_wheel(brightness: f64, effect: Effect) -> Self {
        Self {
            hue: 0.0,
            saturation: 1.0,
            brightness,
            kelvin: None,
            effect,
        }
    }
}

/// Compute the command for `light` given its zone's state and active scene.
///
/// `supported` lists the pattern types the light's backend can render.
///
/// # Errors
///
/// - [`LightsError::NotFound`] when the active scene has no entry for the
///   light, or the entry references a pattern that does not exist.
/// - [`LightsError::Capability`] when the pattern type is not in `supported`.
pub fn resolve(
    light: &Light,
    zone_state: &ZoneState,
    scene: Option<&Scene>,
    patterns: &[Pattern],
    supported: &[PatternType],
) -> Result<LightCommand, LightsError> {
    let Some(scene) = scene.filter(|_| zone_state.power) else {
        return Ok(LightCommand::Off);
    };

    let entry = scene.entry(light.id).ok_or_else(|| NotFoundError {
        entity: "Scene entry for light",
        id: light.id.to_string(),
    })?;

    let Some(pattern_id) = entry.pattern_id else {
        return Ok(LightCommand::Off);
    };

    let pattern = patterns
        .iter()
        .find(|pattern| pattern.id == pattern_id)
        .ok_or_else(|| NotFoundError {
            entity: "Pattern",
            id: pattern_id.to_string(),
        })?;

    let pattern_type = pattern.pattern_type();
    if !supported.contains(&pattern_type) {
        return Err(CapabilityError {
            backend: light.light_type(),
            pattern: pattern_type,
        }
        .into());
    }

    let brightness = compose_brightness(scene.brightness, entry.brightness, zone_state.brightness);

    let color = match pattern.kind {
        PatternKind::Solid(solid) => EffectorColor::from_color(solid.color, brightness, Effect::Steady),
        PatternKind::Pulse(pulse) => EffectorColor::from_color(
            pulse.color,
            brightness,
            Effect::Pulse { rate: pulse.rate },
        ),
        PatternKind::Rainbow(rainbow) => {
            EffectorColor::full_wheel(brightness, Effect::Rainbow { rate: rainbow.rate })
        }
        PatternKind::ColorCycle(cycle) => {
            EffectorColor::full_wheel(brightness, Effect::ColorCycle { rate: cycle.rate })
        }
        PatternKind::Wave(wave) => EffectorColor {
            hue: hue_fraction(wave.foreground_hue),
            saturation: 1.0,
            brightness,
            kelvin: None,
            effect: Effect::Wave {
                rate: wave.rate,
                wave_hue: wave.wave_hue,
                background_hue: wave.background_hue,
            },
        },
    };
    Ok(LightCommand::On(color))
}
