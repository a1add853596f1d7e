//! Bridge wire types and the pure conversions onto them.
//!
//! The bridge wraps results in `[{"success": ...}]` / `[{"error": ...}]`
//! arrays, including on endpoints whose success body is a plain object.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use homelights_app::resolver::LightCommand;

use crate::error::HueError;

/// Highest value of the bridge's `bri` and `sat` scales.
pub const MAX_LEVEL: u8 = 254;
/// Highest value of the bridge's `hue` scale.
pub const MAX_HUE: u16 = 65535;
/// Colour temperature range accepted by Hue bulbs, in mireds.
pub const MIN_MIREDS: u16 = 153;
pub const MAX_MIREDS: u16 = 500;

/// One entry of the N-UPnP discovery response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscoveredBridge {
    pub id: String,
    #[serde(rename = "internalipaddress")]
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct PairRequest<'a> {
    pub devicetype: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct Paired {
    pub username: String,
}

/// Light description from `GET /api/<user>/lights`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LightInfo {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Outcome<T> {
    Success(T),
    Error(ApiErrorBody),
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: u16,
    #[serde(default)]
    description: String,
}

/// Body of `PUT /api/<user>/lights/<id>/state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightState {
    pub on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sat: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ct: Option<u16>,
    /// In deciseconds.
    pub transitiontime: u16,
}

impl LightState {
    /// Map a resolved command onto the bridge's scales.
    ///
    /// A zero brightness switches the light off, since `bri` bottoms out
    /// at a visible 1. Temperature colours are sent as `ct` and leave hue
    /// and saturation untouched.
    #[must_use]
    pub fn from_command(command: &LightCommand, transition: Duration) -> Self {
        let transitiontime = deciseconds(transition);
        let off = Self {
            on: false,
            bri: None,
            hue: None,
            sat: None,
            ct: None,
            transitiontime,
        };
        let LightCommand::On(color) = command else {
            return off;
        };
        let bri = level(color.brightness);
        if bri == 0 {
            return off;
        }
        match color.kelvin {
            Some(kelvin) => Self {
                on: true,
                bri: Some(bri),
                hue: None,
                sat: None,
                ct: Some(mireds(kelvin)),
                transitiontime,
            },
            None => Self {
                on: true,
                bri: Some(bri),
                hue: Some(hue(color.hue)),
                sat: Some(level(color.saturation)),
                ct: None,
                transitiontime,
            },
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn level(fraction: f64) -> u8 {
    (fraction * f64::from(MAX_LEVEL)).round().clamp(0.0, f64::from(MAX_LEVEL)) as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hue(fraction: f64) -> u16 {
    (fraction * f64::from(MAX_HUE)).round().clamp(0.0, f64::from(MAX_HUE)) as u16
}

/// Kelvin to mireds, clamped to what the bulbs accept.
#[must_use]
pub fn mireds(kelvin: u16) -> u16 {
    let mireds = 1_000_000 / u32::from(kelvin.max(1));
    u16::try_from(mireds)
        .unwrap_or(MAX_MIREDS)
        .clamp(MIN_MIREDS, MAX_MIREDS)
}

fn deciseconds(transition: Duration) -> u16 {
    u16::try_from((transition.as_millis() + 50) / 100).unwrap_or(u16::MAX)
}

/// Return the first error object of an envelope array, if any.
fn envelope_error(value: &Value) -> Option<HueError> {
    value.as_array()?.iter().find_map(|entry| {
        let body = entry.get("error")?;
        let body: ApiErrorBody = serde_json::from_value(body.clone()).ok()?;
        Some(HueError::from_api(body.kind, body.description))
    })
}

/// Parse the answer to `POST /api`.
///
/// # Errors
///
/// Returns the bridge's error ([`HueError::LinkButtonNotPressed`] when the
/// button has not been pressed), or [`HueError::UnexpectedResponse`].
pub fn parse_pairing(value: Value) -> Result<String, HueError> {
    let outcomes: Vec<Outcome<Paired>> = serde_json::from_value(value)
        .map_err(|err| HueError::UnexpectedResponse(err.to_string()))?;
    match outcomes.into_iter().next() {
        Some(Outcome::Success(paired)) => Ok(paired.username),
        Some(Outcome::Error(body)) => Err(HueError::from_api(body.kind, body.description)),
        None => Err(HueError::UnexpectedResponse("empty pairing response".to_string())),
    }
}

/// Parse the answer to `GET /api/<user>/lights`, keyed by bridge light id.
///
/// # Errors
///
/// Returns the bridge's error or [`HueError::UnexpectedResponse`].
pub fn parse_lights(value: Value) -> Result<BTreeMap<String, LightInfo>, HueError> {
    if let Some(err) = envelope_error(&value) {
        return Err(err);
    }
    serde_json::from_value(value).map_err(|err| HueError::UnexpectedResponse(err.to_string()))
}

/// Check the answer to a state update.
///
/// # Errors
///
/// Returns the first error the bridge reported.
pub fn parse_state_update(value: &Value) -> Result<(), HueError> {
    match envelope_error(value) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
