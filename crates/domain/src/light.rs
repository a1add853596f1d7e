//! Light: A single physical lamp driven by one backend.
//!
//! Lights share `{ id, name, zone_id }` and carry backend-specific data in
//! [`LightKind`]. Adding a backend means adding a variant here, and every
//! exhaustive `match` on it will point at the code that must learn about it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LightsError, ValidationError};
use crate::id::{LightId, ZoneId};
use crate::pattern::PatternType;

/// Number of addressable RVL channels.
pub const NUM_RVL_CHANNELS: u8 = 8;

/// Device family a light belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightType {
    Rvl,
    PhilipsHue,
    Lifx,
}

impl LightType {
    /// Every backend, in a stable order.
    pub const ALL: [Self; 3] = [Self::Rvl, Self::PhilipsHue, Self::Lifx];

    /// The tag used in storage and on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rvl => "rvl",
            Self::PhilipsHue => "philips-hue",
            Self::Lifx => "lifx",
        }
    }

    /// Parse a storage tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Pattern types lights of this family can render.
    #[must_use]
    pub fn supported_patterns(self) -> &'static [PatternType] {
        match self {
            Self::Rvl => &[
                PatternType::Solid,
                PatternType::Pulse,
                PatternType::Rainbow,
                PatternType::Wave,
                PatternType::ColorCycle,
            ],
            Self::PhilipsHue | Self::Lifx => &[PatternType::Solid],
        }
    }
}

impl fmt::Display for LightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated RVL channel in `0..NUM_RVL_CHANNELS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct RvlChannel(u8);

impl RvlChannel {
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Iterate over every valid channel.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..NUM_RVL_CHANNELS).map(Self)
    }

    /// Validate a channel that arrived as an arbitrary JSON number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidChannel`] for non-integers and
    /// values outside `0..NUM_RVL_CHANNELS`. Integral floats such as `3.0`
    /// are accepted.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_number(number: &serde_json::Number) -> Result<Self, ValidationError> {
        number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && (0.0..f64::from(NUM_RVL_CHANNELS)).contains(f))
                    .map(|f| f as i64)
            })
            .ok_or_else(|| ValidationError::InvalidChannel(number.to_string()))
            .and_then(Self::try_from)
    }
}

impl TryFrom<i64> for RvlChannel {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|channel| *channel < NUM_RVL_CHANNELS)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidChannel(value.to_string()))
    }
}

impl From<RvlChannel> for u8 {
    fn from(channel: RvlChannel) -> Self {
        channel.0
    }
}

impl fmt::Display for RvlChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Backend-specific light data, tagged by backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LightKind {
    Rvl { channel: RvlChannel },
    PhilipsHue { philips_hue_id: String },
    Lifx { lifx_id: String },
}

impl LightKind {
    #[must_use]
    pub fn light_type(&self) -> LightType {
        match self {
            Self::Rvl { .. } => LightType::Rvl,
            Self::PhilipsHue { .. } => LightType::PhilipsHue,
            Self::Lifx { .. } => LightType::Lifx,
        }
    }

    /// The identifier the backend itself uses for this device.
    #[must_use]
    pub fn native_id(&self) -> String {
        match self {
            Self::Rvl { channel } => channel.to_string(),
            Self::PhilipsHue { philips_hue_id } => philips_hue_id.clone(),
            Self::Lifx { lifx_id } => lifx_id.clone(),
        }
    }

    /// Build the variant for `kind` from a backend-native id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyNativeId`] for an empty id and
    /// [`ValidationError::InvalidChannel`] for RVL ids that are not a channel.
    pub fn from_native_id(kind: LightType, native_id: &str) -> Result<Self, ValidationError> {
        if native_id.is_empty() {
            return Err(ValidationError::EmptyNativeId);
        }
        Ok(match kind {
            LightType::Rvl => {
                let channel = native_id
                    .parse::<i64>()
                    .map_err(|_| ValidationError::InvalidChannel(native_id.to_string()))?;
                Self::Rvl {
                    channel: RvlChannel::try_from(channel)?,
                }
            }
            LightType::PhilipsHue => Self::PhilipsHue {
                philips_hue_id: native_id.to_string(),
            },
            LightType::Lifx => Self::Lifx {
                lifx_id: native_id.to_string(),
            },
        })
    }
}

/// A light as persisted in the store of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Light {
    pub id: LightId,
    pub name: String,
    pub zone_id: Option<ZoneId>,
    pub kind: LightKind,
}

impl Light {
    /// Create a builder for constructing a [`Light`].
    #[must_use]
    pub fn builder() -> LightBuilder {
        LightBuilder::default()
    }

    #[must_use]
    pub fn light_type(&self) -> LightType {
        self.kind.light_type()
    }

    #[must_use]
    pub fn native_id(&self) -> String {
        self.kind.native_id()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] when `name` or the native id is empty.
    pub fn validate(&self) -> Result<(), LightsError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        match &self.kind {
            LightKind::Rvl { .. } => {}
            LightKind::PhilipsHue { philips_hue_id: id } | LightKind::Lifx { lifx_id: id } => {
                if id.is_empty() {
                    return Err(ValidationError::EmptyNativeId.into());
                }
            }
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Light`].
#[derive(Debug, Default)]
pub struct LightBuilder {
    id: Option<LightId>,
    name: Option<String>,
    zone_id: Option<ZoneId>,
    kind: Option<LightKind>,
}

impl LightBuilder {
    #[must_use]
    pub fn id(mut self, id: LightId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn zone_id(mut self, zone_id: ZoneId) -> Self {
        self.zone_id = Some(zone_id);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: LightKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn rvl(self, channel: RvlChannel) -> Self {
        self.kind(LightKind::Rvl { channel })
    }

    #[must_use]
    pub fn philips_hue(self, philips_hue_id: impl Into<String>) -> Self {
        self.kind(LightKind::PhilipsHue {
            philips_hue_id: philips_hue_id.into(),
        })
    }

    #[must_use]
    pub fn lifx(self, lifx_id: impl Into<String>) -> Self {
        self.kind(LightKind::Lifx {
            lifx_id: lifx_id.into(),
        })
    }

    /// Consume the builder, validate, and return a [`Light`].
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Validation`] if `name` or the backend kind is
    /// missing or invalid.
    pub fn build(self) -> Result<Light, LightsError> {
        let kind = self.kind.ok_or(ValidationError::EmptyNativeId)?;
        let light = Light {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            zone_id: self.zone_id,
            kind,
        };
        light.validate()?;
        Ok(light)
    }
}
