//! RVL wave-parameter frames.
//!
//! Pure encode/decode on byte slices, no socket involved. A frame addresses
//! one channel and carries up to [`MAX_WAVES`] layered waves:
//!
//! | Offset | Field | Type |
//! |--------|-------|------|
//! | 0–2 | Magic | `b"RVL"` |
//! | 3 | Version | u8, [`VERSION`] |
//! | 4 | Channel | u8 |
//! | 5 | Wave count | u8, 1..=[`MAX_WAVES`] |
//! | 6.. | Waves | [`WAVE_LEN`] bytes each |
//! | last | Checksum | u8, wrapping sum of every preceding byte |
//!
//! Each wave is `kind, hue, saturation, value, rate`, one byte apiece.

use homelights_app::resolver::{Effect, LightCommand};
use homelights_domain::color::hue_fraction;
use homelights_domain::light::RvlChannel;

pub const MAGIC: &[u8; 3] = b"RVL";
pub const VERSION: u8 = 1;
pub const MAX_WAVES: usize = 4;
pub const WAVE_LEN: usize = 5;

const HEADER_LEN: usize = 6;

/// Animation family of a single wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WaveKind {
    Solid = 0,
    Pulse = 1,
    Rainbow = 2,
    /// A band travelling along the strip.
    Moving = 3,
    ColorCycle = 4,
}

impl WaveKind {
    fn from_byte(byte: u8) -> Result<Self, FrameError> {
        match byte {
            0 => Ok(Self::Solid),
            1 => Ok(Self::Pulse),
            2 => Ok(Self::Rainbow),
            3 => Ok(Self::Moving),
            4 => Ok(Self::ColorCycle),
            other => Err(FrameError::UnknownWaveKind(other)),
        }
    }
}

/// One layer of an RVL animation. Colour components use the full byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wave {
    pub kind: WaveKind,
    pub hue: u8,
    pub saturation: u8,
    pub value: u8,
    pub rate: u8,
}

impl Wave {
    /// The wave that turns a channel dark.
    pub const BLACK: Self = Self {
        kind: WaveKind::Solid,
        hue: 0,
        saturation: 0,
        value: 0,
        rate: 0,
    };
}

/// A decoded or to-be-encoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub channel: u8,
    pub waves: Vec<Wave>,
}

/// Why a byte slice is not a valid frame.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame must be at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("frame does not start with the RVL magic")]
    BadMagic,

    #[error("unsupported frame version {0}")]
    UnsupportedVersion(u8),

    #[error("wave count {0} is outside 1..={MAX_WAVES}")]
    BadWaveCount(u8),

    #[error("frame with {waves} waves must be {expected} bytes, got {actual}")]
    WrongLength {
        waves: u8,
        expected: usize,
        actual: usize,
    },

    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    Checksum { expected: u8, actual: u8 },

    #[error("unknown wave kind {0}")]
    UnknownWaveKind(u8),
}

impl Frame {
    /// Translate a resolved command for `channel` into a frame.
    ///
    /// Every effect is a single wave except [`Effect::Wave`], which layers a
    /// moving band over a pulsing foreground over a solid background.
    #[must_use]
    pub fn from_command(channel: RvlChannel, command: &LightCommand) -> Self {
        let waves = match command {
            LightCommand::Off => vec![Wave::BLACK],
            LightCommand::On(color) => {
                let layer = |kind, hue, rate| Wave {
                    kind,
                    hue,
                    saturation: unit_byte(color.saturation),
                    value: unit_byte(color.brightness),
                    rate,
                };
                let hue = hue_byte(color.hue);
                match color.effect {
                    Effect::Steady => vec![layer(WaveKind::Solid, hue, 0)],
                    Effect::Pulse { rate } => vec![layer(WaveKind::Pulse, hue, rate)],
                    Effect::Rainbow { rate } => vec![layer(WaveKind::Rainbow, hue, rate)],
                    Effect::ColorCycle { rate } => vec![layer(WaveKind::ColorCycle, hue, rate)],
                    Effect::Wave {
                        rate,
                        wave_hue,
                        background_hue,
                    } => vec![
                        layer(WaveKind::Moving, hue_byte(hue_fraction(wave_hue)), rate),
                        layer(WaveKind::Pulse, hue, rate),
                        layer(WaveKind::Solid, hue_byte(hue_fraction(background_hue)), 0),
                    ],
                }
            }
        };
        Self {
            channel: channel.get(),
            waves,
        }
    }

    /// Serialise the frame, appending the checksum.
    ///
    /// Waves beyond [`MAX_WAVES`] are dropped.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let waves = &self.waves[..self.waves.len().min(MAX_WAVES)];
        let mut bytes = Vec::with_capacity(HEADER_LEN + waves.len() * WAVE_LEN + 1);
        bytes.extend_from_slice(MAGIC);
        bytes.push(VERSION);
        bytes.push(self.channel);
        #[allow(clippy::cast_possible_truncation)]
        bytes.push(waves.len() as u8);
        for wave in waves {
            bytes.extend_from_slice(&[
                wave.kind as u8,
                wave.hue,
                wave.saturation,
                wave.value,
                wave.rate,
            ]);
        }
        bytes.push(checksum(&bytes));
        bytes
    }

    /// Parse and verify a frame.
    ///
    /// # Errors
    ///
    /// Returns a [`FrameError`] describing the first check that failed.
    pub fn decode(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() < HEADER_LEN + 1 {
            return Err(FrameError::TooShort {
                expected: HEADER_LEN + 1,
                actual: data.len(),
            });
        }
        if &data[0..3] != MAGIC {
            return Err(FrameError::BadMagic);
        }
        if data[3] != VERSION {
            return Err(FrameError::UnsupportedVersion(data[3]));
        }

        let count = data[5];
        if count == 0 || usize::from(count) > MAX_WAVES {
            return Err(FrameError::BadWaveCount(count));
        }
        let expected = HEADER_LEN + usize::from(count) * WAVE_LEN + 1;
        if data.len() != expected {
            return Err(FrameError::WrongLength {
                waves: count,
                expected,
                actual: data.len(),
            });
        }

        let (body, trailer) = data.split_at(data.len() - 1);
        let computed = checksum(body);
        if computed != trailer[0] {
            return Err(FrameError::Checksum {
                expected: computed,
                actual: trailer[0],
            });
        }

        let waves = body[HEADER_LEN..]
            .chunks_exact(WAVE_LEN)
            .map(|w| {
                Ok(Wave {
                    kind: WaveKind::from_byte(w[0])?,
                    hue: w[1],
                    saturation: w[2],
                    value: w[3],
                    rate: w[4],
                })
            })
            .collect::<Result<Vec<_>, FrameError>>()?;

        Ok(Self {
            channel: data[4],
            waves,
        })
    }
}

fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// `[0, 1)` hue fraction to the RVL hue wheel (`0..=255`).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hue_byte(hue: f64) -> u8 {
    (hue * 256.0).floor().clamp(0.0, 255.0) as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_byte(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
