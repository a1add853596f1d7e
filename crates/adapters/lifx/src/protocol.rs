//! LIFX LAN protocol codec.
//!
//! Pure functions on byte slices. Every packet is a 36-byte little-endian
//! header followed by a message-specific payload:
//!
//! | Offset | Field | Type |
//! |--------|-------|------|
//! | 0–1 | Size | u16, header + payload |
//! | 2–3 | Protocol / flags | u16: protocol 1024 in bits 0–11, addressable bit 12, tagged bit 13 |
//! | 4–7 | Source | u32, echoed back in replies |
//! | 8–15 | Target | 6-byte MAC + 2 zero bytes, all zero when broadcasting |
//! | 16–21 | Reserved | |
//! | 22 | Response flags | bit 0 `res_required`, bit 1 `ack_required` |
//! | 23 | Sequence | u8 |
//! | 24–31 | Reserved | |
//! | 32–33 | Message type | u16 |
//! | 34–35 | Reserved | |

use std::fmt;

pub const HEADER_LEN: usize = 36;
pub const PROTOCOL: u16 = 1024;
const ADDRESSABLE: u16 = 1 << 12;
const TAGGED: u16 = 1 << 13;
const RES_REQUIRED: u8 = 1;
const ACK_REQUIRED: u8 = 1 << 1;

pub const GET_SERVICE: u16 = 2;
pub const STATE_SERVICE: u16 = 3;
pub const GET_LABEL: u16 = 23;
pub const STATE_LABEL: u16 = 25;
pub const ACKNOWLEDGEMENT: u16 = 45;
pub const SET_COLOR: u16 = 102;
pub const SET_LIGHT_POWER: u16 = 117;

/// Service id advertised in `StateService` for the UDP control service.
pub const SERVICE_UDP: u8 = 1;
/// Fixed label field width.
pub const LABEL_LEN: usize = 32;

/// A device MAC address, as carried in the header's target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mac(pub [u8; 6]);

impl fmt::Display for Mac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Hue, saturation, brightness and kelvin, each on the full `u16` scale
/// except kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsbk {
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
}

/// The subset of LAN messages the backend speaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    GetService,
    StateService { service: u8, port: u32 },
    GetLabel,
    StateLabel { label: String },
    Acknowledgement,
    /// `duration` in milliseconds.
    SetColor { color: Hsbk, duration: u32 },
    SetLightPower { level: u16, duration: u32 },
}

impl Message {
    #[must_use]
    pub fn message_type(&self) -> u16 {
        match self {
            Self::GetService => GET_SERVICE,
            Self::StateService { .. } => STATE_SERVICE,
            Self::GetLabel => GET_LABEL,
            Self::StateLabel { .. } => STATE_LABEL,
            Self::Acknowledgement => ACKNOWLEDGEMENT,
            Self::SetColor { .. } => SET_COLOR,
            Self::SetLightPower { .. } => SET_LIGHT_POWER,
        }
    }

    fn payload_len(message_type: u16) -> Option<usize> {
        match message_type {
            GET_SERVICE | GET_LABEL | ACKNOWLEDGEMENT => Some(0),
            STATE_SERVICE => Some(5),
            STATE_LABEL => Some(LABEL_LEN),
            SET_COLOR => Some(13),
            SET_LIGHT_POWER => Some(6),
            _ => None,
        }
    }

    fn encode_payload(&self, out: &mut Vec<u8>) {
        match self {
            Self::GetService | Self::GetLabel | Self::Acknowledgement => {}
            Self::StateService { service, port } => {
                out.push(*service);
                out.extend_from_slice(&port.to_le_bytes());
            }
            Self::StateLabel { label } => {
                let mut field = [0u8; LABEL_LEN];
                let bytes = label.as_bytes();
                let len = bytes.len().min(LABEL_LEN);
                field[..len].copy_from_slice(&bytes[..len]);
                out.extend_from_slice(&field);
            }
            Self::SetColor { color, duration } => {
                out.push(0);
                out.extend_from_slice(&color.hue.to_le_bytes());
                out.extend_from_slice(&color.saturation.to_le_bytes());
                out.extend_from_slice(&color.brightness.to_le_bytes());
                out.extend_from_slice(&color.kelvin.to_le_bytes());
                out.extend_from_slice(&duration.to_le_bytes());
            }
            Self::SetLightPower { level, duration } => {
                out.extend_from_slice(&level.to_le_bytes());
                out.extend_from_slice(&duration.to_le_bytes());
            }
        }
    }

    fn decode_payload(message_type: u16, p: &[u8]) -> Option<Self> {
        let u16_at = |i: usize| u16::from_le_bytes([p[i], p[i + 1]]);
        let u32_at = |i: usize| u32::from_le_bytes([p[i], p[i + 1], p[i + 2], p[i + 3]]);
        let message = match message_type {
            GET_SERVICE => Self::GetService,
            STATE_SERVICE => Self::StateService {
                service: p[0],
                port: u32_at(1),
            },
            GET_LABEL => Self::GetLabel,
            STATE_LABEL => {
                let end = p.iter().position(|b| *b == 0).unwrap_or(p.len());
                Self::StateLabel {
                    label: String::from_utf8_lossy(&p[..end]).into_owned(),
                }
            }
            ACKNOWLEDGEMENT => Self::Acknowledgement,
            SET_COLOR => Self::SetColor {
                color: Hsbk {
                    hue: u16_at(1),
                    saturation: u16_at(3),
                    brightness: u16_at(5),
                    kelvin: u16_at(7),
                },
                duration: u32_at(9),
            },
            SET_LIGHT_POWER => Self::SetLightPower {
                level: u16_at(0),
                duration: u32_at(2),
            },
            _ => return None,
        };
        Some(message)
    }
}

/// One LAN protocol packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub source: u32,
    /// `None` addresses every device (the packet is sent tagged).
    pub target: Option<Mac>,
    pub sequence: u8,
    pub ack_required: bool,
    pub res_required: bool,
    pub message: Message,
}

/// Why a datagram is not a packet this codec understands.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("packet must be at least {HEADER_LEN} bytes, got {0}")]
    TooShort(usize),

    #[error("header declares {declared} bytes but datagram has {actual}")]
    SizeMismatch { declared: usize, actual: usize },

    #[error("unsupported protocol number {0}")]
    UnsupportedProtocol(u16),

    #[error("unknown message type {0}")]
    UnknownType(u16),

    #[error("message type {message_type} needs a {expected}-byte payload, got {actual}")]
    PayloadLength {
        message_type: u16,
        expected: usize,
        actual: usize,
    },
}

impl Packet {
    /// A broadcast packet from `source`.
    #[must_use]
    pub fn broadcast(source: u32, message: Message) -> Self {
        Self {
            source,
            target: None,
            sequence: 0,
            ack_required: false,
            res_required: false,
            message,
        }
    }

    /// A packet for one device.
    #[must_use]
    pub fn to_device(source: u32, target: Mac, sequence: u8, message: Message) -> Self {
        Self {
            source,
            target: Some(target),
            sequence,
            ack_required: false,
            res_required: false,
            message,
        }
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        self.message.encode_payload(&mut payload);
        let size = u16::try_from(HEADER_LEN + payload.len()).unwrap_or(u16::MAX);

        let mut flags = PROTOCOL | ADDRESSABLE;
        if self.target.is_none() {
            flags |= TAGGED;
        }
        let mut response = 0u8;
        if self.res_required {
            response |= RES_REQUIRED;
        }
        if self.ack_required {
            response |= ACK_REQUIRED;
        }

        let mut out = Vec::with_capacity(usize::from(size));
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&flags.to_le_bytes());
        out.extend_from_slice(&self.source.to_le_bytes());
        out.extend_from_slice(&self.target.map_or([0; 6], |mac| mac.0));
        out.extend_from_slice(&[0; 2]);
        out.extend_from_slice(&[0; 6]);
        out.push(response);
        out.push(self.sequence);
        out.extend_from_slice(&[0; 8]);
        out.extend_from_slice(&self.message.message_type().to_le_bytes());
        out.extend_from_slice(&[0; 2]);
        out.extend_from_slice(&payload);
        out
    }

    /// # Errors
    ///
    /// Returns a [`ProtocolError`] for truncated datagrams, foreign
    /// protocols and message types this codec does not handle.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < HEADER_LEN {
            return Err(ProtocolError::TooShort(data.len()));
        }
        let declared = usize::from(u16::from_le_bytes([data[0], data[1]]));
        if declared != data.len() {
            return Err(ProtocolError::SizeMismatch {
                declared,
                actual: data.len(),
            });
        }
        let flags = u16::from_le_bytes([data[2], data[3]]);
        let protocol = flags & 0x0FFF;
        if protocol != PROTOCOL {
            return Err(ProtocolError::UnsupportedProtocol(protocol));
        }

        let source = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        let mut mac = [0u8; 6];
        mac.copy_from_slice(&data[8..14]);
        let target = (mac != [0; 6]).then_some(Mac(mac));
        let response = data[22];
        let sequence = data[23];
        let message_type = u16::from_le_bytes([data[32], data[33]]);

        let expected = Message::payload_len(message_type)
            .ok_or(ProtocolError::UnknownType(message_type))?;
        let payload = &data[HEADER_LEN..];
        if payload.len() != expected {
            return Err(ProtocolError::PayloadLength {
                message_type,
                expected,
                actual: payload.len(),
            });
        }

        Ok(Self {
            source,
            target,
            sequence,
            ack_required: response & ACK_REQUIRED != 0,
            res_required: response & RES_REQUIRED != 0,
            message: Message::decode_payload(message_type, payload)
                .ok_or(ProtocolError::UnknownType(message_type))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAC: Mac = Mac([0xd0, 0x73, 0xd5, 0x01, 0x02, 0x03]);

    #[test]
    fn should_format_mac_as_lowercase_hex() {
        assert_eq!(MAC.to_string(), "d0:73:d5:01:02:03");
    }

    #[test]
    fn should_encode_tagged_get_service_header() {
        let bytes = Packet::broadcast(0x1234_5678, Message::GetService).encode();

        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(u16::from_le_bytes([bytes[0], bytes[1]]), 36);
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 0x3400);
        assert_eq!(&bytes[4..8], &0x1234_5678u32.to_le_bytes());
        assert_eq!(&bytes[8..16], &[0; 8]);
        assert_eq!(u16::from_le_bytes([bytes[32], bytes[33]]), GET_SERVICE);
    }

    #[test]
    fn should_encode_addressed_set_color() {
        let packet = Packet::to_device(
            7,
            MAC,
            9,
            Message::SetColor {
                color: Hsbk {
                    hue: 0x8000,
                    saturation: 0xFFFF,
                    brightness: 0x1234,
                    kelvin: 3500,
                },
                duration: 250,
            },
        );

        let bytes = packet.encode();

        assert_eq!(bytes.len(), HEADER_LEN + 13);
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 0x1400);
        assert_eq!(&bytes[8..14], &MAC.0);
        assert_eq!(bytes[23], 9);
        assert_eq!(
            &bytes[HEADER_LEN..],
            &[0, 0x00, 0x80, 0xFF, 0xFF, 0x34, 0x12, 0xAC, 0x0D, 0xFA, 0, 0, 0]
        );
    }

    #[test]
    fn should_decode_state_service_reply() {
        let reply = Packet::to_device(
            42,
            MAC,
            0,
            Message::StateService {
                service: SERVICE_UDP,
                port: 56700,
            },
        );

        let decoded = Packet::decode(&reply.encode()).unwrap();

        assert_eq!(decoded.target, Some(MAC));
        assert_eq!(decoded.source, 42);
        assert_eq!(
            decoded.message,
            Message::StateService {
                service: 1,
                port: 56700
            }
        );
    }

    #[test]
    fn should_trim_label_padding() {
        let reply = Packet::to_device(
            1,
            MAC,
            0,
            Message::StateLabel {
                label: "Kitchen".to_string(),
            },
        );
        let bytes = reply.encode();
        assert_eq!(bytes.len(), HEADER_LEN + LABEL_LEN);

        let decoded = Packet::decode(&bytes).unwrap();

        assert_eq!(
            decoded.message,
            Message::StateLabel {
                label: "Kitchen".to_string()
            }
        );
    }

    #[test]
    fn should_carry_response_flags() {
        let mut packet = Packet::to_device(1, MAC, 3, Message::GetLabel);
        packet.res_required = true;

        let bytes = packet.encode();
        assert_eq!(bytes[22], 1);

        let decoded = Packet::decode(&bytes).unwrap();
        assert!(decoded.res_required);
        assert!(!decoded.ack_required);
    }

    #[test]
    fn should_reject_truncated_datagram() {
        assert_eq!(Packet::decode(&[0; 10]), Err(ProtocolError::TooShort(10)));
    }

    #[test]
    fn should_reject_size_mismatch() {
        let mut bytes = Packet::broadcast(1, Message::GetService).encode();
        bytes.push(0);
        assert_eq!(
            Packet::decode(&bytes),
            Err(ProtocolError::SizeMismatch {
                declared: 36,
                actual: 37
            })
        );
    }

    #[test]
    fn should_reject_foreign_protocol() {
        let mut bytes = Packet::broadcast(1, Message::GetService).encode();
        bytes[2] = 0x00;
        bytes[3] = 0x30;
        assert_eq!(
            Packet::decode(&bytes),
            Err(ProtocolError::UnsupportedProtocol(0))
        );
    }

    #[test]
    fn should_reject_unknown_message_type() {
        let mut bytes = Packet::broadcast(1, Message::GetService).encode();
        bytes[32] = 0xFF;
        assert_eq!(
            Packet::decode(&bytes),
            Err(ProtocolError::UnknownType(0xFF))
        );
    }
}
