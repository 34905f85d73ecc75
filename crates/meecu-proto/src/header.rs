use std::fmt;

use crate::checksum;
use crate::error::{ProtoError, Result};

/// Header: magic (2) + length (2) + type (1) + class (1) + command (1) = 7 bytes.
pub const HEADER_SIZE: usize = 7;

/// Trailing checksum: 2 bytes, low byte first.
pub const CHECKSUM_SIZE: usize = 2;

/// Magic bytes: "ME" (0x4d 0x45).
pub const MAGIC: [u8; 2] = [0x4d, 0x45];

/// Offset of the first byte covered by the checksum (the type byte).
pub const CHECKSUM_START: usize = 4;

/// Direction of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum MessageType {
    Request = 0x00,
    Response = 0x0f,
}

impl MessageType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageType::Request => "Request",
            MessageType::Response => "Response",
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = ProtoError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(MessageType::Request),
            0x0f => Ok(MessageType::Response),
            other => Err(ProtoError::InvalidType(other)),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Command category. Scopes the meaning of the command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum MessageClass {
    Reporting = 0x00,
    Tables = 0x01,
    Drivers = 0x02,
    Datalinks = 0x03,
    System = 0x04,
    FirmwareUpdate = 0x05,
    DataLog = 0x06,
    TriggerLog = 0x07,
    Dbw = 0x08,
}

impl MessageClass {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageClass::Reporting => "Reporting",
            MessageClass::Tables => "Tables",
            MessageClass::Drivers => "Drivers",
            MessageClass::Datalinks => "Datalinks",
            MessageClass::System => "System",
            MessageClass::FirmwareUpdate => "Firmware Update",
            MessageClass::DataLog => "Data Log",
            MessageClass::TriggerLog => "Trigger Log",
            MessageClass::Dbw => "DBW",
        }
    }
}

impl TryFrom<u8> for MessageClass {
    type Error = ProtoError;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            0x00 => MessageClass::Reporting,
            0x01 => MessageClass::Tables,
            0x02 => MessageClass::Drivers,
            0x03 => MessageClass::Datalinks,
            0x04 => MessageClass::System,
            0x05 => MessageClass::FirmwareUpdate,
            0x06 => MessageClass::DataLog,
            0x07 => MessageClass::TriggerLog,
            0x08 => MessageClass::Dbw,
            other => return Err(ProtoError::InvalidClass(other)),
        })
    }
}

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The fixed preamble of every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Number of payload bytes, excluding the trailing checksum.
    pub payload_len: u16,
    pub msg_type: MessageType,
    pub class: MessageClass,
    pub command: u8,
}

impl Header {
    /// Extract the header fields from the start of `buf`.
    ///
    /// Checks magic, type, and class in that order. The checksum is not
    /// examined; see [`validate`].
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(ProtoError::TruncatedPayload {
                needed: HEADER_SIZE,
                available: buf.len(),
            });
        }

        if buf[0..2] != MAGIC {
            return Err(ProtoError::InvalidMagic);
        }

        let payload_len = u16::from_le_bytes([buf[2], buf[3]]);
        let msg_type = MessageType::try_from(buf[4])?;
        let class = MessageClass::try_from(buf[5])?;

        Ok(Self {
            payload_len,
            msg_type,
            class,
            command: buf[6],
        })
    }

    /// Total wire size of a message with this header (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload_len as usize + CHECKSUM_SIZE
    }

    /// Offset of the stored checksum within the message.
    pub fn checksum_offset(&self) -> usize {
        HEADER_SIZE + self.payload_len as usize
    }
}

/// Validate a complete wire message and return its header.
///
/// Failures are reported in a fixed order: magic, type, class, truncation,
/// then checksum. Bytes after the stored checksum are not examined.
pub fn validate(buf: &[u8]) -> Result<Header> {
    let header = Header::parse(buf)?;

    let needed = header.wire_size();
    if buf.len() < needed {
        return Err(ProtoError::TruncatedPayload {
            needed,
            available: buf.len(),
        });
    }

    let offset = header.checksum_offset();
    let stored = u16::from_le_bytes([buf[offset], buf[offset + 1]]);
    let computed = checksum::compute(&buf[CHECKSUM_START..offset]);
    if stored != computed {
        return Err(ProtoError::ChecksumMismatch {
            expected: stored,
            actual: computed,
        });
    }

    Ok(header)
}
