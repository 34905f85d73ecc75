//! Reporting payload decoders.
//!
//! A `ReportSetState` response carries the entity schema:
//! ```text
//! ┌──────┬───────────┬────────────────────────────────────┐
//! │ Flag │ Count     │ Entity × Count                     │
//! │ (1)  │ (2B LE)   │ id (2B LE) + data type (1)          │
//! └──────┴───────────┴────────────────────────────────────┘
//! ```
//! A `ReportSendReport` response carries one value per entity, in schema
//! order, after a leading reserved byte. Each value is as wide as its data
//! type and little-endian.

use std::fmt;

use crate::error::{ProtoError, Result};
use crate::kind::MessageKind;
use crate::message::Message;

const COUNT_OFFSET: usize = 1;
const ENTITIES_OFFSET: usize = 3;
const ENTITY_SIZE: usize = 3;
const VALUES_OFFSET: usize = 1;

/// Primitive kind of an entity's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum DataType {
    Float4B = 0x00,
    Int2B = 0x01,
    UInt2B = 0x02,
    Int1B = 0x03,
    UInt1B = 0x04,
    Bool1B = 0x05,
}

impl DataType {
    /// Parse a wire code, if it names a defined kind.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x00 => DataType::Float4B,
            0x01 => DataType::Int2B,
            0x02 => DataType::UInt2B,
            0x03 => DataType::Int1B,
            0x04 => DataType::UInt1B,
            0x05 => DataType::Bool1B,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Width of a value of this kind on the wire.
    pub fn width(self) -> usize {
        match self {
            DataType::Float4B => 4,
            DataType::Int2B | DataType::UInt2B => 2,
            DataType::Int1B | DataType::UInt1B | DataType::Bool1B => 1,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DataType::Float4B => "Float (4 Bytes)",
            DataType::Int2B => "Signed Integer (2 Bytes)",
            DataType::UInt2B => "Unsigned Integer (2 Bytes)",
            DataType::Int1B => "Signed Integer (1 Byte)",
            DataType::UInt1B => "Unsigned Integer (1 Byte)",
            DataType::Bool1B => "Boolean (1 Byte)",
        }
    }

    /// Decode one value of this kind from exactly `self.width()` bytes.
    fn read(self, bytes: &[u8]) -> Reading {
        match self {
            DataType::Float4B => {
                Reading::Float(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            DataType::Int2B => Reading::Int(i16::from_le_bytes([bytes[0], bytes[1]]).into()),
            DataType::UInt2B => Reading::UInt(u16::from_le_bytes([bytes[0], bytes[1]]).into()),
            DataType::Int1B => Reading::Int((bytes[0] as i8).into()),
            DataType::UInt1B => Reading::UInt(bytes[0].into()),
            DataType::Bool1B => Reading::Bool(bytes[0] != 0),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// One slot of the reporting schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    pub id: u16,
    pub data_type: DataType,
}

/// A decoded magnitude, typed by the entity's data type.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Reading {
    Float(f32),
    Int(i32),
    UInt(u32),
    Bool(bool),
}

impl Reading {
    /// The magnitude as a float, for display and arithmetic.
    pub fn as_f64(self) -> f64 {
        match self {
            Reading::Float(v) => v.into(),
            Reading::Int(v) => v.into(),
            Reading::UInt(v) => v.into(),
            Reading::Bool(v) => u8::from(v).into(),
        }
    }

    /// The 4-byte slot representation: float bits, or the integer
    /// sign-extended to 32 bits.
    pub fn to_bits(self) -> u32 {
        match self {
            Reading::Float(v) => v.to_bits(),
            Reading::Int(v) => v as u32,
            Reading::UInt(v) => v,
            Reading::Bool(v) => v.into(),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Float(v) => write!(f, "{v}"),
            Reading::Int(v) => write!(f, "{v}"),
            Reading::UInt(v) => write!(f, "{v}"),
            Reading::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// An entity paired with its observed value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Value {
    pub id: u16,
    pub data_type: DataType,
    pub reading: Reading,
}

impl Value {
    /// The raw 4-byte value slot.
    pub fn raw(&self) -> u32 {
        self.reading.to_bits()
    }
}

/// Reporting protocol generation announced by a `ReportSetState` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingVersion {
    /// Flag byte only, no entity schema.
    V1 = 0x01,
    /// Flag byte followed by an entity schema.
    V2 = 0x02,
}

/// Classify a `ReportSetState` message by payload shape.
pub fn reporting_version(message: &Message) -> Result<ReportingVersion> {
    expect_kind(message, MessageKind::ReportSetState)?;
    if message.payload().len() == 1 {
        Ok(ReportingVersion::V1)
    } else {
        Ok(ReportingVersion::V2)
    }
}

/// Decode the entity schema from a `ReportSetState` message.
///
/// The declared count is bounds-checked against the payload before any
/// record is read.
pub fn parse_entities(message: &Message) -> Result<Vec<Entity>> {
    expect_kind(message, MessageKind::ReportSetState)?;
    let payload = message.payload();

    let count_bytes = slice_at(payload, COUNT_OFFSET, 2)?;
    let count = u16::from_le_bytes([count_bytes[0], count_bytes[1]]) as usize;
    let records = slice_at(payload, ENTITIES_OFFSET, count * ENTITY_SIZE)?;

    let entities = records
        .chunks_exact(ENTITY_SIZE)
        .map(|record| -> Result<Entity> {
            let id = u16::from_le_bytes([record[0], record[1]]);
            let data_type = DataType::from_code(record[2])
                .ok_or(ProtoError::UnknownDataType { id, code: record[2] })?;
            Ok(Entity { id, data_type })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(count = entities.len(), "parsed reporting entities");
    Ok(entities)
}

/// Decode a `ReportSendReport` response against a previously parsed schema.
///
/// Only responses carry values; a request fails with
/// [`ProtoError::UnexpectedMessageType`] before the payload is examined.
pub fn parse_values(message: &Message, entities: &[Entity]) -> Result<Vec<Value>> {
    expect_kind(message, MessageKind::ReportSendReport)?;
    if !message.is_response() {
        return Err(ProtoError::UnexpectedMessageType);
    }

    let payload = message.payload();
    let mut offset = VALUES_OFFSET;
    let mut values = Vec::with_capacity(entities.len());

    for entity in entities {
        let width = entity.data_type.width();
        let bytes = slice_at(payload, offset, width)?;
        values.push(Value {
            id: entity.id,
            data_type: entity.data_type,
            reading: entity.data_type.read(bytes),
        });
        offset += width;
    }

    if offset < payload.len() {
        tracing::debug!(
            unread = payload.len() - offset,
            "report payload longer than schema"
        );
    }

    Ok(values)
}

fn expect_kind(message: &Message, expected: MessageKind) -> Result<()> {
    if message.kind() != expected {
        return Err(ProtoError::UnexpectedMessageKind {
            expected,
            actual: message.kind(),
        });
    }
    Ok(())
}

fn slice_at(payload: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset + len;
    payload
        .get(offset..end)
        .ok_or(ProtoError::TruncatedPayload {
            needed: end,
            available: payload.len(),
        })
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::header::MessageType;

    fn set_state_response(entities: &[(u16, u8)], declared: u16) -> Message {
        let mut payload = BytesMut::new();
        payload.put_u8(0x01);
        payload.put_u16_le(declared);
        for &(id, code) in entities {
            payload.put_u16_le(id);
            payload.put_u8(code);
        }
        Message::new(MessageType::Response, MessageKind::ReportSetState, payload.freeze()).unwrap()
    }

    fn report(msg_type: MessageType, values: &[u8]) -> Message {
        let mut payload = vec![0x00];
        payload.extend_from_slice(values);
        Message::new(msg_type, MessageKind::ReportSendReport, payload).unwrap()
    }

    #[test]
    fn parse_entities_in_wire_order() {
        let msg = set_state_response(&[(1, 0x02), (14, 0x01), (300, 0x00)], 3);
        let entities = parse_entities(&msg).unwrap();
        assert_eq!(
            entities,
            vec![
                Entity {
                    id: 1,
                    data_type: DataType::UInt2B
                },
                Entity {
                    id: 14,
                    data_type: DataType::Int2B
                },
                Entity {
                    id: 300,
                    data_type: DataType::Float4B
                },
            ]
        );
    }

    #[test]
    fn parse_entities_empty_schema() {
        let msg = set_state_response(&[], 0);
        assert!(parse_entities(&msg).unwrap().is_empty());
    }

    #[test]
    fn parse_entities_rejects_overstated_count() {
        let msg = set_state_response(&[(1, 0x04), (2, 0x05)], 10);
        let err = parse_entities(&msg).unwrap_err();
        assert!(matches!(
            err,
            ProtoError::TruncatedPayload {
                needed: 33,
                available: 9
            }
        ));
    }

    #[test]
    fn parse_entities_needs_count_field() {
        // SetState request: flag byte only
        let msg = Message::new(MessageType::Request, MessageKind::ReportSetState, vec![0x01])
            .unwrap();
        let err = parse_entities(&msg).unwrap_err();
        assert!(matches!(err, ProtoError::TruncatedPayload { .. }));
    }

    #[test]
    fn parse_entities_rejects_unknown_data_type() {
        let msg = set_state_response(&[(7, 0x09)], 1);
        let err = parse_entities(&msg).unwrap_err();
        assert!(matches!(
            err,
            ProtoError::UnknownDataType { id: 7, code: 0x09 }
        ));
    }

    #[test]
    fn parse_entities_rejects_other_kinds() {
        let msg = report(MessageType::Response, &[]);
        let err = parse_entities(&msg).unwrap_err();
        assert!(matches!(
            err,
            ProtoError::UnexpectedMessageKind {
                expected: MessageKind::ReportSetState,
                actual: MessageKind::ReportSendReport
            }
        ));
    }

    #[test]
    fn parse_values_reads_full_width() {
        let entities = [
            Entity {
                id: 1,
                data_type: DataType::Float4B,
            },
            Entity {
                id: 2,
                data_type: DataType::Int2B,
            },
            Entity {
                id: 3,
                data_type: DataType::UInt2B,
            },
            Entity {
                id: 4,
                data_type: DataType::Int1B,
            },
            Entity {
                id: 5,
                data_type: DataType::UInt1B,
            },
            Entity {
                id: 6,
                data_type: DataType::Bool1B,
            },
        ];

        let mut data = Vec::new();
        data.extend_from_slice(&87.5f32.to_le_bytes());
        data.extend_from_slice(&(-1234i16).to_le_bytes());
        data.extend_from_slice(&6500u16.to_le_bytes());
        data.push(0xfb); // -5
        data.push(0xc8); // 200
        data.push(0x01);

        let msg = report(MessageType::Response, &data);
        let values = parse_values(&msg, &entities).unwrap();

        let readings: Vec<Reading> = values.iter().map(|v| v.reading).collect();
        assert_eq!(
            readings,
            vec![
                Reading::Float(87.5),
                Reading::Int(-1234),
                Reading::UInt(6500),
                Reading::Int(-5),
                Reading::UInt(200),
                Reading::Bool(true),
            ]
        );
        assert_eq!(values[0].raw(), 87.5f32.to_bits());
        assert_eq!(values[1].raw(), 0xffff_fb2e);
        assert_eq!(values[3].raw(), 0xffff_fffb);
        assert_eq!(values[4].raw(), 200);
        assert_eq!(
            values.iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );
    }

    #[test]
    fn parse_values_rejects_requests() {
        let entities = [Entity {
            id: 1,
            data_type: DataType::UInt1B,
        }];
        let msg = report(MessageType::Request, &[0x01]);
        let err = parse_values(&msg, &entities).unwrap_err();
        assert!(matches!(err, ProtoError::UnexpectedMessageType));

        // Regardless of payload contents
        let msg = report(MessageType::Request, &[]);
        let err = parse_values(&msg, &entities).unwrap_err();
        assert!(matches!(err, ProtoError::UnexpectedMessageType));
    }

    #[test]
    fn parse_values_rejects_short_payload() {
        let entities = [
            Entity {
                id: 1,
                data_type: DataType::UInt2B,
            },
            Entity {
                id: 2,
                data_type: DataType::Float4B,
            },
        ];
        let msg = report(MessageType::Response, &[0x10, 0x00, 0x01]);
        let err = parse_values(&msg, &entities).unwrap_err();
        assert!(matches!(
            err,
            ProtoError::TruncatedPayload {
                needed: 7,
                available: 4
            }
        ));
    }

    #[test]
    fn schema_then_report_over_the_wire() {
        let schema = set_state_response(&[(1, 0x02), (14, 0x03)], 2);
        let schema = Message::from_bytes(&schema.to_bytes()).unwrap();
        let entities = parse_entities(&schema).unwrap();

        let mut data = 3150u16.to_le_bytes().to_vec();
        data.push(0x5a);
        let report = report(MessageType::Response, &data);
        let report = Message::from_bytes(&report.to_bytes()).unwrap();

        let values = parse_values(&report, &entities).unwrap();
        assert_eq!(values[0].reading, Reading::UInt(3150));
        assert_eq!(values[1].reading, Reading::Int(90));
    }

    #[test]
    fn reporting_version_by_payload_shape() {
        let v1 = Message::new(MessageType::Response, MessageKind::ReportSetState, vec![0x01])
            .unwrap();
        assert_eq!(reporting_version(&v1).unwrap(), ReportingVersion::V1);

        let v2 = set_state_response(&[(1, 0x00)], 1);
        assert_eq!(reporting_version(&v2).unwrap(), ReportingVersion::V2);
    }

    #[test]
    fn data_type_widths() {
        for code in 0u8..=5 {
            let data_type = DataType::from_code(code).unwrap();
            assert_eq!(data_type.code(), code);
        }
        assert_eq!(DataType::Float4B.width(), 4);
        assert_eq!(DataType::UInt2B.width(), 2);
        assert_eq!(DataType::Bool1B.width(), 1);
        assert_eq!(DataType::from_code(6), None);
    }

    #[test]
    fn reading_as_f64() {
        assert_eq!(Reading::Int(-3).as_f64(), -3.0);
        assert_eq!(Reading::Bool(true).as_f64(), 1.0);
        assert_eq!(Reading::Float(0.5).as_f64(), 0.5);
    }
}
