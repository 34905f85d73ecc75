use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::{self, Checksum};
use crate::error::{ProtoError, Result};
use crate::header::{
    validate, MessageClass, MessageType, CHECKSUM_SIZE, CHECKSUM_START, HEADER_SIZE, MAGIC,
};
use crate::kind::{command_name, resolve, MessageKind};

/// Largest payload the 2-byte length field can describe.
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// A validated protocol message with an owned payload.
///
/// Wire format:
/// ```text
/// ┌───────────┬──────────┬──────┬───────┬─────────┬──────────────┬────────────┐
/// │ Magic (2) │ Len (2)  │ Type │ Class │ Command │ Payload      │ Checksum   │
/// │ "ME"      │ LE       │ (1)  │ (1)   │ (1)     │ (Len bytes)  │ (2, LE)    │
/// └───────────┴──────────┴──────┴───────┴─────────┴──────────────┴────────────┘
/// ```
/// The checksum covers type, class, command and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    kind: MessageKind,
    msg_type: MessageType,
    class: MessageClass,
    command: u8,
    payload: Bytes,
    checksum: u16,
}

impl Message {
    /// Build a message from caller-supplied fields.
    ///
    /// The (class, command) pair is resolved before anything else, so an
    /// unregistered pair fails with [`ProtoError::UnknownMessageType`].
    pub fn create(
        msg_type: MessageType,
        class: MessageClass,
        command: u8,
        payload: impl Into<Bytes>,
    ) -> Result<Self> {
        let kind = resolve(class, command).ok_or(ProtoError::UnknownMessageType {
            class: class.as_u8(),
            command,
        })?;
        Self::new(msg_type, kind, payload)
    }

    /// Build a message of a known variant.
    pub fn new(msg_type: MessageType, kind: MessageKind, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ProtoError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }
        Ok(Self::assemble(msg_type, kind, payload))
    }

    /// Callers guarantee the payload fits the length field.
    pub(crate) fn assemble(msg_type: MessageType, kind: MessageKind, payload: Bytes) -> Self {
        let class = kind.class();
        let command = kind.command();
        let checksum = canonical_checksum(msg_type, class, command, &payload);
        Self {
            kind,
            msg_type,
            class,
            command,
            payload,
            checksum,
        }
    }

    /// Decode a message from its wire bytes.
    ///
    /// The payload is copied out of `buf`; the returned message never borrows
    /// from the input. Bytes after the checksum are ignored.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let header = validate(buf)?;

        let kind = resolve(header.class, header.command).ok_or(ProtoError::UnknownMessageType {
            class: header.class.as_u8(),
            command: header.command,
        })?;

        let offset = header.checksum_offset();
        let payload = Bytes::copy_from_slice(&buf[HEADER_SIZE..offset]);
        let checksum = u16::from_le_bytes([buf[offset], buf[offset + 1]]);

        tracing::trace!(
            kind = %kind,
            msg_type = %header.msg_type,
            payload_len = header.payload_len,
            "decoded message"
        );

        Ok(Self {
            kind,
            msg_type: header.msg_type,
            class: header.class,
            command: header.command,
            payload,
            checksum,
        })
    }

    /// Decode a message from its hexadecimal wire form.
    pub fn from_hex(text: &str) -> Result<Self> {
        let bytes = hex::decode(text.trim())?;
        Self::from_bytes(&bytes)
    }

    /// Append the wire encoding to `dst` and return the checksum written.
    ///
    /// The checksum is recomputed from the bytes just written.
    pub fn encode_into(&self, dst: &mut BytesMut) -> u16 {
        let start = dst.len();
        dst.reserve(self.wire_size());
        dst.put_slice(&MAGIC);
        dst.put_u16_le(self.payload_len());
        dst.put_u8(self.msg_type.as_u8());
        dst.put_u8(self.class.as_u8());
        dst.put_u8(self.command);
        dst.put_slice(&self.payload);

        let checksum = checksum::compute(&dst[start + CHECKSUM_START..]);
        dst.put_u16_le(checksum);
        checksum
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        self.encode_into(&mut buf);
        buf.freeze()
    }

    /// Lowercase hexadecimal wire form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn msg_type(&self) -> MessageType {
        self.msg_type
    }

    pub fn class(&self) -> MessageClass {
        self.class
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_len(&self) -> u16 {
        // Bounded by MAX_PAYLOAD_LEN on every construction path.
        self.payload.len() as u16
    }

    /// The checksum read from the wire, or computed at construction.
    pub fn checksum(&self) -> u16 {
        self.checksum
    }

    pub fn is_response(&self) -> bool {
        self.msg_type == MessageType::Response
    }

    /// The total wire size of this message (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + CHECKSUM_SIZE
    }

    /// Consume the message and return its payload.
    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(type: {}, class: {}, command: {}, len: {})",
            self.kind,
            self.msg_type,
            self.class,
            command_name(self.class, self.command),
            self.payload.len()
        )
    }
}

fn canonical_checksum(
    msg_type: MessageType,
    class: MessageClass,
    command: u8,
    payload: &[u8],
) -> u16 {
    let mut checksum = Checksum::new();
    checksum.update(&[msg_type.as_u8(), class.as_u8(), command]);
    checksum.update(payload);
    checksum.finish()
}
