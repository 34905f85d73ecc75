use crate::kind::MessageKind;

/// Errors that can occur while validating, decoding, or encoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// The message does not start with the "ME" marker.
    #[error("invalid message magic (expected 0x4d45 \"ME\")")]
    InvalidMagic,

    /// The type byte is neither request (0x00) nor response (0x0f).
    #[error("invalid message type 0x{0:02x}")]
    InvalidType(u8),

    /// The class byte is outside the defined categories.
    #[error("invalid message class 0x{0:02x}")]
    InvalidClass(u8),

    /// The stored checksum does not match the one computed over the message.
    #[error("checksum mismatch (stored 0x{expected:04x}, computed 0x{actual:04x})")]
    ChecksumMismatch { expected: u16, actual: u16 },

    /// No message variant is registered for the (class, command) pair.
    #[error("unknown message type (class 0x{class:02x}, command 0x{command:02x})")]
    UnknownMessageType { class: u8, command: u8 },

    /// A decoder was applied to a message flowing in the wrong direction.
    #[error("unexpected message type (decoder requires a response)")]
    UnexpectedMessageType,

    /// A decoder was applied to a message of a different variant.
    #[error("unexpected message kind {actual} (expected {expected})")]
    UnexpectedMessageKind {
        expected: MessageKind,
        actual: MessageKind,
    },

    /// A declared count or length needs more bytes than are available.
    #[error("truncated payload ({needed} bytes needed, {available} available)")]
    TruncatedPayload { needed: usize, available: usize },

    /// An entity record names a data type that has no defined width.
    #[error("entity {id} has unknown data type 0x{code:02x}")]
    UnknownDataType { id: u16, code: u8 },

    /// The payload exceeds the configured or encodable maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A textual message was not valid hexadecimal.
    #[error("invalid hex message: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// An I/O error occurred while reading or writing messages.
    #[error("message I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte source ended before a complete message was received.
    #[error("connection closed (incomplete message)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, ProtoError>;
