//! Checksummed message codec for the ME ECU command/telemetry protocol.
//!
//! Every message is framed with:
//! - A 2-byte magic marker ("ME")
//! - A 2-byte little-endian payload length
//! - Type, class, and command bytes
//! - The payload, then a 2-byte Fletcher-style checksum over
//!   type, class, command, and payload
//!
//! The codec is stateless. It performs no I/O of its own beyond the
//! [`MessageReader`]/[`MessageWriter`] adapters over caller-supplied streams.

pub mod checksum;
pub mod codec;
pub mod error;
pub mod header;
pub mod kind;
pub mod message;
pub mod reader;
pub mod report;
pub mod request;
pub mod writer;

pub use checksum::Checksum;
#[cfg(feature = "async")]
pub use codec::MessageCodec;
pub use codec::{
    decode_message, discard_malformed, encode_message, CodecConfig, DEFAULT_MAX_PAYLOAD,
};
pub use error::{ProtoError, Result};
pub use header::{validate, Header, MessageClass, MessageType, CHECKSUM_SIZE, HEADER_SIZE, MAGIC};
pub use kind::{command_name, resolve, MessageKind};
pub use message::{Message, MAX_PAYLOAD_LEN};
pub use reader::MessageReader;
pub use report::{
    parse_entities, parse_values, reporting_version, DataType, Entity, Reading,
    ReportingVersion, Value,
};
pub use request::HashMode;
pub use writer::MessageWriter;
