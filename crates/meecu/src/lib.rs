//! ME ECU protocol codec.
//!
//! meecu encodes and decodes the checksummed command/telemetry messages
//! exchanged with ME ECUs over a serial link, and interprets reporting
//! payloads into typed values.
//!
//! # Crate Structure
//!
//! - [`proto`]: Message framing, validation, type registry, and payload decoders
//!
//! The `meecu` binary (behind the `cli` feature) builds requests, decodes
//! captured messages, and monitors a live reporting stream.

/// Re-export protocol types.
pub mod proto {
    pub use meecu_proto::*;
}

pub use meecu_proto::{Message, MessageClass, MessageKind, MessageType, ProtoError};
