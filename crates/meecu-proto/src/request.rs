//! Builders for the requests a host sends to the ECU.

use bytes::Bytes;

use crate::header::MessageType;
use crate::kind::MessageKind;
use crate::message::Message;

/// Scope of a `SystemGetHash` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HashMode {
    /// A single hash over all tables.
    Overall = 0x00,
    /// One hash per table.
    Detailed = 0x01,
}

/// Request ECU identification.
pub fn get_ecu_info() -> Message {
    Message::assemble(MessageType::Request, MessageKind::SystemGetEcuInfo, Bytes::new())
}

/// Request the table hash.
pub fn get_hash(mode: HashMode) -> Message {
    Message::assemble(
        MessageType::Request,
        MessageKind::SystemGetHash,
        Bytes::copy_from_slice(&[mode as u8]),
    )
}

/// Enable or disable periodic reporting.
///
/// The ECU answers an enable with the entity schema used by later reports.
pub fn set_reporting(enabled: bool) -> Message {
    Message::assemble(
        MessageType::Request,
        MessageKind::ReportSetState,
        Bytes::copy_from_slice(&[u8::from(enabled)]),
    )
}

/// Acknowledge a received report. The ECU stops reporting without these.
pub fn send_ack() -> Message {
    Message::assemble(
        MessageType::Request,
        MessageKind::ReportSendAck,
        Bytes::from_static(&[0x00]),
    )
}

/// Poll for a single report.
pub fn send_report() -> Message {
    Message::assemble(
        MessageType::Request,
        MessageKind::ReportSendReport,
        Bytes::from_static(&[0x00]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_ecu_info_wire_image() {
        assert_eq!(get_ecu_info().to_hex(), "4d4500000004000408");
    }

    #[test]
    fn get_hash_wire_images() {
        assert_eq!(get_hash(HashMode::Detailed).to_hex(), "4d45010000040101060f");
        assert_eq!(get_hash(HashMode::Overall).to_hex(), "4d45010000040100050e");
    }

    #[test]
    fn set_reporting_wire_images() {
        assert_eq!(set_reporting(true).to_hex(), "4d450100000002010305");
        assert_eq!(set_reporting(false).to_hex(), "4d450100000002000204");
    }

    #[test]
    fn send_ack_wire_image() {
        let msg = send_ack();
        assert_eq!(msg.checksum(), 0x0201);
        assert_eq!(msg.to_hex(), "4d450100000001000102");
    }

    #[test]
    fn send_report_is_a_request() {
        let msg = send_report();
        assert_eq!(msg.kind(), MessageKind::ReportSendReport);
        assert_eq!(msg.msg_type(), MessageType::Request);
        assert_eq!(msg.to_hex(), "4d450100000000000000");
    }
}
