//! Message variants and the (class, command) registry.
//!
//! Only the pairs in [`REGISTRY`] produce messages. The command constants
//! cover the full catalogue so diagnostics can name commands that have no
//! variant yet.

use std::fmt;

use crate::header::MessageClass;

/// Reporting class: send report.
pub const CMD_REP_SEND_REPORT: u8 = 0x00;
/// Reporting class: acknowledge a report.
pub const CMD_REP_SEND_ACK: u8 = 0x01;
/// Reporting class: enable or disable reporting.
pub const CMD_REP_SET_STATE: u8 = 0x02;
/// Reporting class: set special configuration.
pub const CMD_REP_SET_SPECIAL_CFG: u8 = 0x03;

/// System class: ECU information.
pub const CMD_SYS_GET_ECU_INFO: u8 = 0x00;
/// System class: table hash.
pub const CMD_SYS_GET_HASH: u8 = 0x01;
/// System class: set the real-time clock.
pub const CMD_SYS_SET_RTC: u8 = 0x02;
/// System class: factory reset.
pub const CMD_SYS_FACTORY_RESET: u8 = 0x03;
/// System class: set password lock state.
pub const CMD_SYS_PWLOCK_SET_STATE: u8 = 0x04;
/// System class: get password lock state.
pub const CMD_SYS_PWLOCK_GET_STATE: u8 = 0x05;
/// System class: race unlock.
pub const CMD_SYS_RACE_UNLOCK: u8 = 0x06;

/// A concrete message variant, selected by (class, command).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MessageKind {
    SystemGetEcuInfo,
    SystemGetHash,
    ReportSetState,
    ReportSendReport,
    ReportSendAck,
}

/// Registered (class, command) pairs.
pub static REGISTRY: &[(MessageClass, u8, MessageKind)] = &[
    (
        MessageClass::System,
        CMD_SYS_GET_ECU_INFO,
        MessageKind::SystemGetEcuInfo,
    ),
    (
        MessageClass::System,
        CMD_SYS_GET_HASH,
        MessageKind::SystemGetHash,
    ),
    (
        MessageClass::Reporting,
        CMD_REP_SET_STATE,
        MessageKind::ReportSetState,
    ),
    (
        MessageClass::Reporting,
        CMD_REP_SEND_REPORT,
        MessageKind::ReportSendReport,
    ),
    (
        MessageClass::Reporting,
        CMD_REP_SEND_ACK,
        MessageKind::ReportSendAck,
    ),
];

/// Look up the variant for a (class, command) pair.
pub fn resolve(class: MessageClass, command: u8) -> Option<MessageKind> {
    REGISTRY
        .iter()
        .find(|(c, cmd, _)| *c == class && *cmd == command)
        .map(|(_, _, kind)| *kind)
}

impl MessageKind {
    /// The class this variant belongs to.
    pub fn class(self) -> MessageClass {
        match self {
            MessageKind::SystemGetEcuInfo | MessageKind::SystemGetHash => MessageClass::System,
            MessageKind::ReportSetState
            | MessageKind::ReportSendReport
            | MessageKind::ReportSendAck => MessageClass::Reporting,
        }
    }

    /// The command byte of this variant.
    pub fn command(self) -> u8 {
        match self {
            MessageKind::SystemGetEcuInfo => CMD_SYS_GET_ECU_INFO,
            MessageKind::SystemGetHash => CMD_SYS_GET_HASH,
            MessageKind::ReportSetState => CMD_REP_SET_STATE,
            MessageKind::ReportSendReport => CMD_REP_SEND_REPORT,
            MessageKind::ReportSendAck => CMD_REP_SEND_ACK,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageKind::SystemGetEcuInfo => "SystemGetEcuInfo",
            MessageKind::SystemGetHash => "SystemGetHash",
            MessageKind::ReportSetState => "ReportSetState",
            MessageKind::ReportSendReport => "ReportSendReport",
            MessageKind::ReportSendAck => "ReportSendAck",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns a human-readable name for a command within its class.
pub fn command_name(class: MessageClass, command: u8) -> &'static str {
    match (class, command) {
        (MessageClass::Reporting, CMD_REP_SEND_REPORT) => "Send Report",
        (MessageClass::Reporting, CMD_REP_SEND_ACK) => "Send Ack",
        (MessageClass::Reporting, CMD_REP_SET_STATE) => "Set State",
        (MessageClass::Reporting, CMD_REP_SET_SPECIAL_CFG) => "Set Special Config.",
        (MessageClass::System, CMD_SYS_GET_ECU_INFO) => "Get ECU Info",
        (MessageClass::System, CMD_SYS_GET_HASH) => "Get Hash",
        (MessageClass::System, CMD_SYS_SET_RTC) => "Set RTC",
        (MessageClass::System, CMD_SYS_FACTORY_RESET) => "Factory Reset",
        (MessageClass::System, CMD_SYS_PWLOCK_SET_STATE) => "PWLock Set State",
        (MessageClass::System, CMD_SYS_PWLOCK_GET_STATE) => "PWLock Get State",
        (MessageClass::System, CMD_SYS_RACE_UNLOCK) => "Race Unlock",
        _ => "Unknown",
    }
}
