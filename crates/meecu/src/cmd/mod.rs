use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod checksum;
pub mod decode;
pub mod encode;
pub mod monitor;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a request message and print its wire form.
    Encode(EncodeArgs),
    /// Validate and describe a captured message.
    Decode(DecodeArgs),
    /// Compute the protocol checksum of raw bytes.
    Checksum(ChecksumArgs),
    /// Enable reporting on a device and print decoded values.
    Monitor(MonitorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Checksum(args) => checksum::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum RequestName {
    /// System / Get ECU Info.
    EcuInfo,
    /// System / Get Hash.
    Hash,
    /// Reporting / Set State.
    SetState,
    /// Reporting / Send Ack.
    Ack,
    /// Reporting / Send Report.
    Report,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum HashModeArg {
    Overall,
    Detailed,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Request to build.
    pub request: RequestName,
    /// Hash scope for the `hash` request.
    #[arg(long, default_value = "detailed")]
    pub mode: HashModeArg,
    /// Build a `set-state` request that disables reporting.
    #[arg(long)]
    pub disable: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Message in hexadecimal wire form.
    pub hex: String,
    /// Set State response (hex) whose entity list decodes a Send Report.
    #[arg(long, value_name = "HEX")]
    pub entities: Option<String>,
}

#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// Bytes in hexadecimal.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Device or file to read from (`-` for stdin, read-only).
    pub path: PathBuf,
    /// Exit after printing N reports.
    #[arg(long)]
    pub count: Option<usize>,
    /// Do not acknowledge reports.
    #[arg(long)]
    pub no_ack: bool,
    /// Do not send the enable request before reading.
    #[arg(long)]
    pub no_enable: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
