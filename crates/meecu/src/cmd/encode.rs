use meecu_proto::request::{self, HashMode};
use meecu_proto::Message;

use crate::cmd::{EncodeArgs, HashModeArg, RequestName};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_hex, print_raw, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let message = build(&args);
    tracing::debug!(%message, "built request");

    match format {
        OutputFormat::Raw => print_raw(&message.to_bytes()),
        _ => print_hex(message.kind().name(), &message.to_hex(), format),
    }
    Ok(SUCCESS)
}

fn build(args: &EncodeArgs) -> Message {
    match args.request {
        RequestName::EcuInfo => request::get_ecu_info(),
        RequestName::Hash => request::get_hash(match args.mode {
            HashModeArg::Overall => HashMode::Overall,
            HashModeArg::Detailed => HashMode::Detailed,
        }),
        RequestName::SetState => request::set_reporting(!args.disable),
        RequestName::Ack => request::send_ack(),
        RequestName::Report => request::send_report(),
    }
}
