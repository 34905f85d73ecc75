use meecu_proto::checksum;

use crate::cmd::ChecksumArgs;
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_hex, OutputFormat};

pub fn run(args: ChecksumArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = hex::decode(args.hex.trim())
        .map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))?;
    let sum = checksum::compute(&bytes);
    print_hex("checksum", &format!("{sum:04x}"), format);
    Ok(SUCCESS)
}
