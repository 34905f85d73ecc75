use meecu_proto::{
    parse_entities, parse_values, reporting_version, Entity, Message, MessageKind,
    ReportingVersion, Value,
};

use crate::cmd::DecodeArgs;
use crate::exit::{proto_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_entities, print_message, print_values, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let message =
        Message::from_hex(&args.hex).map_err(|err| proto_error("decode failed", err))?;
    print_message(&message, format);

    match message.kind() {
        MessageKind::ReportSetState if message.is_response() => {
            if let Some(entities) = entity_list(&message, "entity list")? {
                print_entities(&entities, format);
            }
        }
        MessageKind::ReportSendReport => {
            if let Some(schema) = &args.entities {
                let entities = load_schema(schema)?;
                let values = decode_report(&message, &entities)?;
                print_values(&values, format);
            }
        }
        _ => {}
    }

    Ok(SUCCESS)
}

/// The entity list of a Set State response, or `None` for a reporting v1
/// ECU, which sends only the flag byte.
fn entity_list(message: &Message, context: &str) -> CliResult<Option<Vec<Entity>>> {
    match reporting_version(message).map_err(|err| proto_error(context, err))? {
        ReportingVersion::V1 => {
            tracing::info!("reporting v1 set state carries no entity list");
            Ok(None)
        }
        ReportingVersion::V2 => parse_entities(message)
            .map(Some)
            .map_err(|err| proto_error(context, err)),
    }
}

fn load_schema(hex: &str) -> CliResult<Vec<Entity>> {
    let message = Message::from_hex(hex).map_err(|err| proto_error("--entities", err))?;
    if message.kind() != MessageKind::ReportSetState {
        return Err(CliError::new(
            USAGE,
            format!("--entities must be a Set State response, got {}", message.kind()),
        ));
    }
    entity_list(&message, "--entities")?.ok_or_else(|| {
        CliError::new(
            USAGE,
            "--entities is a reporting v1 Set State response without an entity list",
        )
    })
}

fn decode_report(message: &Message, entities: &[Entity]) -> CliResult<Vec<Value>> {
    parse_values(message, entities).map_err(|err| proto_error("report values", err))
}
