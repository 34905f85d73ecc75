use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use meecu_proto::{command_name, Entity, Message, MessageClass, MessageKind, MessageType, Value};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    kind: MessageKind,
    msg_type: MessageType,
    class: MessageClass,
    command: u8,
    command_name: &'a str,
    payload_len: u16,
    payload: String,
    checksum: String,
    wire: String,
}

impl<'a> MessageOutput<'a> {
    fn new(message: &'a Message) -> Self {
        Self {
            kind: message.kind(),
            msg_type: message.msg_type(),
            class: message.class(),
            command: message.command(),
            command_name: command_name(message.class(), message.command()),
            payload_len: message.payload_len(),
            payload: hex::encode(message.payload()),
            checksum: format!("0x{:04x}", message.checksum()),
            wire: message.to_hex(),
        }
    }
}

pub fn print_message(message: &Message, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&MessageOutput::new(message)),
        OutputFormat::Table => {
            let out = MessageOutput::new(message);
            let mut table = new_table(vec![
                "KIND", "TYPE", "CLASS", "COMMAND", "LEN", "CHECKSUM", "PAYLOAD",
            ]);
            table.add_row(vec![
                out.kind.to_string(),
                out.msg_type.to_string(),
                out.class.to_string(),
                format!("{} (0x{:02x})", out.command_name, out.command),
                out.payload_len.to_string(),
                out.checksum,
                out.payload,
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{message}"),
        OutputFormat::Raw => print_raw(&message.to_bytes()),
    }
}

pub fn print_entities(entities: &[Entity], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "entities": entities })),
        OutputFormat::Table => {
            let mut table = new_table(vec!["ID", "TYPE"]);
            for entity in entities {
                table.add_row(vec![entity.id.to_string(), entity.data_type.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for entity in entities {
                println!("id={} type={}", entity.id, entity.data_type);
            }
        }
    }
}

pub fn print_values(values: &[Value], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "values": values })),
        OutputFormat::Table => {
            let mut table = new_table(vec!["ID", "TYPE", "VALUE"]);
            for value in values {
                table.add_row(vec![
                    value.id.to_string(),
                    value.data_type.to_string(),
                    value.reading.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for value in values {
                println!("id={} value={}", value.id, value.reading);
            }
        }
        OutputFormat::Raw => {
            for value in values {
                println!("{}\t{}", value.id, value.reading);
            }
        }
    }
}

#[derive(Serialize)]
struct HexOutput<'a> {
    label: &'a str,
    hex: &'a str,
}

/// Print an encoded message, or any labelled hex string.
pub fn print_hex(label: &str, hex: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&HexOutput { label, hex }),
        OutputFormat::Table => {
            let mut table = new_table(vec!["ITEM", "HEX"]);
            table.add_row(vec![label.to_string(), hex.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => println!("{hex}"),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}
