use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use meecu_proto::{
    parse_entities, parse_values, reporting_version, request, Entity, Message, MessageKind,
    MessageReader, MessageWriter, ProtoError, ReportingVersion, Value,
};

use crate::cmd::MonitorArgs;
use crate::exit::{io_error, is_recoverable, proto_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_message, print_values, OutputFormat};

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let options = SessionOptions {
        enable: !args.no_enable,
        ack: !args.no_ack,
        count: args.count,
    };

    if args.path.as_os_str() == "-" {
        if options.enable || options.ack {
            tracing::warn!("reading from stdin; requests and acks are not sent");
        }
        let stdin = std::io::stdin();
        let mut session = Session::new(stdin.lock(), None::<std::io::Sink>, options);
        session.run(&running, &mut |report| print_report(report, format))?;
        return Ok(SUCCESS);
    }

    let device = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&args.path)
        .map_err(|err| io_error(&format!("failed opening {}", args.path.display()), err))?;
    let sink = device
        .try_clone()
        .map_err(|err| io_error("failed cloning device handle", err))?;

    tracing::info!(path = %args.path.display(), "monitoring");
    let mut session = Session::new(device, Some(sink), options);
    let reports = session.run(&running, &mut |report| print_report(report, format))?;
    tracing::info!(reports, "monitor finished");

    Ok(SUCCESS)
}

fn print_report(report: Report<'_>, format: OutputFormat) {
    match report {
        Report::Values(values) => print_values(values, format),
        Report::Other(message) => print_message(message, format),
    }
}

/// What the session hands to its printer.
pub enum Report<'a> {
    Values(&'a [Value]),
    Other(&'a Message),
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub enable: bool,
    pub ack: bool,
    pub count: Option<usize>,
}

/// Reporting session over a byte stream. Keeps the entity list from the
/// latest Set State response and applies it to every report.
pub struct Session<R, W> {
    reader: MessageReader<R>,
    writer: Option<MessageWriter<W>>,
    options: SessionOptions,
    entities: Option<Vec<Entity>>,
}

impl<R: Read, W: Write> Session<R, W> {
    pub fn new(source: R, sink: Option<W>, options: SessionOptions) -> Self {
        Self {
            reader: MessageReader::new(source),
            writer: sink.map(MessageWriter::new),
            options,
            entities: None,
        }
    }

    /// Run until the stream ends, `running` is cleared, or the report count
    /// is reached. Returns the number of reports decoded.
    pub fn run(
        &mut self,
        running: &AtomicBool,
        emit: &mut dyn FnMut(Report<'_>),
    ) -> CliResult<usize> {
        if self.options.enable {
            self.send(&request::set_reporting(true))?;
        }

        let mut reports = 0usize;
        while running.load(Ordering::SeqCst) {
            let message = match self.reader.read_message() {
                Ok(message) => message,
                Err(ProtoError::ConnectionClosed) => break,
                Err(err) if is_recoverable(&err) => continue,
                Err(err) => return Err(proto_error("receive failed", err)),
            };

            if self.handle(&message, emit)? {
                reports = reports.saturating_add(1);
                if let Some(count) = self.options.count {
                    if reports >= count {
                        break;
                    }
                }
            }
        }

        Ok(reports)
    }

    fn handle(&mut self, message: &Message, emit: &mut dyn FnMut(Report<'_>)) -> CliResult<bool> {
        match message.kind() {
            MessageKind::ReportSetState if message.is_response() => {
                self.update_schema(message);
                Ok(false)
            }
            MessageKind::ReportSendReport if message.is_response() => {
                let decoded = match &self.entities {
                    Some(entities) => match parse_values(message, entities) {
                        Ok(values) => {
                            emit(Report::Values(&values));
                            true
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "report does not match entity list");
                            false
                        }
                    },
                    None => {
                        tracing::warn!("report received before entity list");
                        false
                    }
                };

                if self.options.ack {
                    self.send(&request::send_ack())?;
                }
                Ok(decoded)
            }
            _ => {
                emit(Report::Other(message));
                Ok(false)
            }
        }
    }

    fn update_schema(&mut self, message: &Message) {
        match reporting_version(message) {
            Ok(ReportingVersion::V1) => {
                tracing::warn!("ECU uses reporting v1; no entity list available");
            }
            Ok(ReportingVersion::V2) => match parse_entities(message) {
                Ok(entities) => {
                    tracing::info!(count = entities.len(), "received entity list");
                    self.entities = Some(entities);
                }
                Err(err) => tracing::warn!(error = %err, "ignoring malformed entity list"),
            },
            Err(err) => tracing::warn!(error = %err, "unexpected set state message"),
        }
    }

    fn send(&mut self, message: &Message) -> CliResult<()> {
        match &mut self.writer {
            Some(writer) => {
                let checksum = writer
                    .write_message(message)
                    .map_err(|err| proto_error("send failed", err))?;
                tracing::debug!(kind = %message.kind(), checksum, "sent request");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
