use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_message, CodecConfig};
use crate::error::{ProtoError, Result};
use crate::message::Message;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Writes complete messages to any `Write` byte sink.
///
/// A message is encoded into a reused buffer and handed to the sink in full,
/// then the sink is flushed. A request is never left half-sent between calls.
pub struct MessageWriter<T> {
    inner: T,
    buf: BytesMut,
    config: CodecConfig,
    sent: u64,
}

impl<T: Write> MessageWriter<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, CodecConfig::default())
    }

    pub fn with_config(inner: T, config: CodecConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            sent: 0,
        }
    }

    /// Encode, write and flush one message. Returns the checksum put on the
    /// wire.
    pub fn write_message(&mut self, message: &Message) -> Result<u16> {
        self.buf.clear();
        let checksum = encode_message(message, &mut self.buf, self.config.max_payload_size)?;

        self.write_buffered()?;
        self.flush()?;
        self.sent += 1;

        tracing::trace!(
            kind = %message.kind(),
            checksum,
            bytes = self.buf.len(),
            "wrote message"
        );
        Ok(checksum)
    }

    /// Number of messages written in full so far.
    pub fn messages_sent(&self) -> u64 {
        self.sent
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut pending = &self.buf[..];
        while !pending.is_empty() {
            match self.inner.write(pending) {
                Ok(0) => return Err(ProtoError::ConnectionClosed),
                Ok(n) => pending = &pending[n..],
                Err(err) if retryable(&err) => {}
                Err(err) => return Err(ProtoError::Io(err)),
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if retryable(&err) => {}
                Err(err) => return Err(ProtoError::Io(err)),
            }
        }
    }
}

fn retryable(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock)
}
