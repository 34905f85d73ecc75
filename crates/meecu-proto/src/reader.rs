use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{decode_message, discard_malformed, CodecConfig};
use crate::error::{ProtoError, Result};
use crate::message::Message;

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 512;

/// Reads complete messages from any `Read` byte source.
///
/// Handles partial reads internally; callers always get whole, validated
/// messages. A malformed message is reported once, then dropped; the reader
/// resumes at the next magic marker, keeping any messages already buffered.
pub struct MessageReader<T> {
    inner: T,
    buf: BytesMut,
    config: CodecConfig,
}

impl<T: Read> MessageReader<T> {
    /// Create a new message reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, CodecConfig::default())
    }

    /// Create a new message reader with explicit configuration.
    pub fn with_config(inner: T, config: CodecConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete message (blocking).
    ///
    /// Returns `Err(ProtoError::ConnectionClosed)` when EOF is reached.
    pub fn read_message(&mut self) -> Result<Message> {
        loop {
            match decode_message(&mut self.buf, self.config.max_payload_size) {
                Ok(Some(message)) => return Ok(message),
                Ok(None) => {}
                Err(err) => {
                    let discarded = discard_malformed(&mut self.buf, &err);
                    tracing::warn!(
                        error = %err,
                        discarded,
                        buffered = self.buf.len(),
                        "dropping malformed message"
                    );
                    return Err(err);
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ProtoError::Io(err)),
            };

            if read == 0 {
                return Err(ProtoError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current message reader configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}
