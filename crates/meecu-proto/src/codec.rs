use bytes::{Buf, BytesMut};

use crate::error::{ProtoError, Result};
use crate::header::{Header, CHECKSUM_SIZE, HEADER_SIZE, MAGIC};
use crate::message::{Message, MAX_PAYLOAD_LEN};

/// Default maximum payload size: everything the length field can describe.
pub const DEFAULT_MAX_PAYLOAD: usize = MAX_PAYLOAD_LEN;

/// Configuration for stream decoding and encoding.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Maximum payload size in bytes. Default: 65535.
    pub max_payload_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// Decode one message from the front of a stream buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete message yet.
/// On success, consumes exactly the message bytes from the buffer. On error
/// the buffer is left untouched.
pub fn decode_message(src: &mut BytesMut, max_payload: usize) -> Result<Option<Message>> {
    if src.len() >= MAGIC.len() && src[0..2] != MAGIC {
        return Err(ProtoError::InvalidMagic);
    }

    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let payload_len = u16::from_le_bytes([src[2], src[3]]) as usize;
    if payload_len > max_payload {
        return Err(ProtoError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + payload_len + CHECKSUM_SIZE;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    let message = Message::from_bytes(&src[..total])?;
    src.advance(total);
    Ok(Some(message))
}

/// Drop a message that failed to decode and skip ahead to the next magic
/// marker. Returns the number of bytes discarded.
///
/// A message whose header and length were intact (bad checksum, unregistered
/// command) is skipped whole. Anything else loses one byte before the search,
/// so noise in front of a message costs only the noise.
pub fn discard_malformed(src: &mut BytesMut, err: &ProtoError) -> usize {
    let skip = match err {
        ProtoError::ChecksumMismatch { .. } | ProtoError::UnknownMessageType { .. } => {
            Header::parse(&src[..]).map_or(1, |header| header.wire_size())
        }
        _ => 1,
    };
    let skip = skip.min(src.len());
    src.advance(skip);

    let resync = match src.windows(MAGIC.len()).position(|w| w == MAGIC) {
        Some(pos) => pos,
        // The next read may complete a marker split across reads.
        None if src.last() == Some(&MAGIC[0]) => src.len() - 1,
        None => src.len(),
    };
    src.advance(resync);
    skip + resync
}

/// Append a message to a stream buffer, enforcing `max_payload`. Returns the
/// checksum written.
pub fn encode_message(message: &Message, dst: &mut BytesMut, max_payload: usize) -> Result<u16> {
    let size = message.payload().len();
    if size > max_payload {
        return Err(ProtoError::PayloadTooLarge {
            size,
            max: max_payload,
        });
    }
    Ok(message.encode_into(dst))
}

#[cfg(feature = "async")]
pub use self::framed::MessageCodec;

#[cfg(feature = "async")]
mod framed {
    use bytes::BytesMut;
    use tokio_util::codec::{Decoder, Encoder};

    use super::{decode_message, encode_message, CodecConfig};
    use crate::error::ProtoError;
    use crate::message::Message;

    /// `tokio_util` codec for use with `FramedRead`/`FramedWrite`.
    #[derive(Debug, Clone, Default)]
    pub struct MessageCodec {
        config: CodecConfig,
    }

    impl MessageCodec {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_config(config: CodecConfig) -> Self {
            Self { config }
        }

        pub fn config(&self) -> &CodecConfig {
            &self.config
        }
    }

    impl Decoder for MessageCodec {
        type Item = Message;
        type Error = ProtoError;

        fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, ProtoError> {
            decode_message(src, self.config.max_payload_size)
        }

        fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Message>, ProtoError> {
            match self.decode(src)? {
                Some(message) => Ok(Some(message)),
                None if src.is_empty() => Ok(None),
                None => Err(ProtoError::ConnectionClosed),
            }
        }
    }

    impl Encoder<Message> for MessageCodec {
        type Error = ProtoError;

        fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), ProtoError> {
            encode_message(&item, dst, self.config.max_payload_size).map(|_| ())
        }
    }

    impl Encoder<&Message> for MessageCodec {
        type Error = ProtoError;

        fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<(), ProtoError> {
            encode_message(item, dst, self.config.max_payload_size).map(|_| ())
        }
    }

}

#[cfg(test)]
mod tests {
    use bytes::BufMut;

    use super::*;
    use crate::request;

    #[test]
    fn test_decode_single_message() {
        let mut buf = BytesMut::new();
        let msg = request::get_hash(request::HashMode::Detailed);
        encode_message(&msg, &mut buf, DEFAULT_MAX_PAYLOAD).unwrap();

        assert_eq!(buf.len(), msg.wire_size());

        let decoded = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(decoded, msg);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_incomplete_header() {
        let mut buf = BytesMut::from(&[0x4d, 0x45, 0x01][..]);
        let result = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap();
        assert!(result.is_none());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_decode_incomplete_payload() {
        let mut buf = BytesMut::new();
        request::set_reporting(true).encode_into(&mut buf);
        buf.truncate(HEADER_SIZE + 1); // Drop the checksum

        let result = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_decode_invalid_magic_early() {
        let mut buf = BytesMut::from(&[0xff, 0xff][..]);
        let result = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD);
        assert!(matches!(result, Err(ProtoError::InvalidMagic)));
    }

    #[test]
    fn test_decode_payload_too_large() {
        let mut buf = BytesMut::new();
        buf.put_slice(&MAGIC);
        buf.put_u16_le(1024);
        buf.put_slice(&[0x0f, 0x00, 0x00]);

        let result = decode_message(&mut buf, 512);
        assert!(matches!(
            result,
            Err(ProtoError::PayloadTooLarge {
                size: 1024,
                max: 512
            })
        ));
    }

    #[test]
    fn test_decode_corrupt_message_keeps_buffer() {
        let mut buf = BytesMut::new();
        request::send_ack().encode_into(&mut buf);
        let last = buf.len() - 1;
        buf[last] ^= 0xff;

        let result = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD);
        assert!(matches!(result, Err(ProtoError::ChecksumMismatch { .. })));
        assert_eq!(buf.len(), request::send_ack().wire_size());
    }

    #[test]
    fn test_multiple_messages() {
        let mut buf = BytesMut::new();
        request::set_reporting(true).encode_into(&mut buf);
        request::send_ack().encode_into(&mut buf);

        let m1 = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        let m2 = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();

        assert_eq!(m1, request::set_reporting(true));
        assert_eq!(m2, request::send_ack());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_rejects_over_limit() {
        let mut buf = BytesMut::new();
        let err = encode_message(&request::send_ack(), &mut buf, 0).unwrap_err();
        assert!(matches!(err, ProtoError::PayloadTooLarge { .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_discard_skips_whole_corrupt_message() {
        let mut buf = BytesMut::new();
        request::send_ack().encode_into(&mut buf);
        let last = buf.len() - 1;
        buf[last] ^= 0xff;
        request::get_ecu_info().encode_into(&mut buf);

        let err = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap_err();
        let discarded = discard_malformed(&mut buf, &err);
        assert_eq!(discarded, request::send_ack().wire_size());

        let next = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(next, request::get_ecu_info());
    }

    #[test]
    fn test_discard_resyncs_past_noise() {
        let mut buf = BytesMut::from(&[0x00, 0x4d, 0x00, 0xff][..]);
        request::set_reporting(true).encode_into(&mut buf);

        let err = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap_err();
        assert!(matches!(err, ProtoError::InvalidMagic));
        assert_eq!(discard_malformed(&mut buf, &err), 4);

        let next = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(next, request::set_reporting(true));
    }

    #[test]
    fn test_discard_bad_class_searches_from_next_byte() {
        // Magic followed by class 0x09, then a real message.
        let mut buf = BytesMut::from(
            &[0x4d, 0x45, 0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00][..],
        );
        request::send_ack().encode_into(&mut buf);

        let err = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap_err();
        assert!(matches!(err, ProtoError::InvalidClass(0x09)));
        assert_eq!(discard_malformed(&mut buf, &err), 9);
        assert_eq!(
            decode_message(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap(),
            Some(request::send_ack())
        );
    }

    #[test]
    fn test_discard_keeps_trailing_marker_byte() {
        let mut buf = BytesMut::from(&[0xff, 0xff, 0x4d][..]);
        let err = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap_err();
        assert_eq!(discard_malformed(&mut buf, &err), 2);
        assert_eq!(&buf[..], &[0x4d]);
    }

    #[test]
    fn test_discard_without_marker_empties_buffer() {
        let mut buf = BytesMut::from(&[0x01, 0x02, 0x03][..]);
        let err = decode_message(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap_err();
        assert_eq!(discard_malformed(&mut buf, &err), 3);
        assert!(buf.is_empty());
    }
}
