//! Request decoding: a header followed by its `Content-Length` framed payload.

use crate::codec::body::LengthDecoder;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestHeader};
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::debug;

/// Decodes one request header and then its payload.
///
/// While `payload_decoder` is `None` the decoder is reading a header; once a header
/// announcing a body is decoded it yields payload chunks until [`PayloadItem::Eof`].
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<LengthDecoder>,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self { header_decoder: HeaderDecoder, payload_decoder: None }
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<(RequestHeader, PayloadSize)>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ PayloadItem::Eof) => {
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                None => None,
            };

            return Ok(message);
        }

        let message = match self.header_decoder.decode(src)? {
            Some((header, payload_size)) => {
                if let PayloadSize::Length(length) = payload_size {
                    self.payload_decoder = Some(LengthDecoder::new(length));
                }
                Some(Message::Header((header, payload_size)))
            }
            None => None,
        };

        Ok(message)
    }

    /// The peer closed its write half.
    ///
    /// A body cut short is finished with [`PayloadItem::Eof`] so the caller sees a
    /// truncated body rather than an error. A partially received header is an error.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }

        if let Some(payload_decoder) = self.payload_decoder.take() {
            debug!(missing = payload_decoder.remaining(), "peer closed before the whole body arrived");
            return Ok(Some(Message::Payload(PayloadItem::Eof)));
        }

        if src.is_empty() { Ok(None) } else { Err(ParseError::incomplete_header(src.len())) }
    }
}
