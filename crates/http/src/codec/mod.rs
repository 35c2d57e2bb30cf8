//! Encoding and decoding of HTTP/1.1 messages as `tokio-util` codecs.
//!
//! - [`RequestDecoder`] turns raw bytes into a request header followed by
//!   `Content-Length` framed payload chunks.
//! - [`ResponseEncoder`] writes a response head followed by its payload.
//!
//! ```no_run
//! use inkwell_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET /api/articles HTTP/1.1\r\nHost: localhost\r\n\r\n");
//! let header = decoder.decode(&mut buffer);
//! ```

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub(crate) use header::MAX_BODY_BYTES;
pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
