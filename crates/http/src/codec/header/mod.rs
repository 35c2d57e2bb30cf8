//! Request header decoding and response header encoding.

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub(crate) use header_decoder::MAX_BODY_BYTES;
pub use header_encoder::HeaderEncoder;
