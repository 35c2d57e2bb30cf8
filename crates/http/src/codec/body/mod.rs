//! `Content-Length` framed payload handling for both directions.

mod length_decoder;
mod length_encoder;

pub use length_decoder::LengthDecoder;
pub use length_encoder::LengthEncoder;
