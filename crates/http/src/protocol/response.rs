//! HTTP response header handling.

use http::Response;

/// The header portion of an HTTP response.
///
/// The body is written separately by the encoder, so the head carries `()` in its
/// body slot.
pub type ResponseHead = Response<()>;
