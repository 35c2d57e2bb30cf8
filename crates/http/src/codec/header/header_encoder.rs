//! Serialization of the response status line and header fields.
//!
//! The encoder owns the framing headers: `Content-Length` reflects the payload size
//! handed to it (and is left out of `204 No Content`, which carries no body), and
//! `Connection: close` is always present since the transport closes the connection
//! after every response.

use crate::protocol::{PayloadSize, ResponseHead, SendError};

use bytes::{BufMut, BytesMut};

use http::{HeaderValue, StatusCode, Version, header};
use std::io;
use std::io::{ErrorKind, Write};
use tokio_util::codec::Encoder;
use tracing::error;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

const CLOSE_VALUE: HeaderValue = HeaderValue::from_static("close");

pub struct HeaderEncoder;

impl Encoder<(ResponseHead, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, item: (ResponseHead, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut header, payload_size) = item;

        dst.reserve(INIT_HEADER_SIZE);
        match header.version() {
            Version::HTTP_11 | Version::HTTP_10 => {
                write!(
                    FastWrite(dst),
                    "HTTP/1.1 {} {}\r\n",
                    header.status().as_str(),
                    header.status().canonical_reason().unwrap_or("Unknown")
                )?;
            }
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(io::Error::from(ErrorKind::Unsupported).into());
            }
        }

        if header.status() == StatusCode::NO_CONTENT {
            header.headers_mut().remove(header::CONTENT_LENGTH);
        } else {
            header.headers_mut().insert(header::CONTENT_LENGTH, payload_size.length().into());
        }
        header.headers_mut().insert(header::CONNECTION, CLOSE_VALUE);

        for (header_name, header_value) in header.headers() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// `io::Write` over a `BytesMut` so the status line can use `write!`.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Response;

    #[test]
    fn writes_status_line_and_framing_headers() {
        let head = Response::builder()
            .status(StatusCode::CREATED)
            .header(header::CONTENT_TYPE, "application/json")
            .body(())
            .unwrap();

        let mut dst = BytesMut::new();
        HeaderEncoder.encode((head, PayloadSize::Length(2)), &mut dst).unwrap();

        let text = std::str::from_utf8(&dst).unwrap();
        assert!(text.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(text.contains("content-type: application/json\r\n"));
        assert!(text.contains("content-length: 2\r\n"));
        assert!(text.contains("connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn empty_payload_announces_zero_length() {
        let head = Response::builder().status(StatusCode::NOT_FOUND).body(()).unwrap();

        let mut dst = BytesMut::new();
        HeaderEncoder.encode((head, PayloadSize::Empty), &mut dst).unwrap();

        let text = std::str::from_utf8(&dst).unwrap();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("content-length: 0\r\n"));
    }

    #[test]
    fn no_content_has_no_content_length() {
        let head = Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header(header::CONTENT_LENGTH, "0")
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .body(())
            .unwrap();

        let mut dst = BytesMut::new();
        HeaderEncoder.encode((head, PayloadSize::Empty), &mut dst).unwrap();

        let text = std::str::from_utf8(&dst).unwrap();
        assert!(text.starts_with("HTTP/1.1 204 No Content\r\n"));
        assert!(!text.contains("content-length"));
        assert!(text.contains("access-control-allow-origin: *\r\n"));
        assert!(text.contains("connection: close\r\n"));
    }
}
