//! Decoding of the request line and header fields.
//!
//! The header section is parsed with `httparse` once the blank line terminating it has
//! arrived. The whole section, request line included, must fit into
//! [`MAX_HEADER_BYTES`]; a buffer that grows past the cap without containing the
//! terminator is rejected.
//!
//! Only `Content-Length` decides whether a body follows. `Transfer-Encoding` is not
//! supported and is ignored. A declared length above [`MAX_BODY_BYTES`] is rejected
//! before any body byte is buffered.

use bytes::{Buf, BytesMut};
use http::{HeaderName, HeaderValue, Request, header};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;

use crate::protocol::{ParseError, PayloadSize, RequestHeader};

/// Maximum number of headers allowed in a request
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
pub(crate) const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Maximum `Content-Length` accepted for a request body
pub(crate) const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

/// Decodes a [`RequestHeader`] and the [`PayloadSize`] announced by it.
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = (RequestHeader, PayloadSize);
    type Error = ParseError;

    /// Returns `Ok(None)` until the full header section is buffered. On success the
    /// header bytes are consumed from `src`; whatever follows is the start of the body.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut req = httparse::Request::new(&mut headers);

        let status = req.parse(src).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e),
        })?;

        let body_offset = match status {
            Status::Complete(body_offset) => body_offset,
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                return Ok(None);
            }
        };

        trace!(header_size = body_offset, "parsed request header");
        ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

        let version = match req.version {
            Some(0) => http::Version::HTTP_10,
            Some(1) => http::Version::HTTP_11,
            _ => return Err(ParseError::InvalidVersion(req.version)),
        };

        let mut header_builder = Request::builder()
            .method(req.method.ok_or(ParseError::InvalidMethod)?)
            .uri(req.path.ok_or(ParseError::InvalidUri)?)
            .version(version);

        if let Some(header_map) = header_builder.headers_mut() {
            header_map.reserve(req.headers.len());
            for field in req.headers.iter() {
                let name = HeaderName::from_bytes(field.name.as_bytes()).map_err(ParseError::invalid_header)?;
                let value = HeaderValue::from_bytes(field.value).map_err(ParseError::invalid_header)?;
                header_map.append(name, value);
            }
        }

        let request = header_builder.body(()).map_err(|e| match e {
            e if e.is::<http::method::InvalidMethod>() => ParseError::InvalidMethod,
            e if e.is::<http::uri::InvalidUri>() => ParseError::InvalidUri,
            e => ParseError::invalid_header(e),
        })?;

        src.advance(body_offset);

        let header = RequestHeader::from(request);
        let payload_size = parse_payload(&header)?;

        Ok(Some((header, payload_size)))
    }
}

/// Reads the body length from `Content-Length`; a missing header means no body.
fn parse_payload(header: &RequestHeader) -> Result<PayloadSize, ParseError> {
    let Some(cl_value) = header.headers().get(header::CONTENT_LENGTH) else {
        return Ok(PayloadSize::Empty);
    };

    let cl_str = cl_value.to_str().map_err(|_| ParseError::invalid_content_length("value can't to_str"))?;
    let length = cl_str.trim().parse::<u64>().map_err(|_| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))?;
    ensure!(length <= MAX_BODY_BYTES, ParseError::too_large_body(length, MAX_BODY_BYTES));

    Ok(PayloadSize::from_length(length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Version};
    use indoc::indoc;

    #[test]
    fn leaves_body_bytes_in_buffer() {
        let str = indoc! {r##"
        POST /api/articles HTTP/1.1
        Host: 127.0.0.1:8080
        Content-Type: application/json
        Content-Length: 3

        {}
        "##};

        let mut bytes = BytesMut::from(str);
        let (header, payload_size) = HeaderDecoder.decode(&mut bytes).unwrap().unwrap();

        assert_eq!(header.method(), &Method::POST);
        assert_eq!(payload_size, PayloadSize::Length(3));
        assert_eq!(&bytes[..], b"{}\n");
    }

    #[test]
    fn from_curl() {
        let str = indoc! {r##"
        GET /api/articles/abc HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        "##};

        let mut buf = BytesMut::from(str);
        let (header, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert!(payload_size.is_empty());
        assert_eq!(header.method(), &Method::GET);
        assert_eq!(header.version(), Version::HTTP_11);
        assert_eq!(header.uri().path(), "/api/articles/abc");
        assert_eq!(header.uri().query(), None);
        assert_eq!(header.headers().len(), 3);
        assert_eq!(header.headers().get(header::USER_AGENT), Some(&HeaderValue::from_static("curl/7.79.1")));
        assert!(buf.is_empty());
    }

    #[test]
    fn content_length_is_case_insensitive() {
        let mut buf = BytesMut::from("PUT /api/articles/1 HTTP/1.1\r\ncOnTeNt-LeNgTh: 42\r\n\r\n");
        let (_, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(payload_size, PayloadSize::Length(42));
    }

    #[test]
    fn content_length_counts_for_any_method() {
        let mut buf = BytesMut::from("DELETE /api/articles/1 HTTP/1.1\r\nContent-Length: 2\r\n\r\nok");
        let (_, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(payload_size, PayloadSize::Length(2));
    }

    #[test]
    fn partial_header_needs_more_data() {
        let mut buf = BytesMut::from("GET /index.html HTTP/1.1\r\nHost: local");
        assert!(HeaderDecoder.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 37);
    }

    #[test]
    fn oversized_header_is_rejected() {
        let mut raw = String::from("GET / HTTP/1.1\r\nX-Padding: ");
        raw.push_str(&"a".repeat(MAX_HEADER_BYTES));
        let mut buf = BytesMut::from(raw.as_str());

        let result = HeaderDecoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::TooLargeHeader { .. })));
    }

    #[test]
    fn invalid_content_length() {
        let mut buf = BytesMut::from("POST /api/upload HTTP/1.1\r\nContent-Length: lots\r\n\r\n");
        let result = HeaderDecoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })));
    }

    #[test]
    fn oversized_content_length_is_rejected() {
        let mut buf = BytesMut::from("POST /api/upload HTTP/1.1\r\nContent-Length: 1099511627776\r\n\r\nxxxx");
        let result = HeaderDecoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::TooLargeBody { declared: 1_099_511_627_776, .. })));

        let at_limit = format!("POST /api/upload HTTP/1.1\r\nContent-Length: {MAX_BODY_BYTES}\r\n\r\n");
        let mut buf = BytesMut::from(at_limit.as_str());
        let (_, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(payload_size, PayloadSize::Length(MAX_BODY_BYTES));
    }

    #[test]
    fn garbage_request_line() {
        let mut buf = BytesMut::from("\x01\x02 nonsense\r\n\r\n");
        assert!(HeaderDecoder.decode(&mut buf).is_err());
    }
}
