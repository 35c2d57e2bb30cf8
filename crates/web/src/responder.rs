//! Builders for the few response shapes the server produces.

use bytes::Bytes;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_TYPE,
};
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use http_body_util::Full;
use mime::Mime;

pub type ResponseBody = Full<Bytes>;

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type";
const IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// A JSON response carrying the cross-origin headers.
pub fn json(status: StatusCode, body: impl Into<Bytes>) -> Response<ResponseBody> {
    let mut response = with_status(status, Full::new(body.into()));
    response.headers_mut().insert(CONTENT_TYPE, content_type(&mime::APPLICATION_JSON));
    add_cors(response.headers_mut());
    response
}

/// `{"error":"<message>"}` with the given status.
pub fn json_error(status: StatusCode, message: &str) -> Response<ResponseBody> {
    json(status, serde_json::json!({ "error": message }).to_string())
}

/// An empty 204 carrying the cross-origin headers. Answers preflight requests and deletes.
pub fn no_content() -> Response<ResponseBody> {
    let mut response = with_status(StatusCode::NO_CONTENT, Full::default());
    add_cors(response.headers_mut());
    response
}

pub fn text(status: StatusCode, body: &'static str) -> Response<ResponseBody> {
    let mut response = with_status(status, Full::new(Bytes::from_static(body.as_bytes())));
    response.headers_mut().insert(CONTENT_TYPE, content_type(&mime::TEXT_PLAIN_UTF_8));
    response
}

/// File contents, optionally marked as never changing.
pub fn file(mime: &Mime, contents: Bytes, immutable: bool) -> Response<ResponseBody> {
    let mut response = with_status(StatusCode::OK, Full::new(contents));
    response.headers_mut().insert(CONTENT_TYPE, content_type(mime));
    if immutable {
        response.headers_mut().insert(CACHE_CONTROL, HeaderValue::from_static(IMMUTABLE));
    }
    response
}

pub fn add_cors(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
}

fn with_status(status: StatusCode, body: ResponseBody) -> Response<ResponseBody> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}

fn content_type(mime: &Mime) -> HeaderValue {
    HeaderValue::from_str(mime.as_ref()).unwrap_or(HeaderValue::from_static("application/octet-stream"))
}
