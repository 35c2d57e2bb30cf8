//! Connection handling.
//!
//! [`HttpConnection`] runs exactly one request/response exchange: it decodes a
//! request, collects its body, invokes the handler, writes the response and shuts
//! the connection down. A request that cannot be parsed closes the connection
//! without any response.

mod http_connection;

pub use http_connection::HttpConnection;
