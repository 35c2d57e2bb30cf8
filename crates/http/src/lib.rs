//! The HTTP/1.1 transport used by the inkwell article server.
//!
//! The transport terminates one connection at a time from the point of view of a
//! request: it decodes exactly one request, hands it to a [`handler::Handler`],
//! writes exactly one response and closes the connection. There is no keep-alive
//! and no chunked transfer encoding; request bodies are framed by `Content-Length`
//! only.
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::{Request, Response, StatusCode};
//! use http_body_util::Full;
//! use std::error::Error;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//! use inkwell_http::connection::HttpConnection;
//! use inkwell_http::handler::make_handler;
//!
//! #[tokio::main]
//! async fn main() {
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             if let Err(e) = HttpConnection::new(reader, writer).process(handler).await {
//!                 info!(cause = %e, "connection closed with error");
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request<Bytes>) -> Result<Response<Full<Bytes>>, Box<dyn Error + Send + Sync>> {
//!     info!(path = request.uri().path(), body_len = request.body().len(), "receive request");
//!     Ok(Response::builder().status(StatusCode::OK).body(Full::new(Bytes::from_static(b"Hello World!\r\n")))?)
//! }
//! ```
//!
//! # Modules
//!
//! - [`connection`]: single request/response exchange over any async stream pair
//! - [`codec`]: request decoding and response encoding
//! - [`protocol`]: message types and errors
//! - [`handler`]: the request handler trait
//!
//! # Limits
//!
//! - Maximum header size: 8KB
//! - Maximum number of headers: 64
//! - A request body shorter than its `Content-Length` (peer closed early) is delivered truncated

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
