use std::cmp;
use std::error::Error;
use std::fmt::Display;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use http::{Request, Response, StatusCode};
use http_body::Body;
use http_body_util::{BodyExt, Empty};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error};

use crate::codec::{MAX_BODY_BYTES, RequestDecoder, ResponseEncoder};
use crate::ensure;
use crate::handler::Handler;
use crate::protocol::{HttpError, Message, ParseError, PayloadItem, PayloadSize, ResponseHead, SendError};

/// Upper bound for the body buffer reserved up front from `Content-Length`.
const MAX_BODY_RESERVE: u64 = 1024 * 1024;

/// A single request/response exchange over an async reader/writer pair.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), 8 * 1024),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
        }
    }

    /// Reads one request, answers it with `handler` and closes the write half.
    ///
    /// A peer that disconnects before sending anything is not an error. A request
    /// that fails to parse is returned as an error without writing a response.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
        H::RespBody: Body<Data = Bytes>,
        <H::RespBody as Body>::Error: Display,
    {
        let Some(request) = self.read_request().await? else {
            debug!("peer closed before sending a request");
            return Ok(());
        };

        debug!(method = %request.method(), uri = %request.uri(), body_len = request.body().len(), "received request");

        let response_result = handler.call(request).await;
        self.send_response(response_result).await?;

        self.framed_write.get_mut().shutdown().await.map_err(SendError::io)?;
        Ok(())
    }

    async fn read_request(&mut self) -> Result<Option<Request<Bytes>>, ParseError> {
        let (header, payload_size) = match self.framed_read.next().await {
            Some(Ok(Message::Header(header))) => header,
            Some(Ok(Message::Payload(_))) => return Err(ParseError::invalid_body("need header while receive body")),
            Some(Err(e)) => return Err(e),
            None => return Ok(None),
        };

        if payload_size.is_empty() {
            return Ok(Some(header.body(Bytes::new())));
        }

        let mut body = BytesMut::with_capacity(cmp::min(payload_size.length(), MAX_BODY_RESERVE) as usize);
        loop {
            match self.framed_read.next().await {
                Some(Ok(Message::Payload(PayloadItem::Chunk(bytes)))) => {
                    let received = (body.len() + bytes.len()) as u64;
                    ensure!(received <= MAX_BODY_BYTES, ParseError::too_large_body(received, MAX_BODY_BYTES));
                    body.extend_from_slice(&bytes);
                }
                Some(Ok(Message::Payload(PayloadItem::Eof))) | None => break,
                Some(Ok(Message::Header(_))) => return Err(ParseError::invalid_body("receive header while reading body")),
                Some(Err(e)) => return Err(e),
            }
        }

        if (body.len() as u64) < payload_size.length() {
            debug!(expected = payload_size.length(), received = body.len(), "request body truncated");
        }

        Ok(Some(header.body(body.freeze())))
    }

    async fn send_response<T, E>(&mut self, response_result: Result<Response<T>, E>) -> Result<(), HttpError>
    where
        T: Body<Data = Bytes>,
        T::Error: Display,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        match response_result {
            Ok(response) => self.do_send_response(response).await,
            Err(e) => {
                error!("handle response error, cause: {}", e.into());
                self.do_send_response(build_error_response(StatusCode::INTERNAL_SERVER_ERROR)).await
            }
        }
    }

    async fn do_send_response<T>(&mut self, response: Response<T>) -> Result<(), HttpError>
    where
        T: Body<Data = Bytes>,
        T::Error: Display,
    {
        let (header_parts, body) = response.into_parts();

        let payload = body
            .collect()
            .await
            .map_err(|e| SendError::invalid_body(format!("resolve response body error: {e}")))?
            .to_bytes();

        let payload_size = PayloadSize::from_length(payload.len() as u64);
        let head = ResponseHead::from_parts(header_parts, ());

        self.framed_write.feed(Message::<_, Bytes>::Header((head, payload_size))).await?;
        if !payload.is_empty() {
            self.framed_write.feed(Message::<(ResponseHead, PayloadSize), _>::Payload(PayloadItem::Chunk(payload))).await?;
        }
        // send flushes everything fed so far
        self.framed_write.send(Message::<(ResponseHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof)).await?;
        Ok(())
    }
}

fn build_error_response(status_code: StatusCode) -> Response<Empty<Bytes>> {
    let mut response = Response::new(Empty::<Bytes>::new());
    *response.status_mut() = status_code;
    response
}
