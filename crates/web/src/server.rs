use std::future::Future;
use std::sync::Arc;

use inkwell_http::connection::HttpConnection;
use inkwell_store::{ArticleStore, StoreError};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::app::App;
use crate::config::Config;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to bind {address}: {source}")]
    Bind { address: String, source: std::io::Error },
}

/// The accept loop. Each connection gets its own task and carries exactly one request.
#[derive(Debug)]
pub struct Server {
    address: String,
    app: Arc<App>,
}

impl Server {
    /// Opens the article store and prepares the application. Does not bind yet.
    pub fn new(config: &Config) -> Result<Self, ServerError> {
        let store = ArticleStore::open(&config.data_dir)?;
        info!(data_dir = %config.data_dir.display(), static_root = %config.static_root.display(), "article store ready");
        Ok(Self { address: config.address(), app: Arc::new(App::new(store, &config.static_root)) })
    }

    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        TcpListener::bind(&self.address)
            .await
            .map_err(|source| ServerError::Bind { address: self.address.clone(), source })
    }

    /// Binds and serves until Ctrl-C.
    pub async fn start(self) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        info!(address = %self.address, "start listening");

        self.serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(cause = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await;
        Ok(())
    }

    /// Accepts connections from `listener` until `shutdown` completes. Connections
    /// already accepted finish on their own tasks.
    pub async fn serve<S>(&self, listener: TcpListener, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let (tcp_stream, remote_addr) = tokio::select! {
                () = &mut shutdown => {
                    info!("shutdown requested, stop accepting connections");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                },
            };

            let app = Arc::clone(&self.app);
            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                match HttpConnection::new(reader, writer).process(app).await {
                    Ok(()) => debug!(%remote_addr, "connection finished"),
                    Err(e) => warn!(%remote_addr, cause = %e, "connection closed without response"),
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::path::PathBuf;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    async fn roundtrip(address: std::net::SocketAddr, raw: &[u8]) -> String {
        let mut stream = TcpStream::connect(address).await.unwrap();
        stream.write_all(raw).await.unwrap();
        let mut output = Vec::new();
        // a reset after a rejected request still leaves `output` with whatever arrived
        let _ = stream.read_to_end(&mut output).await;
        String::from_utf8_lossy(&output).into_owned()
    }

    #[tokio::test]
    async fn serves_over_tcp_until_shutdown() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            port: 0,
            data_dir: tmp.path().join("data"),
            static_root: PathBuf::from(tmp.path()),
            ..Config::default()
        };
        let server = Server::new(&config).unwrap();
        let listener = server.bind().await.unwrap();
        let address = listener.local_addr().unwrap();

        let (stop, stopped) = oneshot::channel::<()>();
        let serving = tokio::spawn(async move {
            server
                .serve(listener, async {
                    let _ = stopped.await;
                })
                .await;
        });

        let body = r#"{"title":"over the wire"}"#;
        let create = format!("POST /api/articles HTTP/1.1\r\nHost: {address}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}", body.len());
        let output = roundtrip(address, create.as_bytes()).await;
        assert!(output.starts_with("HTTP/1.1 201 Created\r\n"), "{output}");
        assert!(output.contains("connection: close\r\n"));
        assert!(output.contains("\"title\":\"over the wire\""));

        let list = indoc! {"
        GET /api/articles HTTP/1.1
        Host: localhost

        "};
        let output = roundtrip(address, list.as_bytes()).await;
        assert!(output.starts_with("HTTP/1.1 200 OK\r\n"), "{output}");
        assert!(output.contains("access-control-allow-origin: *\r\n"));
        assert!(output.contains("date: "));

        let output = roundtrip(address, b"\x16\x03\x01garbage\r\n\r\n").await;
        assert!(output.is_empty());

        stop.send(()).unwrap();
        serving.await.unwrap();
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            port: occupied.local_addr().unwrap().port(),
            data_dir: tmp.path().join("data"),
            ..Config::default()
        };

        let server = Server::new(&config).unwrap();
        assert!(matches!(server.bind().await, Err(ServerError::Bind { .. })));
    }
}
