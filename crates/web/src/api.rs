//! Handlers behind the `/api` routes.
//!
//! The store does blocking file I/O and expects callers to serialize access, so every
//! call runs on the blocking pool while holding one shared lock.

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Uri};
use inkwell_store::codec::extension_for_mime;
use inkwell_store::{Article, ArticlePatch, ArticleStore, NewArticle, StoreError, Uploads, json};
use parking_lot::Mutex;
use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, error, warn};

use crate::responder::{self, ResponseBody};

type Response = http::Response<ResponseBody>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid json")]
    InvalidJson,

    #[error("empty upload")]
    EmptyUpload,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to save upload: {0}")]
    Upload(#[from] io::Error),

    #[error("store task failed: {0}")]
    Task(#[from] JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson | Self::EmptyUpload => StatusCode::BAD_REQUEST,
            Self::Store(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Upload(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(cause = %self, "api request failed");
        } else {
            debug!(cause = %self, %status, "api request rejected");
        }

        let message = match &self {
            Self::Store(e) if e.is_not_found() => "not found".to_string(),
            other => other.to_string(),
        };
        responder::json_error(status, &message)
    }
}

#[derive(Debug, Deserialize)]
struct UploadQuery {
    ext: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ArticleApi {
    store: Arc<Mutex<ArticleStore>>,
}

impl ArticleApi {
    pub fn new(store: ArticleStore) -> Self {
        Self { store: Arc::new(Mutex::new(store)) }
    }

    pub fn uploads(&self) -> Uploads {
        self.store.lock().uploads().clone()
    }

    pub async fn list(&self) -> Result<Response, ApiError> {
        let articles = self.run(|store| store.list()).await?;
        let array = json::join_array(articles.iter().map(|article| article.to_json()));
        Ok(responder::json(StatusCode::OK, array))
    }

    pub async fn get(&self, id: &str) -> Result<Response, ApiError> {
        let id = id.to_string();
        let article = self.run(move |store| store.get(&id)).await?;
        Ok(responder::json(StatusCode::OK, article.to_json()))
    }

    pub async fn create(&self, body: &Bytes) -> Result<Response, ApiError> {
        let object = json_object(body)?;
        let new_article = NewArticle::from_json(&object);
        let article = self.run(move |store| store.create(new_article)).await?;
        Ok(responder::json(StatusCode::CREATED, article.to_json()))
    }

    /// An unknown id is reported as 404 even when the body is not a JSON object.
    pub async fn update(&self, id: &str, body: &Bytes) -> Result<Response, ApiError> {
        let patch = json_object(body).map(|object| ArticlePatch::from_json(&object));
        let id = id.to_string();
        let article = self
            .run(move |store: &ArticleStore| -> Result<Article, ApiError> {
                let patch = match patch {
                    Ok(patch) => patch,
                    Err(e) => return Err(if store.contains(&id)? { e } else { StoreError::not_found(&id).into() }),
                };
                store.update(&id, patch).map_err(ApiError::from)
            })
            .await?;
        Ok(responder::json(StatusCode::OK, article.to_json()))
    }

    pub async fn delete(&self, id: &str) -> Result<Response, ApiError> {
        let id = id.to_string();
        self.run(move |store| store.delete(&id)).await?;
        Ok(responder::no_content())
    }

    /// Saves the raw request body as a new upload.
    ///
    /// The file extension comes from `?ext=` when present, else from `Content-Type`.
    pub async fn upload(&self, uri: &Uri, headers: &HeaderMap, body: Bytes) -> Result<Response, ApiError> {
        if body.is_empty() {
            return Err(ApiError::EmptyUpload);
        }

        let extension = upload_extension(uri, headers);
        let url = self.run(move |store| store.uploads().save(&body, &extension)).await?;
        Ok(responder::json(StatusCode::CREATED, serde_json::json!({ "url": url }).to_string()))
    }

    async fn run<T, E, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&ArticleStore) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<ApiError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store.lock())).await?.map_err(Into::into)
    }
}

fn upload_extension(uri: &Uri, headers: &HeaderMap) -> String {
    let query = uri.query().unwrap_or_default();
    let from_query = match serde_urlencoded::from_str::<UploadQuery>(query) {
        Ok(query) => query.ext.filter(|ext| !ext.is_empty()),
        Err(e) => {
            warn!(query, cause = %e, "ignoring malformed upload query");
            None
        }
    };

    from_query.unwrap_or_else(|| {
        let content_type = headers.get(http::header::CONTENT_TYPE).and_then(|value| value.to_str().ok()).unwrap_or_default();
        extension_for_mime(content_type).to_string()
    })
}

/// The body as text when it looks like a JSON object.
fn json_object(body: &Bytes) -> Result<String, ApiError> {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') { Ok(trimmed.to_string()) } else { Err(ApiError::InvalidJson) }
}
