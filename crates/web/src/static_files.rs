//! Serving files from the static root and the uploads directory.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use http::StatusCode;
use inkwell_store::Uploads;
use inkwell_store::uploads::UPLOADS_URL_PREFIX;
use mime::Mime;
use tracing::{debug, warn};

use crate::responder::{self, ResponseBody};

const INDEX_FILE: &str = "index.html";

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    uploads: Uploads,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, uploads: Uploads) -> Self {
        Self { root: root.into(), uploads }
    }

    /// Answers a `GET` for `uri_path`.
    ///
    /// The path is percent-decoded first. Any `..` is refused with 400. Files under
    /// `/uploads/` come from the uploads directory and are cacheable forever; the rest
    /// come from the static root without cache directives.
    pub async fn serve(&self, uri_path: &str) -> http::Response<ResponseBody> {
        let Ok(path) = urlencoding::decode(uri_path) else {
            return responder::text(StatusCode::BAD_REQUEST, "bad request");
        };
        if path.contains("..") {
            debug!(path = %path, "refusing parent directory traversal");
            return responder::text(StatusCode::BAD_REQUEST, "bad request");
        }

        let (file, immutable) = if path.starts_with(UPLOADS_URL_PREFIX) {
            match self.uploads.resolve(&path) {
                Some(file) => (file, true),
                None => return not_found(),
            }
        } else if path == "/" {
            (self.root.join(INDEX_FILE), false)
        } else {
            (self.root.join(path.trim_start_matches('/')), false)
        };

        match tokio::fs::read(&file).await {
            Ok(contents) => responder::file(&mime_for_path(&file), Bytes::from(contents), immutable),
            Err(e) => {
                if e.kind() == io::ErrorKind::NotFound {
                    debug!(file = %file.display(), "static file not found");
                } else {
                    warn!(file = %file.display(), cause = %e, "failed to read static file");
                }
                not_found()
            }
        }
    }
}

fn not_found() -> http::Response<ResponseBody> {
    responder::text(StatusCode::NOT_FOUND, "not found")
}

/// Media type guessed from the file extension; unknown extensions are `application/octet-stream`.
pub fn mime_for_path(path: &Path) -> Mime {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default().to_ascii_lowercase();
    match extension.as_str() {
        "html" | "htm" => mime::TEXT_HTML_UTF_8,
        "css" => mime::TEXT_CSS_UTF_8,
        "js" | "mjs" => mime::APPLICATION_JAVASCRIPT_UTF_8,
        "json" => mime::APPLICATION_JSON,
        "txt" => mime::TEXT_PLAIN_UTF_8,
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "svg" => mime::IMAGE_SVG,
        "bmp" => mime::IMAGE_BMP,
        "woff" => mime::FONT_WOFF,
        "woff2" => mime::FONT_WOFF2,
        "pdf" => mime::APPLICATION_PDF,
        "webp" => parse_or_binary("image/webp"),
        "ico" => parse_or_binary("image/x-icon"),
        "webmanifest" => parse_or_binary("application/manifest+json"),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

fn parse_or_binary(essence: &str) -> Mime {
    essence.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
}
