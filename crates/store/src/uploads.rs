//! The directory of media files extracted from articles or uploaded directly.
//!
//! Files are never deleted. Each one is named `<generated-id>.<ext>` and addressed by
//! the relative URL `/uploads/<name>`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::id::generate_id;

/// URL path prefix under which upload files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

const FALLBACK_EXTENSION: &str = "bin";
const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct Uploads {
    dir: PathBuf,
}

impl Uploads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` as a new upload and returns its relative URL.
    pub fn save(&self, bytes: &[u8], extension: &str) -> io::Result<String> {
        fs::create_dir_all(&self.dir)?;
        let name = format!("{}.{}", generate_id(), sanitize_extension(extension));
        fs::write(self.dir.join(&name), bytes)?;
        debug!(name, size = bytes.len(), "saved upload");
        Ok(format!("{UPLOADS_URL_PREFIX}{name}"))
    }

    /// Maps an `/uploads/<name>` URL path to the file behind it.
    ///
    /// Returns `None` for other paths and for names that would leave the directory.
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let name = url_path.strip_prefix(UPLOADS_URL_PREFIX)?;
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        Some(self.dir.join(name))
    }
}

/// Keeps an extension of 1 to 8 ASCII alphanumerics (lower-cased), else `bin`.
pub fn sanitize_extension(extension: &str) -> String {
    let extension = extension.trim().trim_start_matches('.');
    if extension.is_empty() || extension.len() > MAX_EXTENSION_LEN || !extension.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return FALLBACK_EXTENSION.to_string();
    }
    extension.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_writes_file_and_returns_url() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = Uploads::new(tmp.path().join("uploads"));

        let url = uploads.save(b"\x89PNG", "png").unwrap();

        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));
        let path = uploads.resolve(&url).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"\x89PNG");
    }

    #[test]
    fn extensions_are_sanitized() {
        assert_eq!(sanitize_extension("PNG"), "png");
        assert_eq!(sanitize_extension(".webp"), "webp");
        assert_eq!(sanitize_extension("../etc"), "bin");
        assert_eq!(sanitize_extension(""), "bin");
        assert_eq!(sanitize_extension("averyverylongext"), "bin");
    }

    #[test]
    fn resolve_stays_inside_directory() {
        let uploads = Uploads::new("/data/uploads");
        assert_eq!(uploads.resolve("/uploads/a.png"), Some(PathBuf::from("/data/uploads/a.png")));
        assert_eq!(uploads.resolve("/uploads/../articles.json"), None);
        assert_eq!(uploads.resolve("/uploads/.hidden"), None);
        assert_eq!(uploads.resolve("/uploads/"), None);
        assert_eq!(uploads.resolve("/index.html"), None);
    }
}
