//! Lazy migration of inline `data:` media into upload files.
//!
//! A record's `thumb` field and every `src="..."` / `src='...'` attribute in its
//! `body` are inspected. Each `data:` URI is decoded, written as an upload and
//! replaced by the upload's relative URL; rewritten attributes always use double
//! quotes. References that fail to decode or persist are left exactly as they were.
//!
//! Migration only rewrites media references. It leaves `updatedAt` alone, so the
//! timestamp keeps reflecting edits made by clients.

use tracing::{debug, warn};

use crate::article::Article;
use crate::codec::{self, DataUrl};
use crate::uploads::Uploads;

const SRC_ATTRIBUTE: &str = "src=";

/// Migrates `thumb` and `body` in place. Returns `true` if either field changed.
pub fn migrate_article(article: &mut Article, uploads: &Uploads) -> bool {
    let mut changed = false;

    if let Some(thumb) = migrate_thumb(&article.thumb, uploads) {
        article.thumb = thumb;
        changed = true;
    }
    if let Some(body) = migrate_body(&article.body, uploads) {
        article.body = body;
        changed = true;
    }

    if changed {
        debug!(id = %article.id, "migrated inline media");
    }
    changed
}

/// The upload URL replacing a `data:` thumbnail, or `None` when nothing changes.
pub fn migrate_thumb(thumb: &str, uploads: &Uploads) -> Option<String> {
    if !codec::is_data_url(thumb) {
        return None;
    }
    persist_data_url(thumb, uploads)
}

/// The body with every `data:` `src` attribute rewritten, or `None` when nothing
/// changes.
pub fn migrate_body(body: &str, uploads: &Uploads) -> Option<String> {
    if !body.contains(SRC_ATTRIBUTE) {
        return None;
    }

    let mut migrated = String::with_capacity(body.len());
    let mut changed = false;
    let mut rest = body;

    while let Some(pos) = rest.find(SRC_ATTRIBUTE) {
        let (head, attribute) = rest.split_at(pos + SRC_ATTRIBUTE.len());
        migrated.push_str(head);

        let quote = match attribute.chars().next() {
            Some(quote @ ('"' | '\'')) => quote,
            _ => {
                rest = attribute;
                continue;
            }
        };
        let Some(len) = attribute[1..].find(quote) else {
            rest = attribute;
            break;
        };

        let value = &attribute[1..=len];
        let replacement = if codec::is_data_url(value) { persist_data_url(value, uploads) } else { None };
        match replacement {
            Some(url) => {
                migrated.push('"');
                migrated.push_str(&url);
                migrated.push('"');
                changed = true;
            }
            None => migrated.push_str(&attribute[..len + 2]),
        }
        rest = &attribute[len + 2..];
    }
    migrated.push_str(rest);

    changed.then_some(migrated)
}

fn persist_data_url(uri: &str, uploads: &Uploads) -> Option<String> {
    let data_url = match DataUrl::parse(uri) {
        Ok(data_url) => data_url,
        Err(e) => {
            debug!(cause = %e, "leaving unrecognized data url untouched");
            return None;
        }
    };

    let Some(bytes) = data_url.decode() else {
        debug!(mime = data_url.mime(), "leaving undecodable data url untouched");
        return None;
    };

    match uploads.save(&bytes, codec::extension_for_mime(data_url.mime())) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(cause = %e, dir = %uploads.dir().display(), "failed to persist inline media");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";
    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn uploads() -> (tempfile::TempDir, Uploads) {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = Uploads::new(tmp.path().join("uploads"));
        (tmp, uploads)
    }

    #[test]
    fn thumb_is_written_out() {
        let (_tmp, uploads) = uploads();

        let url = migrate_thumb(PNG, &uploads).unwrap();

        assert!(url.starts_with("/uploads/") && url.ends_with(".png"));
        assert_eq!(fs::read(uploads.resolve(&url).unwrap()).unwrap(), PNG_BYTES);
    }

    #[test]
    fn plain_thumb_is_untouched() {
        let (_tmp, uploads) = uploads();
        assert_eq!(migrate_thumb("/uploads/a.png", &uploads), None);
        assert_eq!(migrate_thumb("", &uploads), None);
    }

    #[test]
    fn invalid_payload_is_untouched() {
        let (_tmp, uploads) = uploads();
        assert_eq!(migrate_thumb("data:image/png;base64,###", &uploads), None);
        assert_eq!(migrate_thumb("data:image/png;base64", &uploads), None);
        assert!(!uploads.dir().exists());
    }

    #[test]
    fn body_sources_are_rewritten() {
        let (_tmp, uploads) = uploads();
        let body = format!("<p>a</p><img src='{PNG}' alt=\"x\"><img src=\"https://example.com/b.gif\"><img src=\"{PNG}\">");

        let migrated = migrate_body(&body, &uploads).unwrap();

        assert!(!migrated.contains("data:"));
        assert!(migrated.starts_with("<p>a</p><img src=\"/uploads/"));
        assert!(migrated.contains(".png\" alt=\"x\"><img src=\"https://example.com/b.gif\"><img src=\"/uploads/"));
        assert_eq!(fs::read_dir(uploads.dir()).unwrap().count(), 2);
    }

    #[test]
    fn undecodable_source_keeps_original_quoting() {
        let (_tmp, uploads) = uploads();
        let body = format!("<img src='data:image/png;base64,!!'><img src='{PNG}'>");

        let migrated = migrate_body(&body, &uploads).unwrap();

        assert!(migrated.starts_with("<img src='data:image/png;base64,!!'><img src=\"/uploads/"));
    }

    #[test]
    fn unquoted_and_unterminated_attributes_pass_through() {
        let (_tmp, uploads) = uploads();
        assert_eq!(migrate_body("<img src=foo.png><img src=\"data:x", &uploads), None);
    }

    #[test]
    fn migration_is_idempotent() {
        let (_tmp, uploads) = uploads();
        let mut article = Article { thumb: PNG.into(), body: format!("<img src=\"{PNG}\">"), ..Default::default() };

        assert!(migrate_article(&mut article, &uploads));
        let once = article.clone();
        assert!(!migrate_article(&mut article, &uploads));
        assert_eq!(article, once);
        assert_eq!(article.updated_at, None);
    }
}
