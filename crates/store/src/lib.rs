//! Storage side of the inkwell article server.
//!
//! Articles live in a single JSON array file (`articles.json`) inside a data
//! directory. Every mutation reads the whole file, rebuilds the array in memory and
//! overwrites the file. Records are handled with a schema-specific JSON reader and
//! writer ([`json`]) instead of a generic parse tree.
//!
//! Article fields may embed media inline as `data:` URIs. On read, the
//! [`migrate`] step decodes those payloads ([`codec`]), writes them into the
//! `uploads/` directory ([`uploads`]) and rewrites the references to relative
//! `/uploads/...` URLs, persisting the rewritten record.
//!
//! ```no_run
//! use inkwell_store::{ArticlePatch, ArticleStore, NewArticle};
//!
//! # fn main() -> Result<(), inkwell_store::StoreError> {
//! let store = ArticleStore::open("./data")?;
//! let created = store.create(NewArticle::from_json(r#"{"title":"hello","author":"me"}"#))?;
//! store.update(&created.id, ArticlePatch::from_json(r#"{"title":"hello again"}"#))?;
//! for article in store.list()? {
//!     println!("{} {}", article.id, article.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod json;
pub mod migrate;
pub mod uploads;

mod article;
mod error;
mod id;
mod store;

pub use article::{Article, ArticlePatch, NewArticle};
pub use error::StoreError;
pub use id::{generate_id, now_millis};
pub use store::{ARTICLES_FILE, ArticleStore, UPLOADS_DIR};
pub use uploads::Uploads;
