use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::article::{Article, ArticlePatch, NewArticle};
use crate::error::StoreError;
use crate::id::{generate_id, now_millis};
use crate::json;
use crate::migrate::migrate_article;
use crate::uploads::Uploads;

/// Name of the collection file inside the data directory.
pub const ARTICLES_FILE: &str = "articles.json";

/// Name of the upload directory inside the data directory.
pub const UPLOADS_DIR: &str = "uploads";

/// The article collection: one JSON array file, newest record first.
///
/// Every mutation reads the whole file, rebuilds the array and overwrites the file.
/// Records an operation does not touch are copied byte for byte. The store does no
/// locking of its own; callers serialize access.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    path: PathBuf,
    uploads: Uploads,
}

impl ArticleStore {
    /// Opens the store rooted at `data_dir`, creating the directory if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|source| StoreError::CreateDir { path: data_dir.clone(), source })?;

        Ok(Self { path: data_dir.join(ARTICLES_FILE), uploads: Uploads::new(data_dir.join(UPLOADS_DIR)) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn uploads(&self) -> &Uploads {
        &self.uploads
    }

    /// All articles, newest first, with inline media migrated.
    ///
    /// The file is rewritten only when migration changed at least one record.
    pub fn list(&self) -> Result<Vec<Article>, StoreError> {
        let text = self.read_collection()?;
        let records = self.records(&text);

        let mut changed = false;
        let mut articles = Vec::with_capacity(records.len());
        let mut rebuilt: Vec<Cow<'_, str>> = Vec::with_capacity(records.len());
        for raw in &records {
            let mut article = Article::from_json(raw);
            if migrate_article(&mut article, &self.uploads) {
                changed = true;
                rebuilt.push(Cow::Owned(article.to_json()));
            } else {
                rebuilt.push(Cow::Borrowed(*raw));
            }
            articles.push(article);
        }

        if changed {
            self.write_collection(&json::join_array(&rebuilt))?;
            info!(count = articles.len(), "persisted migrated articles");
        }
        Ok(articles)
    }

    /// The article with `id`, with inline media migrated and persisted.
    pub fn get(&self, id: &str) -> Result<Article, StoreError> {
        let text = self.read_collection()?;
        let records = self.records(&text);
        let index = position(&records, id).ok_or_else(|| StoreError::not_found(id))?;

        let mut article = Article::from_json(records[index]);
        if migrate_article(&mut article, &self.uploads) {
            let record = article.to_json();
            self.write_collection(&splice(&records, index, Some(record.as_str())))?;
            info!(id, "persisted migrated article");
        }
        Ok(article)
    }

    /// Stores a new article at the head of the collection.
    pub fn create(&self, new_article: NewArticle) -> Result<Article, StoreError> {
        let text = self.read_collection()?;
        let records = self.records(&text);

        let mut id = generate_id();
        while position(&records, &id).is_some() {
            id = generate_id();
        }

        let NewArticle { title, author, body, thumb } = new_article;
        let article = Article { id, title, author, body, thumb, created_at: now_millis(), updated_at: None };

        let record = article.to_json();
        self.write_collection(&json::join_array(std::iter::once(record.as_str()).chain(records.iter().copied())))?;
        info!(id = %article.id, "created article");
        Ok(article)
    }

    /// Applies `patch` to the article with `id` and refreshes `updatedAt`.
    ///
    /// Nothing is written when the id is unknown.
    pub fn update(&self, id: &str, patch: ArticlePatch) -> Result<Article, StoreError> {
        let text = self.read_collection()?;
        let records = self.records(&text);
        let index = position(&records, id).ok_or_else(|| StoreError::not_found(id))?;

        let mut article = Article::from_json(records[index]);
        patch.apply(&mut article);
        article.updated_at = Some(now_millis().max(article.last_modified()));

        let record = article.to_json();
        self.write_collection(&splice(&records, index, Some(record.as_str())))?;
        info!(id, "updated article");
        Ok(article)
    }

    /// `true` when a record with `id` exists. Nothing is migrated or written.
    pub fn contains(&self, id: &str) -> Result<bool, StoreError> {
        let text = self.read_collection()?;
        Ok(position(&self.records(&text), id).is_some())
    }

    /// Removes the article with `id`. Nothing is written when the id is unknown.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let text = self.read_collection()?;
        let records = self.records(&text);
        let index = position(&records, id).ok_or_else(|| StoreError::not_found(id))?;

        self.write_collection(&splice(&records, index, None))?;
        info!(id, "deleted article");
        Ok(())
    }

    /// The record objects of the collection text; malformed text counts as empty.
    fn records<'a>(&self, text: &'a str) -> Vec<&'a str> {
        json::enumerate_array(text).unwrap_or_else(|| {
            if !text.trim().is_empty() {
                warn!(path = %self.path.display(), "collection file is not a json array, treating it as empty");
            }
            Vec::new()
        })
    }

    /// The collection file's text; an absent file reads as empty.
    fn read_collection(&self) -> Result<String, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(StoreError::Read { path: self.path.clone(), source }),
        }
    }

    fn write_collection(&self, text: &str) -> Result<(), StoreError> {
        debug!(path = %self.path.display(), size = text.len(), "writing collection");
        fs::write(&self.path, text).map_err(|source| StoreError::Write { path: self.path.clone(), source })
    }
}

fn position(records: &[&str], id: &str) -> Option<usize> {
    records.iter().position(|raw| json::get_string(raw, "id") == id)
}

/// Rebuilds the array with the record at `index` replaced, or dropped when
/// `replacement` is `None`.
fn splice(records: &[&str], index: usize, replacement: Option<&str>) -> String {
    json::join_array(records.iter().enumerate().filter_map(|(i, raw)| if i == index { replacement } else { Some(*raw) }))
}
