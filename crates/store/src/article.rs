use crate::json;

/// One persisted article record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub author: String,
    pub body: String,
    pub thumb: String,
    /// milliseconds since the Unix epoch, set once at creation
    pub created_at: i64,
    /// milliseconds since the Unix epoch of the last edit, `None` until the first one
    pub updated_at: Option<i64>,
}

impl Article {
    /// Reads a record object. Missing fields default to empty strings; an absent or
    /// non-positive `updatedAt` reads as `None`.
    pub fn from_json(object: &str) -> Self {
        Self {
            id: json::get_string(object, "id"),
            title: json::get_string(object, "title"),
            author: json::get_string(object, "author"),
            body: json::get_string(object, "body"),
            thumb: json::get_string(object, "thumb"),
            created_at: json::get_number(object, "createdAt"),
            updated_at: Some(json::get_number(object, "updatedAt")).filter(|t| *t > 0),
        }
    }

    pub fn to_json(&self) -> String {
        json::build_record(self)
    }

    /// The most recent of `createdAt` and `updatedAt`.
    pub fn last_modified(&self) -> i64 {
        self.updated_at.map_or(self.created_at, |updated_at| updated_at.max(self.created_at))
    }
}

/// Client-supplied fields of an article about to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewArticle {
    pub title: String,
    pub author: String,
    pub body: String,
    pub thumb: String,
}

impl NewArticle {
    pub fn from_json(object: &str) -> Self {
        Self {
            title: json::get_string(object, "title"),
            author: json::get_string(object, "author"),
            body: json::get_string(object, "body"),
            thumb: json::get_string(object, "thumb"),
        }
    }
}

/// A partial update: only fields that are present and non-empty overwrite the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub body: Option<String>,
    pub thumb: Option<String>,
}

impl ArticlePatch {
    pub fn from_json(object: &str) -> Self {
        let field = |key: &str| Some(json::get_string(object, key)).filter(|value| !value.is_empty());
        Self { title: field("title"), author: field("author"), body: field("body"), thumb: field("thumb") }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.body.is_none() && self.thumb.is_none()
    }

    /// Overwrites the fields carried by the patch. `id` and timestamps are untouched.
    pub fn apply(self, article: &mut Article) {
        let Self { title, author, body, thumb } = self;
        for (value, target) in [(title, &mut article.title), (author, &mut article.author), (body, &mut article.body), (thumb, &mut article.thumb)] {
            if let Some(value) = value.filter(|value| !value.is_empty()) {
                *target = value;
            }
        }
    }
}
