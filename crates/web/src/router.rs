//! Path matching for the `/api` surface.

use matchit::Router;
use tracing::error;

/// A matched API endpoint. `Article` borrows its id from the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRoute<'path> {
    Articles,
    Article { id: &'path str },
    Upload,
}

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Articles,
    Article,
    Upload,
}

#[derive(Debug)]
pub struct ApiRouter {
    inner: Router<Endpoint>,
}

impl ApiRouter {
    pub fn new() -> Self {
        let mut inner = Router::new();
        for (path, endpoint) in
            [("/api/articles", Endpoint::Articles), ("/api/articles/{id}", Endpoint::Article), ("/api/upload", Endpoint::Upload)]
        {
            if let Err(e) = inner.insert(path, endpoint) {
                error!(path, cause = %e, "failed to register api route");
            }
        }
        Self { inner }
    }

    /// Matches `path` against the API endpoints. Unknown paths yield `None`.
    pub fn at<'path>(&self, path: &'path str) -> Option<ApiRoute<'path>> {
        let matched = self.inner.at(path).ok()?;
        match matched.value {
            Endpoint::Articles => Some(ApiRoute::Articles),
            Endpoint::Article => matched.params.get("id").map(|id| ApiRoute::Article { id }),
            Endpoint::Upload => Some(ApiRoute::Upload),
        }
    }
}

impl Default for ApiRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// `true` for `/api` and everything below it.
pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}
