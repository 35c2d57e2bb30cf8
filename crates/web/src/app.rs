//! Request dispatch: the `/api` surface, CORS preflight and static files.

use std::convert::Infallible;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::DATE;
use http::{Method, Request, Response, StatusCode};
use inkwell_http::handler::Handler;
use inkwell_store::ArticleStore;
use tracing::debug;

use crate::api::{ApiError, ArticleApi};
use crate::date::DateService;
use crate::responder::{self, ResponseBody};
use crate::router::{ApiRoute, ApiRouter, is_api_path};
use crate::static_files::StaticFiles;

#[derive(Debug)]
pub struct App {
    router: ApiRouter,
    api: ArticleApi,
    static_files: StaticFiles,
}

impl App {
    pub fn new(store: ArticleStore, static_root: impl Into<std::path::PathBuf>) -> Self {
        let api = ArticleApi::new(store);
        let static_files = StaticFiles::new(static_root, api.uploads());
        Self { router: ApiRouter::new(), api, static_files }
    }

    async fn dispatch(&self, req: Request<Bytes>) -> Response<ResponseBody> {
        let path = req.uri().path();

        if req.method() == Method::OPTIONS {
            return responder::no_content();
        }

        if is_api_path(path) {
            return self.api(&req).await.unwrap_or_else(ApiError::into_response);
        }

        if req.method() != Method::GET {
            debug!(method = %req.method(), path, "only GET is served outside /api");
            return responder::text(StatusCode::NOT_FOUND, "not found");
        }

        self.static_files.serve(path).await
    }

    async fn api(&self, req: &Request<Bytes>) -> Result<Response<ResponseBody>, ApiError> {
        let method = req.method();
        let Some(route) = self.router.at(req.uri().path()) else {
            return Ok(api_not_found());
        };

        match (route, method) {
            (ApiRoute::Articles, &Method::GET) => self.api.list().await,
            (ApiRoute::Articles, &Method::POST) => self.api.create(req.body()).await,
            (ApiRoute::Article { id }, &Method::GET) => self.api.get(id).await,
            (ApiRoute::Article { id }, &Method::PUT) => self.api.update(id, req.body()).await,
            (ApiRoute::Article { id }, &Method::DELETE) => self.api.delete(id).await,
            (ApiRoute::Upload, &Method::POST) => self.api.upload(req.uri(), req.headers(), req.body().clone()).await,
            _ => Ok(api_not_found()),
        }
    }
}

fn api_not_found() -> Response<ResponseBody> {
    responder::json_error(StatusCode::NOT_FOUND, "not found")
}

#[async_trait]
impl Handler for App {
    type RespBody = ResponseBody;
    type Error = Infallible;

    async fn call(&self, req: Request<Bytes>) -> Result<Response<Self::RespBody>, Self::Error> {
        let mut response = self.dispatch(req).await;
        if let Some(date) = DateService::get_global_instance().header_value() {
            response.headers_mut().insert(DATE, date);
        }
        Ok(response)
    }
}
