//! The inkwell article server.
//!
//! Serves a JSON article API under `/api` and static files everywhere else, on top of
//! the one-request-per-connection transport in `inkwell-http` and the flat-file store
//! in `inkwell-store`.
//!
//! | method | path                  | result                                   |
//! |--------|-----------------------|------------------------------------------|
//! | GET    | `/api/articles`       | all articles, newest first               |
//! | POST   | `/api/articles`       | `201` with the created article           |
//! | GET    | `/api/articles/{id}`  | one article, or `404`                    |
//! | PUT    | `/api/articles/{id}`  | the patched article, or `404`            |
//! | DELETE | `/api/articles/{id}`  | `204`, or `404`                          |
//! | POST   | `/api/upload`         | `201` with `{"url":"/uploads/<file>"}`   |
//! | OPTIONS| any                   | `204` CORS preflight                     |
//! | GET    | anything else         | a static file, `/` being `index.html`    |
//!
//! ```no_run
//! use inkwell_web::{Config, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     Server::new(&config)?.start().await?;
//!     Ok(())
//! }
//! ```

mod api;
mod app;
mod date;
mod responder;
mod router;
mod server;
mod static_files;

pub mod config;

pub use app::App;
pub use config::{Config, ConfigError};
pub use server::{Server, ServerError};
