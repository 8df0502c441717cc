//! # taskdeck
//!
//! A server-rendered task list in front of a remote task REST API.
//! The API owns the data; taskdeck owns the pages.
//!
//! ## What it does
//!
//! - Renders HTML for listing, viewing, creating, editing and deleting tasks
//! - Turns form posts into REST calls, one call per request
//! - Normalizes untrusted input on the way in ([`tasks::normalize`]):
//!   list parameters degrade to defaults, dates are coerced to the
//!   canonical `YYYY-MM-DDTHH:MM:SS` local shape or rejected with `400`
//! - Turns API payloads into view models on the way out
//!
//! ## What it leaves to others
//!
//! TLS, body-size limits and rate limiting belong to the reverse proxy in
//! front. Persistence, pagination and business rules belong to the API.
//!
//! ## Running
//!
//! ```rust,no_run
//! use taskdeck::{app, Config, Readiness, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), taskdeck::Error> {
//!     let config = Config::from_env()?;
//!     let readiness = Readiness::new();
//!     let router = app::build(&config, readiness.clone())?;
//!
//!     Server::bind(config.addr)
//!         .readiness(readiness)
//!         .shutdown_grace(config.shutdown_grace)
//!         .serve(router)
//!         .await
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod app;
pub mod config;
pub mod health;
pub mod middleware;
pub mod tasks;

pub use app::AppState;
pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use health::Readiness;
pub use request::{FormData, Request};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
