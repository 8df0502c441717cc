//! Application assembly: shared state, middleware and routes.

use std::sync::Arc;

use http::StatusCode;

use crate::config::Config;
use crate::error::Error;
use crate::health::{self, Readiness};
use crate::middleware::{Csrf, NoCache, Trace};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::tasks::{self, TaskApi, views};

/// State shared by every handler.
pub struct AppState {
    pub api: TaskApi,
    pub readiness: Readiness,
}

/// Builds the full router for `config`.
///
/// `readiness` is the same flag handed to the [`Server`](crate::Server), so
/// `/readyz` reflects the server's lifecycle.
pub fn build(config: &Config, readiness: Readiness) -> Result<Router<AppState>, Error> {
    let state = AppState { api: TaskApi::new(&config.api_base_url)?, readiness };

    let router = Router::new(state)
        .layer(Trace)
        .layer(NoCache)
        .layer(Csrf::new(!config.is_development()).rejection(csrf_rejected))
        .get("/", home)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
        .fallback(not_found);

    Ok(tasks::routes(router))
}

async fn home(_state: Arc<AppState>, _req: Request) -> Response {
    Response::redirect("/tasks")
}

async fn not_found(_state: Arc<AppState>, _req: Request) -> Response {
    views::error_page(StatusCode::NOT_FOUND, "Page not found")
}

fn csrf_rejected() -> Response {
    views::error_page(StatusCode::FORBIDDEN, "Invalid CSRF token")
}
