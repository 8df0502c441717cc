use std::time::Instant;

use tracing::{info, warn};

use super::Middleware;
use crate::request::Request;
use crate::response::Response;

#[derive(Clone, Copy)]
struct Started(Instant);

/// Per-request access log: method, path, status and latency.
///
/// Register it first so its latency covers every other layer.
pub struct Trace;

impl Middleware for Trace {
    fn before(&self, req: &mut Request) -> Option<Response> {
        req.extensions_mut().insert(Started(Instant::now()));
        None
    }

    fn after(&self, req: &Request, res: &mut Response) {
        let latency_ms = req
            .extensions()
            .get::<Started>()
            .map(|s| s.0.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or_default();
        let status = res.status_code().as_u16();

        if res.status_code().is_server_error() {
            warn!(method = %req.method(), path = req.path(), status, latency_ms, "request failed");
        } else {
            info!(method = %req.method(), path = req.path(), status, latency_ms, "request");
        }
    }
}
