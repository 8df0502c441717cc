//! Health-check handlers and the process-wide readiness flag.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can it serve traffic? Failure → pulled from load-balancer. |
//!
//! Readiness has an explicit lifecycle:
//!
//! 1. [`Readiness::new`]: created not ready, before the listener exists.
//! 2. [`Readiness::mark_ready`]: called by [`Server`](crate::Server) once bound.
//! 3. [`Readiness::mark_draining`]: called on SIGTERM / Ctrl-C; `/readyz`
//!    answers `503` for the rest of the process lifetime.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use http::StatusCode;

use crate::app::AppState;
use crate::{Request, Response};

/// Shared readiness flag. Clones observe the same state.
#[derive(Clone, Debug, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn mark_draining(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Liveness probe. Always `200 OK` with body `"ok"`; if the process can
/// answer HTTP at all, it is alive.
pub async fn liveness(_state: Arc<AppState>, _req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe. `200 "ready"` while serving, `503` before the listener
/// is up and after shutdown has begun.
pub async fn readiness(state: Arc<AppState>, _req: Request) -> Response {
    if state.readiness.is_ready() {
        Response::text("ready")
    } else {
        Response::builder()
            .status(StatusCode::SERVICE_UNAVAILABLE)
            .text("shutting down")
    }
}
