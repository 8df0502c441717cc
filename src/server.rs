//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown and readiness
//!
//! When the process receives **SIGTERM** (or Ctrl-C) the server:
//! 1. Flips the shared [`Readiness`] flag to draining, so `/readyz` starts
//!    answering `503` and the load balancer stops routing new traffic here.
//! 2. Keeps serving for the configured grace period while that propagates.
//! 3. Stops `listener.accept()`.
//! 4. Lets every in-flight connection task run to completion.
//! 5. Returns from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::Error;
use crate::health::Readiness;
use crate::router::Router;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    readiness: Readiness,
    shutdown_grace: Duration,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust,no_run
    /// use taskdeck::Server;
    /// let server = Server::bind(([0, 0, 0, 0], 3100).into());
    /// ```
    pub fn bind(addr: SocketAddr) -> Self {
        Self { addr, readiness: Readiness::new(), shutdown_grace: Duration::ZERO }
    }

    /// The readiness flag to raise once listening and lower on shutdown.
    pub fn readiness(mut self, readiness: Readiness) -> Self {
        self.readiness = readiness;
        self
    }

    /// How long to keep accepting after the shutdown signal, with readiness
    /// already down.
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// the grace period, then all in-flight requests completing).
    pub async fn serve<S>(self, router: Router<S>) -> Result<(), Error>
    where
        S: Send + Sync + 'static,
    {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but shuts down when `signal` resolves.
    pub async fn serve_with_shutdown<S, F>(self, router: Router<S>, signal: F) -> Result<(), Error>
    where
        S: Send + Sync + 'static,
        F: Future<Output = ()> + Send,
    {
        let listener = TcpListener::bind(self.addr).await?;
        let router = Arc::new(router);

        self.readiness.mark_ready();
        info!(addr = %listener.local_addr()?, "taskdeck listening");

        let mut tasks = tokio::task::JoinSet::new();

        let readiness = self.readiness.clone();
        let grace = self.shutdown_grace;
        let shutdown = async move {
            signal.await;
            readiness.mark_draining();
            info!(grace_ms = grace.as_millis() as u64, "shutdown signal received, readiness down");
            tokio::time::sleep(grace).await;
        };
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so an expired grace period stops
                // accepting even while connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { Ok::<_, Infallible>(router.handle(req).await) }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("taskdeck stopped");
        Ok(())
    }
}

/// Resolves on the first shutdown signal the process receives.
///
/// SIGTERM and SIGINT on Unix, Ctrl-C elsewhere. A handler that cannot be
/// installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
