//! Radix-tree request router with a middleware chain.
//!
//! One tree per HTTP method. O(path-length) lookup. Middleware runs around
//! every request, matched or not; see [`Middleware`].

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use matchit::Router as MatchitRouter;
use tracing::warn;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

type Params = HashMap<String, String>;

/// The application router.
///
/// Owns the shared state `S` handed to every handler. Build it once at
/// startup and pass it to [`Server::serve`](crate::Server::serve).
pub struct Router<S> {
    state: Arc<S>,
    routes: HashMap<Method, MatchitRouter<BoxedHandler<S>>>,
    layers: Vec<Arc<dyn Middleware>>,
    fallback: Option<BoxedHandler<S>>,
}

impl<S: Send + Sync + 'static> Router<S> {
    pub fn new(state: S) -> Self {
        Self {
            state: Arc::new(state),
            routes: HashMap::new(),
            layers: Vec::new(),
            fallback: None,
        }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves
    /// them. Static segments win over parameters, so `/tasks/new` and
    /// `/tasks/{id}` coexist.
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting route. Routes are fixed at
    /// startup, so this is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::POST, path, handler)
    }

    /// Handler for requests no route matches. Defaults to a bare `404`.
    pub fn fallback(mut self, handler: impl Handler<S>) -> Self {
        self.fallback = Some(handler.into_boxed_handler());
        self
    }

    /// Appends a middleware. `before` hooks run in registration order,
    /// `after` hooks in reverse.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler<S>, Params)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Routes one request and produces one response.
    ///
    /// Every failure is turned into a response here; callers never see an
    /// error. Public so tests can drive the full stack without a socket.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(path = parts.uri.path(), "failed to read request body: {e}");
                return Response::status(StatusCode::BAD_REQUEST).into_inner();
            }
        };
        let mut req = Request::from_parts(parts, body);

        let mut short_circuit = None;
        for layer in &self.layers {
            if let Some(res) = layer.before(&mut req) {
                short_circuit = Some(res);
                break;
            }
        }

        let mut res = match short_circuit {
            Some(res) => res,
            None => self.route(req.clone()).await,
        };

        for layer in self.layers.iter().rev() {
            layer.after(&req, &mut res);
        }
        res.into_inner()
    }

    async fn route(&self, mut req: Request) -> Response {
        let state = Arc::clone(&self.state);
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.set_params(params);
                handler.call(state, req).await
            }
            None => match &self.fallback {
                Some(fallback) => fallback.call(state, req).await,
                None => Response::status(StatusCode::NOT_FOUND),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo_id(_state: Arc<()>, req: Request) -> String {
        format!("task {}", req.param("id").unwrap_or("?"))
    }

    async fn new_form(_state: Arc<()>, _req: Request) -> &'static str {
        "new"
    }

    fn get(uri: &str) -> http::Request<Full<Bytes>> {
        http::Request::builder().uri(uri).body(Full::new(Bytes::new())).unwrap()
    }

    async fn body_of(res: http::Response<Full<Bytes>>) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn static_segments_win_over_params() {
        let router = Router::new(())
            .get("/tasks/{id}", echo_id)
            .get("/tasks/new", new_form);

        assert_eq!(body_of(router.handle(get("/tasks/new")).await).await, "new");
        assert_eq!(body_of(router.handle(get("/tasks/42")).await).await, "task 42");
    }

    #[tokio::test]
    async fn unmatched_method_or_path_is_not_found() {
        let router = Router::new(()).get("/tasks/{id}", echo_id);

        let res = router.handle(get("/nope")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let post = http::Request::builder()
            .method(Method::POST)
            .uri("/tasks/1")
            .body(Full::new(Bytes::new()))
            .unwrap();
        assert_eq!(router.handle(post).await.status(), StatusCode::NOT_FOUND);
    }

    struct Deny;

    impl Middleware for Deny {
        fn before(&self, _req: &mut Request) -> Option<Response> {
            Some(Response::status(StatusCode::FORBIDDEN))
        }
    }

    struct Stamp;

    impl Middleware for Stamp {
        fn after(&self, _req: &Request, res: &mut Response) {
            res.headers_mut().insert("x-stamp", http::HeaderValue::from_static("1"));
        }
    }

    #[tokio::test]
    async fn short_circuit_still_runs_after_hooks() {
        let router = Router::new(())
            .layer(Stamp)
            .layer(Deny)
            .get("/tasks/{id}", echo_id);

        let res = router.handle(get("/tasks/1")).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(res.headers()["x-stamp"], "1");
    }
}
