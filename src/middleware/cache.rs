use http::HeaderValue;
use http::header::CACHE_CONTROL;

use super::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Marks every response as uncacheable. Pages embed per-session
/// anti-forgery tokens and live task data.
pub struct NoCache;

impl Middleware for NoCache {
    fn after(&self, _req: &Request, res: &mut Response) {
        res.headers_mut().insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, max-age=0, must-revalidate, no-store"),
        );
    }
}
