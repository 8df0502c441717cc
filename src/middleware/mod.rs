//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns. Built in:
//!
//! - [`Trace`]: one log line per request with method, path, status and latency
//! - [`Csrf`]: anti-forgery token issue and verification for form posts
//! - [`NoCache`]: forbids caching of every rendered page

use crate::request::Request;
use crate::response::Response;

mod cache;
pub mod csrf;
mod trace;

pub use cache::NoCache;
pub use csrf::Csrf;
pub use trace::Trace;

/// A hook pair run around every request.
///
/// `before` may rewrite the request (for example to attach data in its
/// extensions) or answer it outright by returning a response; later
/// `before` hooks and the handler are then skipped. `after` runs for every
/// registered layer regardless, so logging and headers still apply to
/// short-circuited responses.
pub trait Middleware: Send + Sync + 'static {
    fn before(&self, _req: &mut Request) -> Option<Response> {
        None
    }

    fn after(&self, _req: &Request, _res: &mut Response) {}
}
