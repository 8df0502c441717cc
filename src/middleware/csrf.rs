//! Anti-forgery tokens for form posts (double-submit cookie).
//!
//! Every visitor gets a random token in an `HttpOnly` cookie. Pages embed the
//! same token in a hidden `_csrf` field of each form; a state-changing
//! request is accepted only when the submitted token equals the cookie.
//! A cross-site form can make the browser send the cookie but cannot read
//! it, so it cannot supply the matching field.
//!
//! The check runs as middleware, before routing, so a rejected request never
//! reaches a handler.

use http::header::SET_COOKIE;
use http::{HeaderValue, Method, StatusCode};
use tracing::{error, warn};
use uuid::Uuid;

use super::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Cookie carrying the session token.
pub const COOKIE_NAME: &str = "_csrf";
/// Form field a page submits the token in.
pub const FIELD_NAME: &str = "_csrf";
/// Headers accepted in place of the form field, for scripted clients.
const HEADER_NAMES: [&str; 3] = ["csrf-token", "x-csrf-token", "x-xsrf-token"];

#[derive(Clone, Debug)]
struct CsrfToken {
    value: String,
    issued: bool,
}

/// The anti-forgery middleware.
pub struct Csrf {
    secure: bool,
    rejection: fn() -> Response,
}

impl Csrf {
    /// `secure` adds the `Secure` attribute to the cookie; turn it off only
    /// for plain-HTTP local development.
    pub fn new(secure: bool) -> Self {
        Self { secure, rejection: default_rejection }
    }

    /// Replaces the default plain-text `403` with a rendered page.
    pub fn rejection(mut self, rejection: fn() -> Response) -> Self {
        self.rejection = rejection;
        self
    }

    fn cookie(&self, token: &str) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!("{COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax{secure}")
    }
}

impl Middleware for Csrf {
    fn before(&self, req: &mut Request) -> Option<Response> {
        let token = match req.cookie(COOKIE_NAME).filter(|t| !t.is_empty()) {
            Some(value) => CsrfToken { value: value.to_owned(), issued: false },
            None => CsrfToken { value: Uuid::new_v4().simple().to_string(), issued: true },
        };

        let verdict = if is_safe(req.method()) {
            None
        } else {
            // A freshly issued token was never seen by the client, so nothing
            // it submitted can match.
            let expected = token.value.as_bytes();
            let valid = !token.issued
                && submitted(req).is_some_and(|s| constant_time_eq(s.as_bytes(), expected));
            if valid {
                None
            } else {
                warn!(
                    method = %req.method(),
                    path = req.path(),
                    "rejected request with invalid csrf token"
                );
                Some((self.rejection)())
            }
        };

        req.extensions_mut().insert(token);
        verdict
    }

    fn after(&self, req: &Request, res: &mut Response) {
        let Some(token) = req.extensions().get::<CsrfToken>().filter(|t| t.issued) else {
            return;
        };
        match HeaderValue::from_str(&self.cookie(&token.value)) {
            Ok(value) => {
                res.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => error!("failed to encode csrf cookie: {e}"),
        }
    }
}

/// The token for this request, to embed in rendered forms.
///
/// Empty when the [`Csrf`] middleware is not installed.
pub fn token(req: &Request) -> &str {
    req.extensions()
        .get::<CsrfToken>()
        .map(|t| t.value.as_str())
        .unwrap_or_default()
}

fn default_rejection() -> Response {
    Response::builder()
        .status(StatusCode::FORBIDDEN)
        .text("Invalid CSRF token")
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn submitted(req: &Request) -> Option<String> {
    HEADER_NAMES
        .iter()
        .find_map(|name| req.header(name))
        .map(str::to_owned)
        .or_else(|| req.form().get(FIELD_NAME).map(str::to_owned))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
