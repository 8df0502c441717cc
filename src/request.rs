//! Incoming HTTP request type and URL-encoded form data.

use std::collections::HashMap;

use bytes::Bytes;
use http::{Extensions, HeaderMap, Method, Uri};
use serde_json::{Map, Value};
use tracing::debug;

/// An incoming HTTP request with its body fully buffered.
///
/// Cloning is cheap: the body is a reference-counted [`Bytes`].
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    extensions: Extensions,
    body: Bytes,
    params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            extensions: parts.extensions,
            body,
            params: HashMap::new(),
        }
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }

    /// Header lookup. Values that are not visible ASCII are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/tasks/{id}`, `req.param("id")` on `/tasks/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Decoded query string. Empty when the URI has none.
    pub fn query(&self) -> FormData {
        FormData::parse(self.uri.query().unwrap_or_default().as_bytes())
    }

    /// Decoded request body, from a urlencoded form or a JSON object.
    ///
    /// A body without a content type is read as a form. JSON members that are
    /// not strings are skipped. Any other body decodes to an empty set.
    pub fn form(&self) -> FormData {
        let content_type = self.header("content-type").map(str::trim_start);
        match content_type {
            None => FormData::parse(&self.body),
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                FormData::parse(&self.body)
            }
            Some(ct) if ct.starts_with("application/json") => FormData::from_json(&self.body),
            Some(_) => FormData::default(),
        }
    }

    /// Returns the value of a cookie sent with the request.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(http::header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }
}

/// Key/value pairs decoded from a query string or form body.
///
/// A key sent more than once is kept, but [`FormData::get`] treats it as
/// absent: a repeated key is a list, not a string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormData(HashMap<String, Vec<String>>);

impl FormData {
    pub fn parse(input: &[u8]) -> Self {
        url::form_urlencoded::parse(input).into_owned().collect()
    }

    /// String members of a JSON object. Anything but an object is empty.
    pub fn from_json(input: &[u8]) -> Self {
        match serde_json::from_slice::<Map<String, Value>>(input) {
            Ok(object) => object
                .into_iter()
                .filter_map(|(k, v)| match v {
                    Value::String(s) => Some((k, s)),
                    _ => None,
                })
                .collect(),
            Err(e) => {
                debug!("ignoring undecodable json body: {e}");
                Self::default()
            }
        }
    }

    /// The value of `key` when it was sent exactly once.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.0.get(key).map(Vec::as_slice) {
            Some([value]) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (k, v) in iter {
            map.entry(k.into()).or_default().push(v.into());
        }
        Self(map)
    }
}
