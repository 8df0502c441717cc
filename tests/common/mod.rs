#![allow(dead_code)]

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use taskdeck::{AppState, Config, Readiness, Router, app};

pub const TOKEN: &str = "test-token";

pub struct Page {
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    pub body: String,
}

impl Page {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(http::header::LOCATION).and_then(|v| v.to_str().ok())
    }
}

pub fn router(api_base_url: &str, readiness: Readiness) -> Router<AppState> {
    let url = api_base_url.to_owned();
    let config = Config::from_lookup(move |key| match key {
        "API_BASE_URL" => Some(url.clone()),
        "SHUTDOWN_GRACE_MS" => Some("0".to_owned()),
        _ => None,
    })
    .expect("valid test config");
    app::build(&config, readiness).expect("router builds")
}

pub async fn send(router: &Router<AppState>, req: http::Request<Full<Bytes>>) -> Page {
    let res = router.handle(req).await;
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = res
        .into_body()
        .collect()
        .await
        .expect("infallible body")
        .to_bytes();
    Page { status, headers, body: String::from_utf8(bytes.to_vec()).expect("utf-8 body") }
}

pub async fn get(router: &Router<AppState>, uri: &str) -> Page {
    let req = http::Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .expect("request");
    send(router, req).await
}

/// Form post carrying a valid anti-forgery cookie and field.
pub async fn post_form(router: &Router<AppState>, uri: &str, fields: &[(&str, &str)]) -> Page {
    let mut body = url::form_urlencoded::Serializer::new(String::new());
    body.append_pair("_csrf", TOKEN);
    for (k, v) in fields {
        body.append_pair(k, v);
    }
    let req = http::Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .header("cookie", format!("_csrf={TOKEN}"))
        .body(Full::new(Bytes::from(body.finish())))
        .expect("request");
    send(router, req).await
}
