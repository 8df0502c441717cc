//! Runtime configuration from environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `BIND_HOST` | `0.0.0.0` | Interface to listen on |
//! | `PORT` | `3100` | Port to listen on |
//! | `API_BASE_URL` | `http://localhost:4000` | Root of the task REST API |
//! | `APP_ENV` | `development` | Anything else marks cookies `Secure` |
//! | `SHUTDOWN_GRACE_MS` | `4000` | Serve time with readiness down before stopping |
//!
//! `main` loads a `.env` file first, if one exists.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use url::Url;

use crate::error::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3100;
const DEFAULT_API_BASE_URL: &str = "http://localhost:4000";
const DEFAULT_ENV: &str = "development";
const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 4000;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    /// Base URL of the task API, without a trailing slash.
    pub api_base_url: String,
    pub environment: String,
    pub shutdown_grace: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Unset and
    /// blank values take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let host: IpAddr = parse("BIND_HOST", get("BIND_HOST"), DEFAULT_HOST.parse().ok())?;
        let port: u16 = parse("PORT", get("PORT"), Some(DEFAULT_PORT))?;
        let grace_ms: u64 = parse(
            "SHUTDOWN_GRACE_MS",
            get("SHUTDOWN_GRACE_MS"),
            Some(DEFAULT_SHUTDOWN_GRACE_MS),
        )?;

        let api_base_url = get("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let parsed = Url::parse(&api_base_url).map_err(|e| Error::Config {
            key: "API_BASE_URL",
            message: format!("{api_base_url:?}: {e}"),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config {
                key: "API_BASE_URL",
                message: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        Ok(Self {
            addr: SocketAddr::new(host, port),
            api_base_url: api_base_url.trim_end_matches('/').to_owned(),
            environment: get("APP_ENV").unwrap_or_else(|| DEFAULT_ENV.to_owned()),
            shutdown_grace: Duration::from_millis(grace_ms),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == DEFAULT_ENV
    }
}

fn parse<T>(key: &'static str, raw: Option<String>, default: Option<T>) -> Result<T, Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config { key, message: format!("{raw:?}: {e}") }),
        None => default.ok_or_else(|| Error::Config { key, message: "missing".to_owned() }),
    }
}
