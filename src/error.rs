//! Unified infrastructure error type.

use thiserror::Error;

/// The error type returned by taskdeck's fallible startup and serving paths.
///
/// Request-level failures (validation, downstream API errors) are expressed
/// as HTTP [`Response`](crate::Response) values through
/// [`TaskError`](crate::tasks::TaskError), not as `Error`s. This type surfaces
/// infrastructure failures: reading configuration, building the outbound
/// HTTP client, binding to a port.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid {key}: {message}")]
    Config { key: &'static str, message: String },

    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),
}
