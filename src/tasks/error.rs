use http::StatusCode;
use thiserror::Error;
use tracing::{error, warn};

use super::views;
use crate::response::{IntoResponse, Response};

/// Why a task request could not be completed.
///
/// Validation variants are raised before any call to the API and render as
/// `400`; a failed API call renders as `500` with its context and the
/// underlying error text.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{field} is required")]
    MissingRequiredField { field: &'static str },

    #[error("{field} must be a valid date")]
    InvalidDateTime { field: &'static str, value: String },

    #[error("Task not found")]
    UnknownTask { id: String },

    #[error("{context}: {source}")]
    DownstreamFailure {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl TaskError {
    /// Adapter for `map_err` on API calls.
    pub(crate) fn downstream(context: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::DownstreamFailure { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingRequiredField { .. } | Self::InvalidDateTime { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::UnknownTask { .. } => StatusCode::NOT_FOUND,
            Self::DownstreamFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::DownstreamFailure { .. } => error!(error = %self, "task api call failed"),
            Self::InvalidDateTime { field, value } => {
                warn!(field = *field, value = %value, "rejected invalid date")
            }
            _ => warn!(error = %self, "rejected task request"),
        }
        views::error_page(status, &self.to_string())
    }
}
