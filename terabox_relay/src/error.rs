//! Error types for the terabox_relay crate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while resolving a TeraBox share.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Could not extract surl from link: {0}")]
    InvalidShareUrl(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Failed to follow redirect: {0}")]
    Redirect(String),

    #[error("TeraBox error (errno {errno}): {message}")]
    Provider { errno: i64, message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// HTTP status this error maps to when returned by a handler.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            detail: String,
        }

        let status = self.status();
        let body = ErrorBody {
            detail: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias for RelayError.
pub type Result<T> = std::result::Result<T, RelayError>;
