//! Error types for HTTP handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contracts::MailError;
use thiserror::Error;
use tracing::error;

/// Handler error, rendered as the HTTP response
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request body; the reason is sent back as plain text
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Anything that failed after the body was accepted
    #[error(transparent)]
    Mail(#[from] MailError),
}

impl ApiError {
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::BadRequest(reason.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Mail(MailError::Validation { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Self::Mail(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::BadRequest(reason) => (status, reason).into_response(),
            Self::Mail(MailError::Validation { message }) => (status, message).into_response(),
            Self::Mail(e) => {
                error!(kind = e.kind(), error = %e, "Request failed");
                status.into_response()
            }
        }
    }
}
