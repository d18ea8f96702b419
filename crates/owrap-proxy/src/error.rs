//! HTTP error mapping.
//!
//! Every failure reaches the caller as `{"detail": "<text>"}` with the
//! status chosen by the core error.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use owrap_core::{GatewayError, RequestError};

/// Error type returned by the handlers.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Upstream call failed or returned an error.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The inbound body could not be turned into a request.
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Gateway(e) => StatusCode::from_u16(e.status_code())
                .ok()
                .filter(|s| !s.is_informational())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Self::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
