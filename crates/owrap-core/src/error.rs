//! Gateway error taxonomy and its HTTP status mapping.

use thiserror::Error;

use crate::ports::UpstreamError;

/// Failures surfaced to the caller by the chat and model-listing operations.
///
/// `Display` is the detail text shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Upstream did not answer within the timeout.
    #[error("Request timeout")]
    Timeout,

    /// Upstream refused the connection or could not be reached.
    #[error("Cannot connect to Ollama")]
    Unreachable,

    /// Upstream answered with a non-200 status; forwarded as-is.
    #[error("{body}")]
    Upstream { status: u16, body: String },

    /// The tag listing answered with a non-200 status.
    #[error("Failed to fetch models")]
    ModelsUnavailable,

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status code the caller should receive.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Timeout => 504,
            Self::Unreachable => 503,
            Self::Upstream { status, .. } => *status,
            Self::ModelsUnavailable | Self::Internal(_) => 500,
        }
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout(_) => Self::Timeout,
            UpstreamError::Connect(_) => Self::Unreachable,
            UpstreamError::Other(msg) => Self::Internal(msg),
        }
    }
}
