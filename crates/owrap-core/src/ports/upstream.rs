//! Upstream inference server port.
//!
//! Abstracts the two Ollama endpoints the gateway calls. Implementations
//! return the raw status and body text; interpreting them is the gateway's
//! job.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::GeneratePayload;

/// Status and body text of a completed upstream exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

impl UpstreamReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True only for HTTP 200; other 2xx codes are treated as failures.
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Transport-level failures talking to upstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The request (connect, send or body read) exceeded its timeout.
    #[error("{0}")]
    Timeout(String),

    /// The connection could not be established.
    #[error("{0}")]
    Connect(String),

    /// Any other client failure.
    #[error("{0}")]
    Other(String),
}

/// Port for the Ollama-compatible upstream service.
#[async_trait]
pub trait UpstreamPort: Send + Sync + fmt::Debug {
    /// Base URL of the upstream, without a trailing slash.
    fn base_url(&self) -> &str;

    /// `POST /api/generate` with the given payload.
    async fn generate(
        &self,
        payload: &GeneratePayload,
        timeout: Duration,
    ) -> Result<UpstreamReply, UpstreamError>;

    /// `GET /api/tags`. `None` means no timeout.
    async fn tags(&self, timeout: Option<Duration>) -> Result<UpstreamReply, UpstreamError>;
}
