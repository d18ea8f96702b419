//! Gateway service - translates caller requests into upstream calls.
//!
//! Each operation performs exactly one upstream round trip, with no
//! retries. Transport failures and non-200 replies are mapped onto
//! [`GatewayError`]; the health probe folds every failure into a
//! [`HealthReport`] instead.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::domain::{ChatRequest, ChatResponse, GeneratePayload, HealthReport, TagsResponse};
use crate::error::GatewayError;
use crate::ports::UpstreamPort;

/// Timeouts applied to upstream calls.
///
/// The model listing has no timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayTimeouts {
    /// `POST /api/generate` timeout.
    pub generate: Duration,
    /// Health probe timeout for `GET /api/tags`.
    pub health: Duration,
}

impl Default for GatewayTimeouts {
    fn default() -> Self {
        Self {
            generate: Duration::from_secs(120),
            health: Duration::from_secs(10),
        }
    }
}

/// Proxy between callers and the upstream inference server.
///
/// Cheap to clone; the upstream port is shared.
#[derive(Debug, Clone)]
pub struct Gateway {
    upstream: Arc<dyn UpstreamPort>,
    timeouts: GatewayTimeouts,
}

impl Gateway {
    /// Create a gateway with the default timeouts.
    pub fn new(upstream: Arc<dyn UpstreamPort>) -> Self {
        Self::with_timeouts(upstream, GatewayTimeouts::default())
    }

    /// Create a gateway with explicit upstream timeouts.
    pub fn with_timeouts(upstream: Arc<dyn UpstreamPort>, timeouts: GatewayTimeouts) -> Self {
        Self { upstream, timeouts }
    }

    /// Base URL of the upstream service.
    pub fn upstream_url(&self) -> &str {
        self.upstream.base_url()
    }

    /// Forward a chat request to `/api/generate` and reshape the reply.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        let payload = GeneratePayload::from(request);
        info!(model = %payload.model, stream = payload.stream, "Forwarding chat request");

        let reply = self
            .upstream
            .generate(&payload, self.timeouts.generate)
            .await
            .map_err(|e| {
                error!("Chat error: {e}");
                GatewayError::from(e)
            })?;

        if !reply.is_ok() {
            error!(status = reply.status, "Ollama API error: {}", reply.body);
            return Err(GatewayError::Upstream {
                status: reply.status,
                body: reply.body,
            });
        }

        parse_generate_body(&reply.body, &request.model).inspect_err(|e| {
            error!("Chat error: {e}");
        })
    }

    /// Probe the upstream tag listing. Never fails.
    pub async fn health_check(&self) -> HealthReport {
        let reply = match self.upstream.tags(Some(self.timeouts.health)).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Health check failed: {e}");
                return HealthReport::down(e.to_string());
            }
        };

        if !reply.is_ok() {
            warn!(status = reply.status, "Ollama not responding");
            return HealthReport::unhealthy();
        }

        match serde_json::from_str::<TagsResponse>(&reply.body) {
            Ok(tags) => HealthReport::Healthy {
                ollama_url: self.upstream.base_url().to_string(),
                available_models: tags.model_names(),
            },
            Err(e) => {
                error!("Health check failed: {e}");
                HealthReport::down(e.to_string())
            }
        }
    }

    /// Return the upstream tag listing unchanged.
    pub async fn list_models(&self) -> Result<Value, GatewayError> {
        let reply = self.upstream.tags(None).await.map_err(|e| {
            error!("Failed to list models: {e}");
            GatewayError::Internal(e.to_string())
        })?;

        if !reply.is_ok() {
            warn!(status = reply.status, "Failed to fetch models");
            return Err(GatewayError::ModelsUnavailable);
        }

        serde_json::from_str(&reply.body).map_err(|e| {
            error!("Failed to parse model listing: {e}");
            GatewayError::Internal(e.to_string())
        })
    }
}

/// Parse a 200 body from `/api/generate`.
///
/// A single JSON document is the normal case. When upstream streamed,
/// the body is newline-delimited chunks which are folded into one reply.
fn parse_generate_body(body: &str, model: &str) -> Result<ChatResponse, GatewayError> {
    let documents = serde_json::Deserializer::from_str(body)
        .into_iter::<Value>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| GatewayError::Internal(e.to_string()))?;

    let parsed = match documents.as_slice() {
        [] => return Err(GatewayError::Internal("Empty response from Ollama".to_string())),
        [single] => ChatResponse::from_generate_reply(single, model),
        chunks => {
            debug!(chunks = chunks.len(), "Folding streamed generate reply");
            ChatResponse::from_generate_chunks(chunks, model)
        }
    };

    parsed.ok_or_else(|| {
        GatewayError::Internal("Ollama reply is missing the 'response' field".to_string())
    })
}
