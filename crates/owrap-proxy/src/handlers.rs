//! Route handlers for the wrapper surface.
//!
//! Upstream calls run in their own tokio task, so a caller that disconnects
//! does not cancel the outbound request; it runs to completion or timeout.

use axum::Json;
use axum::extract::State;
use bytes::Bytes;
use serde_json::{Value, json};
use tokio::task::JoinError;
use tracing::{debug, error, warn};

use owrap_core::{ChatRequest, ChatResponse, GatewayError, HealthReport};

use crate::error::HttpError;
use crate::server::ProxyState;

/// Text returned by `GET /`.
pub const ROOT_MESSAGE: &str = "Ollama API Wrapper is running";

// ── GET / ──────────────────────────────────────────────────────────────

pub async fn root() -> Json<Value> {
    Json(json!({ "message": ROOT_MESSAGE }))
}

// ── GET /health ────────────────────────────────────────────────────────

/// Always 200; failures are reported in the `status` field.
pub async fn health(State(state): State<ProxyState>) -> Json<HealthReport> {
    debug!("GET /health");
    let gateway = state.gateway;
    let report = tokio::spawn(async move { gateway.health_check().await })
        .await
        .unwrap_or_else(|e| HealthReport::down(join_failure(&e).to_string()));
    Json(report)
}

// ── POST /api/chat ─────────────────────────────────────────────────────

pub async fn chat(
    State(state): State<ProxyState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, HttpError> {
    debug!("POST /api/chat");

    let request = ChatRequest::from_slice(&body, &state.default_model).inspect_err(|e| {
        warn!("Invalid /api/chat request: {e}");
    })?;

    let gateway = state.gateway;
    let response = tokio::spawn(async move { gateway.chat(&request).await })
        .await
        .map_err(|e| join_failure(&e))??;
    Ok(Json(response))
}

// ── GET /api/models ────────────────────────────────────────────────────

pub async fn list_models(State(state): State<ProxyState>) -> Result<Json<Value>, HttpError> {
    debug!("GET /api/models");
    let gateway = state.gateway;
    let models = tokio::spawn(async move { gateway.list_models().await })
        .await
        .map_err(|e| join_failure(&e))??;
    Ok(Json(models))
}

// ── Shared Helpers ─────────────────────────────────────────────────────

/// Map a panicked or aborted upstream task onto an internal error.
fn join_failure(err: &JoinError) -> GatewayError {
    error!("Upstream task failed: {err}");
    GatewayError::Internal(err.to_string())
}
