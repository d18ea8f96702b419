//! Axum HTTP server for the wrapper.
//!
//! `serve()` runs the router on a pre-bound listener until the
//! cancellation token fires.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use owrap_core::{Gateway, Settings};

use crate::handlers;
use crate::upstream::OllamaClient;

/// Shared state injected into every handler.
#[derive(Debug, Clone)]
pub struct ProxyState {
    pub(crate) gateway: Gateway,
    pub(crate) default_model: Arc<str>,
}

impl ProxyState {
    pub fn new(gateway: Gateway, default_model: &str) -> Self {
        Self {
            gateway,
            default_model: Arc::from(default_model),
        }
    }
}

/// Build the router with all wrapper routes.
pub fn create_router(state: ProxyState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/chat", post(handlers::chat))
        .route("/api/models", get(handlers::list_models))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the wrapper with a pre-bound listener.
///
/// # Arguments
///
/// * `listener` - Pre-bound TCP listener
/// * `settings` - Validated settings (upstream URL, default model)
/// * `cancel` - Cancellation token for graceful shutdown
///
/// # Returns
///
/// Returns `Ok(())` on clean shutdown, or an error if the server fails.
pub async fn serve(
    listener: TcpListener,
    settings: &Settings,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Ollama API Wrapper starting on {addr}");

    let upstream = OllamaClient::new(&settings.ollama_base_url)?;
    let gateway = Gateway::new(Arc::new(upstream));
    let app = create_router(ProxyState::new(gateway, &settings.default_model));

    info!(
        ollama_url = %settings.ollama_base_url,
        default_model = %settings.default_model,
        "Forwarding chat requests to Ollama"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Server shut down");
    Ok(())
}
