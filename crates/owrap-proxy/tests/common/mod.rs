//! Shared helpers for the proxy integration tests.
//!
//! The fake upstream is a real axum server bound on an ephemeral port, so
//! the reqwest client, its timeouts and its error classification are all
//! exercised for real.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use owrap_core::{Gateway, GatewayTimeouts};
use owrap_proxy::{OllamaClient, ProxyState, create_router};

pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Canned behaviour for one fake upstream endpoint.
#[derive(Clone)]
pub enum Canned {
    /// Reply with this status and body.
    Reply(u16, String),
    /// Sleep before replying 200 with this body.
    Slow(Duration, String),
}

impl Canned {
    pub fn json(status: u16, body: &Value) -> Self {
        Self::Reply(status, body.to_string())
    }

    async fn respond(self) -> Response {
        match self {
            Self::Reply(status, body) => (
                StatusCode::from_u16(status).unwrap(),
                [("content-type", "application/json")],
                body,
            )
                .into_response(),
            Self::Slow(delay, body) => {
                tokio::time::sleep(delay).await;
                body.into_response()
            }
        }
    }
}

#[derive(Clone)]
struct FakeState {
    generate: Canned,
    tags: Canned,
    received: Arc<Mutex<Vec<Value>>>,
}

/// A fake Ollama server.
pub struct FakeUpstream {
    pub base_url: String,
    received: Arc<Mutex<Vec<Value>>>,
}

impl FakeUpstream {
    /// Start a fake upstream with the given generate and tags behaviour.
    pub async fn start(generate: Canned, tags: Canned) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            generate,
            tags,
            received: received.clone(),
        };

        let app = Router::new()
            .route("/api/generate", post(fake_generate))
            .route("/api/tags", get(fake_tags))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            received,
        }
    }

    /// Generate payloads received so far.
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

async fn fake_generate(State(state): State<FakeState>, Json(payload): Json<Value>) -> Response {
    state.received.lock().unwrap().push(payload);
    state.generate.respond().await
}

async fn fake_tags(State(state): State<FakeState>) -> Response {
    state.tags.respond().await
}

/// Base URL of a port with no listener.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Build the wrapper router pointed at `base_url`.
pub fn wrapper(base_url: &str, timeouts: GatewayTimeouts) -> Router {
    let upstream = OllamaClient::new(base_url).unwrap();
    let gateway = Gateway::with_timeouts(Arc::new(upstream), timeouts);
    create_router(ProxyState::new(gateway, DEFAULT_MODEL))
}

/// Short timeouts so timeout tests finish quickly.
pub fn short_timeouts() -> GatewayTimeouts {
    GatewayTimeouts {
        generate: Duration::from_millis(300),
        health: Duration::from_millis(300),
    }
}

/// Send a request through the router, returning status and JSON body.
pub async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn chat_request(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
