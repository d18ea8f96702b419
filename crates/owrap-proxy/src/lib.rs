//! HTTP surface for owrap.
//!
//! Exposes the wrapper endpoints with axum and reaches the Ollama upstream
//! through [`OllamaClient`], a reqwest implementation of
//! [`owrap_core::UpstreamPort`].
#![deny(unsafe_code)]

pub mod error;
pub mod handlers;
pub mod server;
pub mod upstream;

pub use server::{ProxyState, create_router, serve};
pub use upstream::OllamaClient;
