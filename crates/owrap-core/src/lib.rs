//! Core domain types, ports and services for owrap.
//!
//! This crate knows nothing about HTTP frameworks or HTTP clients. The
//! upstream inference server is reached through [`ports::UpstreamPort`],
//! which the proxy crate implements on top of reqwest.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    ChatRequest, ChatResponse, GenerateOptions, GeneratePayload, HealthReport, RequestError,
};
pub use error::GatewayError;
pub use ports::{UpstreamError, UpstreamPort, UpstreamReply};
pub use services::{Gateway, GatewayTimeouts};
pub use settings::{
    DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_OLLAMA_BASE_URL, DEFAULT_PORT, Settings, SettingsError,
};
