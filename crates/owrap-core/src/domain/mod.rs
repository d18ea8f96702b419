//! Domain types for the chat gateway.
//!
//! Everything here is request-scoped: built from an inbound body, used for
//! one upstream round trip, and dropped.

mod chat;
mod health;

pub use chat::{
    ChatRequest, ChatResponse, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, GenerateOptions,
    GeneratePayload, RequestError,
};
pub use health::{HealthReport, TagEntry, TagsResponse};
