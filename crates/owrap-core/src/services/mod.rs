//! Core services - orchestration between ports and domain types.

mod gateway;

pub use gateway::{Gateway, GatewayTimeouts};
