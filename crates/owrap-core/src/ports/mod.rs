//! Port definitions (trait interfaces) for external collaborators.
//!
//! Ports are implemented by adapter crates; the core only sees the traits.

mod upstream;

pub use upstream::{UpstreamError, UpstreamPort, UpstreamReply};
