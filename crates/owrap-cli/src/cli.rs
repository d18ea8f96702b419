//! Command-line arguments.
//!
//! Every option can also be supplied through the environment, which is how
//! the wrapper is normally configured.

use clap::Parser;

use owrap_core::{
    DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_OLLAMA_BASE_URL, DEFAULT_PORT, Settings, SettingsError,
};

/// HTTP wrapper that forwards chat requests to a local Ollama server.
#[derive(Debug, Parser)]
#[command(name = "owrap", version, about)]
pub struct Cli {
    /// Base URL of the Ollama server
    #[arg(long, env = "OLLAMA_BASE_URL", default_value = DEFAULT_OLLAMA_BASE_URL)]
    pub ollama_base_url: String,

    /// Model used when a chat request does not name one
    #[arg(long, env = "DEFAULT_MODEL", default_value = DEFAULT_MODEL)]
    pub default_model: String,

    /// Address to listen on
    #[arg(long, env = "OWRAP_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "OWRAP_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl Cli {
    /// Convert parsed arguments into validated settings.
    pub fn into_settings(self) -> Result<Settings, SettingsError> {
        Settings {
            ollama_base_url: self.ollama_base_url,
            default_model: self.default_model,
            host: self.host,
            port: self.port,
        }
        .validated()
    }
}
