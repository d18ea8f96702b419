//! Runtime settings and validation.
//!
//! Settings are read once at startup (see the CLI crate) and never change
//! while the server runs.

use url::Url;

/// Upstream used when `OLLAMA_BASE_URL` is unset.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Model used when a chat request names none and `DEFAULT_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Listen host for the wrapper.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Listen port for the wrapper.
pub const DEFAULT_PORT: u16 = 8000;

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the Ollama-compatible upstream, no trailing slash.
    pub ollama_base_url: String,
    /// Model used when a request omits `model`.
    pub default_model: String,
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Settings {
    /// Create settings with the built-in defaults.
    pub fn with_defaults() -> Self {
        Self {
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// Validate and normalize the settings.
    ///
    /// Trailing slashes are stripped from the base URL so endpoint paths
    /// can be appended directly.
    pub fn validated(mut self) -> Result<Self, SettingsError> {
        self.ollama_base_url = normalize_base_url(&self.ollama_base_url)?;

        self.default_model = self.default_model.trim().to_string();
        if self.default_model.is_empty() {
            return Err(SettingsError::EmptyDefaultModel);
        }

        self.host = self.host.trim().to_string();
        if self.host.is_empty() {
            return Err(SettingsError::EmptyHost);
        }

        Ok(self)
    }

    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<String, SettingsError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| SettingsError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(SettingsError::UnsupportedScheme(other.to_string())),
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid OLLAMA_BASE_URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("OLLAMA_BASE_URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("DEFAULT_MODEL must not be empty")]
    EmptyDefaultModel,

    #[error("Listen host must not be empty")]
    EmptyHost,
}
