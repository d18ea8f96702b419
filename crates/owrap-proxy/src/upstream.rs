//! reqwest implementation of the upstream port.
//!
//! Transport errors are classified here, because only the HTTP client can
//! tell a timeout from a refused connection.

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use owrap_core::{GeneratePayload, UpstreamError, UpstreamPort, UpstreamReply};

/// HTTP client for an Ollama-compatible server.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a client with a fresh reqwest `Client` and no global timeout.
    ///
    /// `base_url` must not end with a slash; `Settings::validated` takes
    /// care of that.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl UpstreamPort for OllamaClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn generate(
        &self,
        payload: &GeneratePayload,
        timeout: Duration,
    ) -> Result<UpstreamReply, UpstreamError> {
        let url = self.endpoint("/api/generate");
        debug!("Forwarding to {url}");

        let response = self
            .client
            .post(&url)
            .json(payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        read_reply(response).await
    }

    async fn tags(&self, timeout: Option<Duration>) -> Result<UpstreamReply, UpstreamError> {
        let url = self.endpoint("/api/tags");
        debug!("Fetching {url}");

        let mut request = self.client.get(&url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(classify)?;
        read_reply(response).await
    }
}

async fn read_reply(response: reqwest::Response) -> Result<UpstreamReply, UpstreamError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(classify)?;
    Ok(UpstreamReply { status, body })
}

/// Map a reqwest error onto the port's transport taxonomy.
///
/// Timeouts win over connect errors: a connect timeout reports both.
fn classify(err: reqwest::Error) -> UpstreamError {
    let message = error_chain(&err);
    if err.is_timeout() {
        UpstreamError::Timeout(message)
    } else if err.is_connect() {
        UpstreamError::Connect(message)
    } else {
        UpstreamError::Other(message)
    }
}

/// Render an error with its sources, `outer: inner: root`.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
