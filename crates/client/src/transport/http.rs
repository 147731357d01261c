//! HTTP transport: one POST per call.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use shaper_core::generation::{decode, encode, ErrorRecord, GenerationRecord, WireRequest};

use super::Transport;
use crate::config::ClientConfig;
use crate::error::Result;

/// Status, content type and body of a raw API response.
struct RawResponse {
    status: u16,
    content_type: Option<String>,
    body: String,
}

/// Posts generation requests to the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    /// Create a transport for the endpoint described by `config`.
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a transport sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            url: config.endpoint_url(),
            api_key: config.api_key.clone(),
        }
    }

    /// Create from environment (see [`ClientConfig::from_env`]).
    pub fn from_env() -> Self {
        Self::new(&ClientConfig::from_env())
    }

    /// Get the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, request: &WireRequest) -> Result<RawResponse> {
        let mut builder = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(encode(request)?);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("x-api-key", api_key);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &WireRequest) -> std::result::Result<GenerationRecord, ErrorRecord> {
        match self.post(request).await {
            Ok(raw) => {
                tracing::debug!(
                    url = %self.url,
                    status = raw.status,
                    content_type = ?raw.content_type,
                    "Generation response received"
                );
                decode(&raw.body, raw.status, raw.content_type.as_deref())
            }
            Err(e) => {
                tracing::error!(url = %self.url, error = %e, "Error processing request");
                Err(ErrorRecord::request_failed())
            }
        }
    }
}
