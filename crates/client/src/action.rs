//! Server actions: generation calls made from trusted code.
//!
//! A server action keeps the API key out of untrusted callers by forwarding
//! the generation parameters itself. Any async function or closure taking a
//! [`WireRequest`] can serve as one.

use std::future::Future;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use shaper_core::generation::{encode, ActionResponse, WireRequest};

use crate::config::ForwardingConfig;
use crate::error::{ClientError, Result};

/// A caller-supplied generation function.
///
/// Returns either a success payload or the tagged `{"error": ...}` form; an
/// `Err` means the call itself failed.
#[async_trait]
pub trait ServerAction: Send + Sync {
    async fn call(&self, params: WireRequest) -> Result<ActionResponse>;
}

#[async_trait]
impl<F, Fut> ServerAction for F
where
    F: Fn(WireRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ActionResponse>> + Send,
{
    async fn call(&self, params: WireRequest) -> Result<ActionResponse> {
        (self)(params).await
    }
}

/// Forwards generation parameters to the upstream API.
#[derive(Debug, Clone)]
pub struct ForwardingAction {
    client: reqwest::Client,
    config: ForwardingConfig,
}

impl ForwardingAction {
    pub fn new(config: ForwardingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create from environment (see [`ForwardingConfig::from_env`]).
    pub fn from_env() -> Self {
        Self::new(ForwardingConfig::from_env())
    }

    /// Get the upstream API URL.
    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }
}

#[async_trait]
impl ServerAction for ForwardingAction {
    async fn call(&self, params: WireRequest) -> Result<ActionResponse> {
        if params.prompt.trim().is_empty() {
            return Err(ClientError::InvalidInput("Prompt is required".to_string()));
        }

        let mut builder = self
            .client
            .post(&self.config.api_url)
            .header(CONTENT_TYPE, "application/json")
            .body(encode(&params)?);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.header("x-api-key", api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(status = status.as_u16(), message = %message, "Upstream generation request failed");
            return Err(ClientError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(ClientError::from)
    }
}
