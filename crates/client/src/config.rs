use std::{env, time::Duration};

use shaper_core::generation::GenerationRequest;
use shaper_core::polling::DEFAULT_POLLING_INTERVAL;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Generation route, relative to the base URL.
pub const DEFAULT_ENDPOINT: &str = "/api/generate";

/// Upstream generation API used by the forwarding action.
pub const DEFAULT_API_URL: &str = "https://api.shaper.build/generate";

/// Client configuration, built once per application and passed explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL relative endpoints are resolved against.
    pub base_url: String,
    /// Generation endpoint. Absolute URLs ignore `base_url`.
    pub endpoint: String,
    /// Sent as `x-api-key` when present.
    pub api_key: Option<String>,
    /// Model forwarded with requests that do not name one.
    pub model: Option<String>,
    /// Delay between status refreshes, in milliseconds.
    pub polling_interval_ms: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SHAPER_URL` - Base URL (default: "http://localhost:3000")
    /// - `SHAPER_ENDPOINT` - Generation endpoint (default: "/api/generate")
    /// - `SHAPER_API_KEY` - API key sent as `x-api-key` (default: none)
    /// - `SHAPER_MODEL` - Default model identifier (default: none)
    /// - `SHAPER_POLLING_INTERVAL_MS` - Refresh interval (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("SHAPER_URL").unwrap_or(defaults.base_url),
            endpoint: env::var("SHAPER_ENDPOINT").unwrap_or(defaults.endpoint),
            api_key: non_empty_var("SHAPER_API_KEY"),
            model: non_empty_var("SHAPER_MODEL"),
            polling_interval_ms: env::var("SHAPER_POLLING_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.polling_interval_ms),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Full URL of the generation endpoint.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
            return self.endpoint.clone();
        }
        let base = self.base_url.trim_end_matches('/');
        if self.endpoint.starts_with('/') {
            format!("{}{}", base, self.endpoint)
        } else {
            format!("{}/{}", base, self.endpoint)
        }
    }

    /// Get the polling interval as a Duration.
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }

    /// Fill in configured defaults the request leaves open.
    pub fn prepare(&self, mut request: GenerationRequest) -> GenerationRequest {
        if request.model.is_none() {
            request.model = self.model.clone();
        }
        request
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            model: None,
            polling_interval_ms: DEFAULT_POLLING_INTERVAL.as_millis() as u64,
        }
    }
}

/// Configuration for [`ForwardingAction`](crate::action::ForwardingAction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingConfig {
    pub api_url: String,
    pub api_key: Option<String>,
}

impl ForwardingConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SHAPER_API_URL` - Upstream API (default: "https://api.shaper.build/generate")
    /// - `SHAPER_API_KEY` - API key sent as `x-api-key` (default: none)
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("SHAPER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_key: non_empty_var("SHAPER_API_KEY"),
        }
    }
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
