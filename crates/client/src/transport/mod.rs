//! Transports carry one generation call to the API and back.
//!
//! Implementations never fail with a Rust error: transport failures are
//! logged and resolved into an [`ErrorRecord`] the caller can show.

mod action;
mod http;

pub use action::ServerActionTransport;
pub use http::HttpTransport;

use std::sync::Arc;

use async_trait::async_trait;
use shaper_core::generation::{ErrorRecord, GenerationRecord, WireRequest};

/// Performs one generation call.
///
/// Called repeatedly for the same job while polling; a request carrying a
/// known job id is expected to return that job's status rather than create
/// another job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &WireRequest) -> Result<GenerationRecord, ErrorRecord>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &WireRequest) -> Result<GenerationRecord, ErrorRecord> {
        (**self).send(request).await
    }
}
