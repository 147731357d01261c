//! Server action transport: calls a function instead of the network.

use async_trait::async_trait;
use shaper_core::generation::{ErrorRecord, GenerationRecord, WireRequest};

use super::Transport;
use crate::action::ServerAction;

/// Routes generation calls through a caller-supplied [`ServerAction`].
///
/// No HTTP status is available on this path, so errors never carry one.
#[derive(Debug, Clone)]
pub struct ServerActionTransport<A> {
    action: A,
}

impl<A: ServerAction> ServerActionTransport<A> {
    pub fn new(action: A) -> Self {
        Self { action }
    }

    /// Get the wrapped action.
    pub fn action(&self) -> &A {
        &self.action
    }
}

#[async_trait]
impl<A: ServerAction> Transport for ServerActionTransport<A> {
    async fn send(&self, request: &WireRequest) -> Result<GenerationRecord, ErrorRecord> {
        match self.action.call(request.clone()).await {
            Ok(response) => response.into_result(),
            Err(e) => {
                tracing::error!(error = %e, "Error processing request");
                Err(ErrorRecord::request_failed())
            }
        }
    }
}
