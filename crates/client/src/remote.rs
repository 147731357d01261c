//! Host side of the embedded frame: message routing and remote functions.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use shaper_core::frame::{FrameEvent, FrameSession, HostMessage, RemoteCall, RemoteCallResponse, Theme};

use crate::error::Result;

pub type RemoteFuture = Pin<Box<dyn Future<Output = std::result::Result<Value, Value>> + Send>>;
pub type RemoteFunction = Arc<dyn Fn(Vec<Value>) -> RemoteFuture + Send + Sync>;
pub type MessageHook = Box<dyn Fn(&str, &Value) + Send + Sync>;

/// Host functions the frame may call by name.
#[derive(Clone, Default)]
pub struct RemoteFunctions {
    functions: HashMap<String, RemoteFunction>,
}

impl RemoteFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` under `name`, replacing any previous one.
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Value, Value>> + Send + 'static,
    {
        let function: RemoteFunction = Arc::new(move |params| Box::pin(function(params)));
        self.functions.insert(name.into(), function);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Run the named function and build the response for the frame.
    ///
    /// Calls to unknown functions get no response.
    pub async fn dispatch(&self, call: RemoteCall) -> Option<HostMessage> {
        let Some(function) = self.functions.get(&call.function_name).cloned() else {
            tracing::warn!(function = %call.function_name, "Frame called an unregistered function");
            return None;
        };

        tracing::debug!(function = %call.function_name, id = %call.id, "Running remote call");
        let response = match function(call.params).await {
            Ok(value) => RemoteCallResponse::ok(call.id, value),
            Err(error) => {
                tracing::debug!(function = %call.function_name, error = %error, "Remote call failed");
                RemoteCallResponse::err(call.id, error)
            }
        };
        Some(HostMessage::RemoteCallResponse(response))
    }
}

impl std::fmt::Debug for RemoteFunctions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("RemoteFunctions").field("functions", &names).finish()
    }
}

/// Routes messages between the host and one embedded frame.
///
/// Inbound messages go in as raw strings; whatever the host must post back
/// comes out as a serialized message.
pub struct FrameHost {
    session: FrameSession,
    functions: RemoteFunctions,
    on_message: Option<MessageHook>,
}

impl FrameHost {
    pub fn new(session: FrameSession, functions: RemoteFunctions) -> Self {
        Self {
            session,
            functions,
            on_message: None,
        }
    }

    /// Receive application messages the frame sends (anything but the protocol types).
    pub fn on_message(mut self, hook: impl Fn(&str, &Value) + Send + Sync + 'static) -> Self {
        self.on_message = Some(Box::new(hook));
        self
    }

    pub fn session(&self) -> &FrameSession {
        &self.session
    }

    /// Handle one message from the frame. Malformed messages are logged and dropped.
    pub async fn receive(&mut self, raw: &str) -> Result<Option<String>> {
        let event = match self.session.handle(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring frame message");
                return Ok(None);
            }
        };

        let reply = match event {
            FrameEvent::Reply(message) => Some(message),
            FrameEvent::RemoteCall(call) => self.functions.dispatch(call).await,
            FrameEvent::Message { kind, data } => {
                if let Some(hook) = &self.on_message {
                    hook(&kind, &data);
                }
                None
            }
            FrameEvent::Ignored => None,
        };

        Ok(reply.map(|message| message.to_json()).transpose()?)
    }

    /// Update the theme; returns `SET_THEME` if the frame is already initialized.
    pub fn set_theme(&mut self, theme: Theme) -> Result<Option<String>> {
        Ok(self.session.set_theme(theme).map(|m| m.to_json()).transpose()?)
    }

    /// Update the initial state; returns `INIT` if the frame is already initialized.
    pub fn set_init_state(&mut self, state: Value) -> Result<Option<String>> {
        Ok(self
            .session
            .set_init_state(state)
            .map(|m| m.to_json())
            .transpose()?)
    }
}
