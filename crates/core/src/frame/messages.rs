//! Cross-frame message types.
//!
//! Every message is a JSON string of the form `{"type": ..., "data": ...}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{FrameError, Result};

/// A remote function call requested by the embedded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCall {
    pub function_name: String,
    #[serde(default)]
    pub params: Vec<Value>,
    /// Opaque correlation id, echoed back in the response.
    pub id: Value,
}

/// Messages sent by the embedded document.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameMessage {
    /// The document is listening and can receive `INIT`.
    Ready,
    RemoteCall(RemoteCall),
    /// Anything else, forwarded to the host as-is.
    Other { kind: String, data: Value },
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl FrameMessage {
    /// Parse a message string received from the frame.
    pub fn parse(message: &str) -> Result<Self> {
        let raw: RawMessage = serde_json::from_str(message)
            .map_err(|e| FrameError::Malformed(e.to_string()))?;

        match raw.kind.as_str() {
            "READY" => Ok(FrameMessage::Ready),
            "REMOTE_CALL" => serde_json::from_value(raw.data)
                .map(FrameMessage::RemoteCall)
                .map_err(|e| FrameError::Malformed(e.to_string())),
            _ => Ok(FrameMessage::Other {
                kind: raw.kind,
                data: raw.data,
            }),
        }
    }
}

/// Payload of `INIT`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitPayload {
    pub state: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub dark_mode: bool,
}

/// Payload of `SET_THEME`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub dark: bool,
}

/// Payload of `REMOTE_CALL_RESPONSE`. Exactly one of `response` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCallResponse {
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl RemoteCallResponse {
    pub fn ok(id: Value, response: Value) -> Self {
        Self {
            id,
            response: Some(response),
            error: None,
        }
    }

    pub fn err(id: Value, error: Value) -> Self {
        Self {
            id,
            response: None,
            error: Some(error),
        }
    }
}

/// Messages sent by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostMessage {
    Init(InitPayload),
    SetTheme(ThemePayload),
    RemoteCallResponse(RemoteCallResponse),
}

impl HostMessage {
    /// Serialize for posting to the frame.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| FrameError::Serialization(e.to_string()))
    }
}
