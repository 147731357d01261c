//! Pure functions deciding what to show for a given client state.

use serde::{Deserialize, Serialize};

use crate::generation::{has_changed, ClientState, GenerationRequest, GenerationStatus};

/// Sandbox flags for the embedding frame.
pub const FRAME_SANDBOX: &str = "allow-scripts allow-same-origin allow-forms allow-downloads \
allow-popups-to-escape-sandbox allow-pointer-lock allow-popups allow-modals";

/// Permissions policy for the embedding frame.
pub const FRAME_ALLOW: &str = "fullscreen; camera; microphone; gyroscope; accelerometer; \
geolocation; clipboard-write; autoplay";

/// Which of the three renderings applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation<'a> {
    /// Neutral placeholder. Also used for every non-terminal tick.
    Pending,
    /// Error placeholder; the message is for diagnostics only.
    Failed { message: &'a str },
    /// Embed the finished artifact.
    Frame { url: &'a str },
}

/// Select the rendering for `state`.
///
/// Only a completed record with a URL is embedded; intermediate records never
/// are, so the placeholder does not flicker while polling.
pub fn present(state: &ClientState) -> Presentation<'_> {
    if state.loading {
        return Presentation::Pending;
    }

    if let Some(error) = &state.error {
        return Presentation::Failed {
            message: &error.message,
        };
    }

    match &state.data {
        Some(record) if record.status == GenerationStatus::Completed => match &record.url {
            Some(url) => Presentation::Frame { url },
            None => Presentation::Pending,
        },
        _ => Presentation::Pending,
    }
}

/// Frame source URL. When the host will send initial parameters, the
/// embedded document is told to wait for `INIT` before rendering.
pub fn frame_src(url: &str, await_init: bool) -> String {
    if !await_init {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}await_init=true", url, separator)
}

/// Axis along which the frame follows its content size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoResize {
    Vertical,
    Horizontal,
    #[default]
    Both,
    None,
}

impl AutoResize {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoResize::Vertical => "vertical",
            AutoResize::Horizontal => "horizontal",
            AutoResize::Both => "both",
            AutoResize::None => "none",
        }
    }
}

/// Inputs of an embedded component that decide whether it must be rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameProps {
    pub request: GenerationRequest,
    pub class_name: Option<String>,
    pub inner_class_name: Option<String>,
    pub init_state: serde_json::Value,
}

impl FrameProps {
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            request,
            class_name: None,
            inner_class_name: None,
            init_state: serde_json::Value::Null,
        }
    }

    /// Returns true if going from `self` to `next` requires tearing down the frame.
    pub fn should_rerender(&self, next: &FrameProps) -> bool {
        has_changed(Some(&self.request), &next.request)
            || self.class_name != next.class_name
            || self.inner_class_name != next.inner_class_name
            || self.init_state != next.init_state
    }
}
