//! Host side of the frame conversation.
//!
//! The host never writes to the frame before it has announced `READY`. After
//! that, `INIT` goes out once with the initial state and theme; later theme
//! changes go out as `SET_THEME`, and a changed initial state re-sends `INIT`.

use serde_json::Value;

use super::error::Result;
use super::messages::{FrameMessage, HostMessage, InitPayload, RemoteCall, ThemePayload};

/// Styling handed to the embedded document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Theme {
    pub class_name: Option<String>,
    pub dark: bool,
}

/// What the host should do with an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    /// Post this message back to the frame.
    Reply(HostMessage),
    /// Run a host function and answer with `REMOTE_CALL_RESPONSE`. Only
    /// produced after `READY`, so the answer never precedes readiness.
    RemoteCall(RemoteCall),
    /// Hand an application message to the host's listener.
    Message { kind: String, data: Value },
    /// Nothing to do.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct FrameSession {
    ready: bool,
    initialized: bool,
    init_state: Value,
    theme: Theme,
}

impl FrameSession {
    pub fn new(init_state: Value, theme: Theme) -> Self {
        Self {
            ready: false,
            initialized: false,
            init_state,
            theme,
        }
    }

    /// Returns true once the frame has announced `READY`.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Returns true once `INIT` has been sent.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns true if the frame should wait for `INIT` before rendering.
    pub fn has_init_params(&self) -> bool {
        !self.init_state.is_null() || self.theme.class_name.is_some() || self.theme.dark
    }

    /// Handle one raw message from the frame.
    pub fn handle(&mut self, raw: &str) -> Result<FrameEvent> {
        let event = match FrameMessage::parse(raw)? {
            FrameMessage::Ready => {
                self.ready = true;
                if self.initialized {
                    FrameEvent::Ignored
                } else {
                    FrameEvent::Reply(self.init_message())
                }
            }
            FrameMessage::RemoteCall(call) if self.ready => FrameEvent::RemoteCall(call),
            FrameMessage::RemoteCall(_) => FrameEvent::Ignored,
            FrameMessage::Other { kind, data } => FrameEvent::Message { kind, data },
        };
        Ok(event)
    }

    /// Update the theme. Returns `SET_THEME` once the frame is initialized.
    pub fn set_theme(&mut self, theme: Theme) -> Option<HostMessage> {
        if self.theme == theme {
            return None;
        }
        self.theme = theme;
        self.initialized.then(|| {
            HostMessage::SetTheme(ThemePayload {
                class_name: self.theme.class_name.clone(),
                dark: self.theme.dark,
            })
        })
    }

    /// Update the initial state. Returns a fresh `INIT` once the frame is initialized.
    pub fn set_init_state(&mut self, state: Value) -> Option<HostMessage> {
        if self.init_state == state {
            return None;
        }
        self.init_state = state;
        self.initialized.then(|| self.build_init())
    }

    fn init_message(&mut self) -> HostMessage {
        self.initialized = true;
        self.build_init()
    }

    fn build_init(&self) -> HostMessage {
        HostMessage::Init(InitPayload {
            state: self.init_state.clone(),
            class_name: self.theme.class_name.clone(),
            dark_mode: self.theme.dark,
        })
    }
}
