mod error;
mod messages;
mod presentation;
mod session;

pub use error::{FrameError, Result};
pub use messages::{
    FrameMessage, HostMessage, InitPayload, RemoteCall, RemoteCallResponse, ThemePayload,
};
pub use presentation::{
    frame_src, present, AutoResize, FrameProps, Presentation, FRAME_ALLOW, FRAME_SANDBOX,
};
pub use session::{FrameEvent, FrameSession, Theme};
