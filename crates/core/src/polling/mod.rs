//! Polling state machine.
//!
//! Turns one generation request into a settled [`ClientState`](crate::generation::ClientState)
//! by repeating transport calls on a fixed interval until the job reaches a
//! terminal status. This module only decides; timers and I/O belong to the
//! driver (see `shaper_client::Poller`).

mod machine;

pub use machine::{Command, Phase, PollingMachine, Ticket, DEFAULT_POLLING_INTERVAL};
