//! shaper_core - Functional core for the shaper generation client.
//!
//! Pure types and functions only: request encoding, response decoding,
//! change detection, the polling state machine and the frame protocol.
//! All I/O lives in `shaper_client`.

pub mod frame;
pub mod generation;
pub mod polling;
