//! shaper_client - Generation client, frame host, and CLI for the shaper API.

pub mod action;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod poller;
pub mod remote;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use action::{ForwardingAction, ServerAction};
pub use config::{ClientConfig, ForwardingConfig};
pub use error::{ClientError, Result};
pub use poller::{Poller, PollerBuilder};
pub use remote::{FrameHost, RemoteFunctions};
pub use transport::{HttpTransport, ServerActionTransport, Transport};
