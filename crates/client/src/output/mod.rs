//! Output formatting functions.

pub mod html;
pub mod json;
pub mod pretty;

use shaper_core::generation::ClientState;

use crate::cli::OutputFormat;

/// Format a value for output.
pub fn format_output<T: serde::Serialize>(value: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_json(value),
        OutputFormat::Pretty => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

/// Format a client state for output.
pub fn format_state(state: &ClientState, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_json(state),
        OutputFormat::Pretty => pretty::format_state(state),
    }
}
