//! Pretty output formatting.

use shaper_core::frame::{present, Presentation};
use shaper_core::generation::{ClientState, ErrorRecord, GenerationRecord};

/// Format a generation record for display.
pub fn format_record(record: &GenerationRecord) -> String {
    let mut output = format!("Status: {}", record.status);
    if let Some(id) = &record.id {
        output.push_str(&format!("\n  ID: {}", id));
    }
    if let Some(url) = &record.url {
        output.push_str(&format!("\n  URL: {}", url));
    }
    if let Some(message) = &record.message {
        output.push_str(&format!("\n  Message: {}", message));
    }
    output
}

/// Format an error for display.
pub fn format_error(error: &ErrorRecord) -> String {
    match error.status {
        Some(status) => format!("Error ({}): {}", status, error.message),
        None => format!("Error: {}", error.message),
    }
}

/// Format a client state for display.
pub fn format_state(state: &ClientState) -> String {
    if state.loading && state.data.is_none() {
        return "Waiting for the server...".to_string();
    }

    let mut sections = Vec::new();
    if let Some(record) = &state.data {
        sections.push(format_record(record));
    }
    if let Some(error) = &state.error {
        sections.push(format_error(error));
    }
    if let Presentation::Frame { url } = present(state) {
        sections.push(format!("Ready: {}", url));
    }

    if sections.is_empty() {
        "No data.".to_string()
    } else {
        sections.join("\n")
    }
}
