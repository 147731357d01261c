use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when a request is rejected before reaching the network.
pub const PROMPT_MISSING: &str = "Prompt is missing";

/// Message used when the transport itself fails (connection refused, server action panics, ...).
pub const REQUEST_FAILED: &str = "Error processing request.";

/// Message used when the API reports `status: "error"` without any detail.
pub const PROMPT_FAILED: &str = "Error processing prompt.";

/// Message used when the API reports a status this client does not know.
pub const UNKNOWN_STATE: &str = "Unknown state.";

/// Status of a remote generation job.
///
/// The API has used several spellings over time. `building` is read as
/// [`GenerationStatus::Processing`] and `ready` as [`GenerationStatus::Completed`];
/// serialization always writes the canonical spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GenerationStatus {
    Pending,
    Processing,
    Completed,
    Error,
    /// A status string this client does not recognize.
    Unrecognized(String),
}

impl GenerationStatus {
    /// Parse a wire status, normalizing known aliases.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => GenerationStatus::Pending,
            "processing" | "building" => GenerationStatus::Processing,
            "completed" | "ready" => GenerationStatus::Completed,
            "error" => GenerationStatus::Error,
            _ => GenerationStatus::Unrecognized(value.to_string()),
        }
    }

    /// Canonical wire spelling.
    pub fn as_str(&self) -> &str {
        match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Processing => "processing",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Error => "error",
            GenerationStatus::Unrecognized(raw) => raw,
        }
    }

    /// Returns true if the job is still being worked on.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            GenerationStatus::Pending | GenerationStatus::Processing
        )
    }

    /// Returns true if polling stops permanently at this status.
    pub fn is_terminal(&self) -> bool {
        !self.is_in_progress()
    }
}

impl From<String> for GenerationStatus {
    fn from(value: String) -> Self {
        GenerationStatus::parse(&value)
    }
}

impl From<GenerationStatus> for String {
    fn from(status: GenerationStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_status() -> GenerationStatus {
    GenerationStatus::Completed
}

/// The remote job's identity, location and status as of the last response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Legacy `{id, url}` responses carry no status and are already usable.
    #[serde(default = "default_status")]
    pub status: GenerationStatus,
    /// Server-provided detail, if any. Only read when `status` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GenerationRecord {
    /// Creates a record with the given status and no identity yet.
    pub fn new(status: GenerationStatus) -> Self {
        Self {
            id: None,
            url: None,
            status,
            message: None,
        }
    }

    /// Sets the job id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the artifact URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the server-provided message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A failure surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ErrorRecord {
    pub message: String,
    /// HTTP status when one was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorRecord {
    /// Creates an error without an HTTP status.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Creates an error carrying an HTTP status.
    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    /// The error used when the transport itself failed.
    pub fn request_failed() -> Self {
        Self::new(REQUEST_FAILED)
    }

    /// The error used for a request with an empty prompt.
    pub fn prompt_missing() -> Self {
        Self::new(PROMPT_MISSING)
    }
}

/// What a consumer of the client observes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    pub loading: bool,
    pub data: Option<GenerationRecord>,
    pub error: Option<ErrorRecord>,
}

impl ClientState {
    /// State while a request is in flight and nothing has come back yet.
    pub fn loading() -> Self {
        Self {
            loading: true,
            data: None,
            error: None,
        }
    }

    /// State while the job is pending or processing.
    pub fn in_progress(record: GenerationRecord) -> Self {
        Self {
            loading: true,
            data: Some(record),
            error: None,
        }
    }

    /// Terminal success.
    pub fn completed(record: GenerationRecord) -> Self {
        Self {
            loading: false,
            data: Some(record),
            error: None,
        }
    }

    /// Terminal failure, optionally keeping the last record.
    pub fn failed(data: Option<GenerationRecord>, error: ErrorRecord) -> Self {
        Self {
            loading: false,
            data,
            error: Some(error),
        }
    }

    /// Nothing requested and nothing in flight, e.g. after a cancel.
    pub fn idle() -> Self {
        Self {
            loading: false,
            data: None,
            error: None,
        }
    }

    /// Returns true once polling has stopped for the current request.
    pub fn is_settled(&self) -> bool {
        !self.loading
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::loading()
    }
}
