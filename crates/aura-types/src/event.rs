//! Events emitted over the lifetime of a download job.

use serde::{Deserialize, Serialize};

/// Message shown when the host throttles requests.
pub const RATE_LIMITED_MESSAGE: &str =
    "Rate limited by the host (HTTP 429 Too Many Requests). Wait a while before trying again.";

/// One step of a job's live output.
///
/// A job emits any number of [`JobEvent::LogLine`]s followed by exactly one
/// terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// A line of tool output or a pipeline note.
    LogLine(String),
    /// The job finished successfully.
    StatusCompleted,
    /// The job failed; the reason is user-facing text.
    StatusFailed(String),
    /// The host refused further requests; the job was stopped.
    RateLimited,
}

impl JobEvent {
    /// Creates a log line event.
    #[must_use]
    pub fn log(text: impl Into<String>) -> Self {
        Self::LogLine(text.into())
    }

    /// Returns true if no further events follow this one.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::LogLine(_))
    }

    /// Converts the event to its wire form.
    #[must_use]
    pub fn to_wire(&self) -> WireEvent {
        match self {
            Self::LogLine(text) => WireEvent::Log { log: text.clone() },
            Self::StatusCompleted => WireEvent::Status {
                status: "completed".to_string(),
            },
            Self::StatusFailed(reason) => WireEvent::Error {
                error: reason.clone(),
            },
            Self::RateLimited => WireEvent::Error {
                error: RATE_LIMITED_MESSAGE.to_string(),
            },
        }
    }

    /// Serializes the event as a single-line JSON object.
    #[must_use]
    pub fn to_json(&self) -> String {
        // Serializing string-only variants cannot fail.
        serde_json::to_string(&self.to_wire()).unwrap_or_default()
    }
}

/// JSON shape of an event on the live stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireEvent {
    /// `{"log": "..."}`
    Log {
        /// Line text.
        log: String,
    },
    /// `{"status": "completed"}`
    Status {
        /// Terminal status.
        status: String,
    },
    /// `{"error": "..."}`
    Error {
        /// Failure reason.
        error: String,
    },
}
