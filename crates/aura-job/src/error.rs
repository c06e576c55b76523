//! Error types for download jobs.

use aura_fetch::{ExitReport, ProcessError};
use aura_types::{JobEvent, RequestError};
use std::path::PathBuf;
use thiserror::Error;

use crate::JobState;

/// Result type alias for job operations.
pub type Result<T> = std::result::Result<T, JobError>;

/// Errors that end a job.
///
/// Every variant maps to exactly one terminal [`JobEvent`].
#[derive(Error, Debug)]
pub enum JobError {
    /// The request was rejected before any process started.
    #[error(transparent)]
    Input(#[from] RequestError),

    /// The destination directory could not be created.
    #[error("Failed to create download directory '{path}': {source}")]
    CreateDir {
        /// The directory.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A tool was missing or could not be started.
    #[error(transparent)]
    Tool(#[from] ProcessError),

    /// The downloader exited unsuccessfully.
    #[error("Download failed ({})", .exit.describe())]
    DownloadFailed {
        /// How the downloader ended.
        exit: ExitReport,
    },

    /// The host throttled the download.
    #[error("{}", aura_types::RATE_LIMITED_MESSAGE)]
    RateLimited,

    /// The transcoder exited unsuccessfully while trimming.
    #[error("Trim failed ({}); the original file was kept", .exit.describe())]
    TrimFailed {
        /// How the transcoder ended.
        exit: ExitReport,
    },

    /// The trimmed file could not replace the original.
    #[error(transparent)]
    Replace(#[from] ReplaceError),

    /// The job attempted a state change outside the state machine.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl JobError {
    /// Converts the error into the job's terminal event.
    #[must_use]
    pub fn to_event(&self) -> JobEvent {
        match self {
            Self::RateLimited => JobEvent::RateLimited,
            other => JobEvent::StatusFailed(other.to_string()),
        }
    }

    /// State the job ends in for this error.
    #[must_use]
    pub const fn terminal_state(&self) -> JobState {
        match self {
            Self::RateLimited => JobState::RateLimited,
            Self::TrimFailed { .. } | Self::Replace(_) => JobState::TrimFailed,
            _ => JobState::Failed,
        }
    }
}

/// Errors while swapping a trimmed file in for the original.
///
/// In every case the original content is still present and the trimmed file
/// is left in place for inspection.
#[derive(Error, Debug)]
pub enum ReplaceError {
    /// The original could not be moved aside; nothing changed.
    #[error("Could not move '{}' aside: {source}. Trimmed copy kept at '{}'", .original.display(), .trimmed.display())]
    Backup {
        /// The original file.
        original: PathBuf,
        /// The trimmed file.
        trimmed: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The trimmed file could not be renamed; the original was restored.
    #[error("Could not replace '{}': {source}. Original restored, trimmed copy kept at '{}'", .original.display(), .trimmed.display())]
    Rename {
        /// The original file.
        original: PathBuf,
        /// The trimmed file.
        trimmed: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The rename failed and the original could not be restored either.
    #[error("Could not replace '{}' and could not restore it: {source}. Original is at '{}', trimmed copy at '{}'", .original.display(), .backup.display(), .trimmed.display())]
    Restore {
        /// The original file path.
        original: PathBuf,
        /// Where the original content now lives.
        backup: PathBuf,
        /// The trimmed file.
        trimmed: PathBuf,
        /// Underlying error from the restore attempt.
        source: std::io::Error,
    },
}

/// A state change the job state machine does not allow.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid job transition from {from} to {to}")]
pub struct TransitionError {
    /// Current state.
    pub from: JobState,
    /// Requested state.
    pub to: JobState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_types::RATE_LIMITED_MESSAGE;

    #[test]
    fn test_event_mapping() {
        assert_eq!(JobError::RateLimited.to_event(), JobEvent::RateLimited);
        assert_eq!(JobError::RateLimited.to_string(), RATE_LIMITED_MESSAGE);

        let failed = JobError::DownloadFailed {
            exit: ExitReport {
                code: Some(1),
                terminated: false,
            },
        };
        assert_eq!(
            failed.to_event(),
            JobEvent::StatusFailed("Download failed (exit code 1)".into())
        );
        assert_eq!(failed.terminal_state(), JobState::Failed);
    }

    #[test]
    fn test_input_error_message_passes_through() {
        let err = JobError::from(RequestError::MissingUrl);
        assert_eq!(err.to_string(), "No URL provided");
    }

    #[test]
    fn test_trim_errors_end_in_trim_failed() {
        let err = JobError::TrimFailed {
            exit: ExitReport {
                code: Some(187),
                terminated: false,
            },
        };
        assert_eq!(err.terminal_state(), JobState::TrimFailed);
        assert!(err.to_string().contains("exit code 187"));
    }
}
