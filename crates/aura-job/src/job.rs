//! Job records and the job state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::TransitionError;

/// Unique identifier for a download job.
pub type JobId = Uuid;

/// Stage of a download job.
///
/// ```text
/// Building -> Running -> Succeeded -> Trimming -> TrimSucceeded
///    |           |                        \-----> TrimFailed
///    v           +-----> Failed
///  Failed        \-----> RateLimited
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Validating the request and preparing the command.
    #[default]
    Building,
    /// The downloader is running.
    Running,
    /// The downloader exited successfully.
    Succeeded,
    /// The job failed.
    Failed,
    /// The host throttled the download and the job was stopped.
    RateLimited,
    /// The transcoder is cutting the downloaded file.
    Trimming,
    /// The trimmed file replaced the original.
    TrimSucceeded,
    /// Trimming failed; the untrimmed download remains.
    TrimFailed,
}

impl JobState {
    /// Returns true if the state can be followed by `next`.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Building, Self::Running | Self::Failed)
                | (Self::Running, Self::Succeeded | Self::Failed | Self::RateLimited)
                | (Self::Succeeded, Self::Trimming)
                | (Self::Trimming, Self::TrimSucceeded | Self::TrimFailed)
        )
    }

    /// Returns true if the state reports overall success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded | Self::TrimSucceeded)
    }

    /// Returns the state as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::RateLimited => "rate_limited",
            Self::Trimming => "trimming",
            Self::TrimSucceeded => "trim_succeeded",
            Self::TrimFailed => "trim_failed",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bookkeeping for one job.
///
/// Owned by the task running the job; nothing about a job outlives it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Unique identifier for this job.
    pub id: JobId,
    /// Timestamp when the job was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the job reached its final state.
    pub finished_at: Option<DateTime<Utc>>,
    /// Current state.
    pub state: JobState,
    /// Output file recovered from the downloader, if any.
    pub output_path: Option<PathBuf>,
}

impl Default for JobRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRecord {
    /// Creates a record in the [`JobState::Building`] state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            finished_at: None,
            state: JobState::Building,
            output_path: None,
        }
    }

    /// Moves the job to `next`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed; the state is left
    /// unchanged.
    pub fn transition(&mut self, next: JobState) -> Result<(), TransitionError> {
        if !self.state.can_transition_to(next) {
            return Err(TransitionError {
                from: self.state,
                to: next,
            });
        }
        log::debug!("job {}: {} -> {}", self.id, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Stamps the finish time.
    pub fn mark_finished(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Returns true once the finish time is set.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

/// How a job ended.
#[derive(Debug)]
pub enum JobOutcome {
    /// Completed; the file is where the downloader (and trimmer) left it.
    Completed,
    /// Completed, but a requested step was skipped.
    PartialSuccess {
        /// What was skipped and why.
        warning: String,
    },
    /// Failed or stopped.
    Failed(crate::JobError),
}

impl JobOutcome {
    /// Returns true for both kinds of completion.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_paths() {
        let mut record = JobRecord::new();
        assert_eq!(record.state, JobState::Building);
        record.transition(JobState::Running).unwrap();
        record.transition(JobState::Succeeded).unwrap();
        assert!(record.state.is_success());
        record.transition(JobState::Trimming).unwrap();
        assert!(!record.state.is_success());
        record.transition(JobState::TrimSucceeded).unwrap();
        assert!(record.state.is_success());
    }

    #[test]
    fn test_rejected_transitions() {
        let mut record = JobRecord::new();
        let err = record.transition(JobState::Trimming).unwrap_err();
        assert_eq!(err.from, JobState::Building);
        assert_eq!(err.to, JobState::Trimming);
        assert_eq!(record.state, JobState::Building);

        record.transition(JobState::Running).unwrap();
        record.transition(JobState::RateLimited).unwrap();
        assert!(record.transition(JobState::Trimming).is_err());
        assert!(record.transition(JobState::Succeeded).is_err());
    }

    #[test]
    fn test_terminal_states_have_no_successors() {
        let all = [
            JobState::Building,
            JobState::Running,
            JobState::Succeeded,
            JobState::Failed,
            JobState::RateLimited,
            JobState::Trimming,
            JobState::TrimSucceeded,
            JobState::TrimFailed,
        ];
        for terminal in [
            JobState::Failed,
            JobState::RateLimited,
            JobState::TrimSucceeded,
            JobState::TrimFailed,
        ] {
            assert!(all.iter().all(|next| !terminal.can_transition_to(*next)));
        }
    }

    #[test]
    fn test_record_serializes() {
        let mut record = JobRecord::new();
        record.mark_finished();
        assert!(record.is_finished());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["state"], "building");
        assert!(json["finished_at"].is_string());
    }
}
