//! Download job orchestration for the aura media downloader.
//!
//! This crate turns a validated request into a stream of job events:
//!
//! - [`JobOrchestrator`] - Runs the downloader, parses its output and trims
//! - [`JobStream`] - Ordered events ending in exactly one terminal event
//! - [`JobRecord`] / [`JobState`] - Per-job state machine
//! - [`TrimStage`] - Frame-accurate cut with all-or-nothing replacement
//! - [`FileLog`] - Optional raw output log in the destination directory

#![doc(issue_tracker_base_url = "https://github.com/aura-downloader/aura/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod file_log;
mod job;
mod orchestrator;
mod output;
mod stream;
mod trim;

pub use error::{JobError, ReplaceError, Result, TransitionError};
pub use file_log::FileLog;
pub use job::{JobId, JobOutcome, JobRecord, JobState};
pub use orchestrator::{JobOrchestrator, JobReport, TRIM_SKIPPED_WARNING};
pub use output::JobOutput;
pub use stream::{EventSink, JobStream, event_channel};
pub use trim::{TrimStage, replace_original};
