//! Download and trim online media by driving `yt-dlp` and `ffmpeg`.
//!
//! This is a facade crate that re-exports functionality from the aura
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use aura_lib::prelude::*;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = DownloadRequest::new("https://www.youtube.com/watch?v=aqz-KE-bpKQ", "/tmp/media")?
//!         .with_quality("720p".parse()?);
//!
//!     let orchestrator = JobOrchestrator::new(ToolConfig::default().resolved());
//!     let mut events = orchestrator.start(request);
//!     while let Some(event) = events.next().await {
//!         println!("{}", event.to_json());
//!     }
//!
//!     Ok(())
//! }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/aura-downloader/aura/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use aura_types::*;

// Re-export tool invocation
#[cfg(feature = "fetch")]
pub use aura_fetch::{
    ExitReport, LineSignal, OutputMatcher, ParsedLine, PathPriority, ProbeError, ProcessError,
    ProcessRunner, ProgressParser, RunningProcess, ToolCommand, ToolConfig, YtDlpMatcher,
    download_args, probe, trim_args,
};

// Re-export job orchestration
#[cfg(feature = "job")]
pub use aura_job::{
    EventSink, FileLog, JobError, JobOrchestrator, JobOutcome, JobRecord, JobReport, JobState,
    JobStream, ReplaceError, TrimStage, event_channel,
};

/// Prelude module for convenient imports.
///
/// ```
/// use aura_lib::prelude::*;
/// ```
pub mod prelude {
    pub use aura_types::{
        DownloadRequest, JobEvent, MediaInfo, Mode, Quality, RequestError, RequestPayload, Scope,
        Timestamp, TrimRange,
    };

    #[cfg(feature = "fetch")]
    pub use aura_fetch::{ProbeError, ProcessRunner, ToolCommand, ToolConfig, probe};

    #[cfg(feature = "job")]
    pub use aura_job::{JobError, JobOrchestrator, JobState, JobStream};
}
