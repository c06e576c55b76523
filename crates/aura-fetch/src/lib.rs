//! External tool invocation for the aura download pipeline.
//!
//! This crate provides everything between a request and the raw tool output:
//!
//! - [`ToolConfig`] - Which programs to run and how much output to buffer
//! - [`download_args`] / [`trim_args`] - Deterministic argument vectors
//! - [`ProcessRunner`] - Spawns a tool and streams its output line by line
//! - [`ProgressParser`] - Recovers the output path and detects throttling
//! - [`probe`] - Read-only metadata lookup

#![doc(issue_tracker_base_url = "https://github.com/aura-downloader/aura/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod command;
mod matcher;
mod parser;
mod probe;
mod runner;
mod split;
mod tools;

pub use command::{
    AUDIO_TEMPLATE, MERGE_CONTAINER, VIDEO_TEMPLATE, backup_sibling, download_args, probe_args,
    trim_args, trimmed_sibling, video_format_selector,
};
pub use matcher::{LineSignal, OutputMatcher, PathPriority, YtDlpMatcher, is_rate_limited};
pub use parser::{ParsedLine, ProgressParser, ResolvedOutput};
pub use probe::{ProbeError, probe};
pub use runner::{CapturedOutput, ExitReport, ProcessError, ProcessRunner, RunningProcess};
pub use split::LineSplitter;
pub use tools::{ToolCommand, ToolConfig};
