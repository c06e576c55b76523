//! Core types for the aura media download pipeline.
//!
//! This crate provides the data structures shared by every stage of a job:
//!
//! - [`DownloadRequest`] - A validated download request
//! - [`RequestPayload`] - The request as posted by the UI
//! - [`Quality`] - Video quality tier
//! - [`Timestamp`] / [`TrimRange`] - Section of media to keep
//! - [`MediaInfo`] - Metadata probe summary
//! - [`JobEvent`] - Live job output and terminal status

#![doc(issue_tracker_base_url = "https://github.com/aura-downloader/aura/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod event;
mod media;
mod quality;
mod request;
mod trim_range;

pub use error::{QualityParseError, RequestError, Result, TimestampParseError, TrimRangeError};
pub use event::{JobEvent, RATE_LIMITED_MESSAGE, WireEvent};
pub use media::MediaInfo;
pub use quality::Quality;
pub use request::{DownloadRequest, Mode, RequestPayload, Scope, default_download_dir};
pub use trim_range::{Timestamp, TrimRange};
