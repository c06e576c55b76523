//! Error types for request validation.

use thiserror::Error;

use crate::Timestamp;

/// Result type alias for request validation.
pub type Result<T> = std::result::Result<T, RequestError>;

/// Errors that reject a download request before any process is started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The request carried no URL, or only whitespace.
    #[error("No URL provided")]
    MissingUrl,

    /// Unknown download mode.
    #[error("Unknown mode '{0}', expected 'video' or 'audio'")]
    UnknownMode(String),

    /// Unknown download scope.
    #[error("Unknown download type '{0}', expected 'single' or 'playlist'")]
    UnknownScope(String),

    /// Quality tier could not be parsed.
    #[error(transparent)]
    Quality(#[from] QualityParseError),

    /// Trim timestamp could not be parsed.
    #[error(transparent)]
    Timestamp(#[from] TimestampParseError),

    /// Invalid trim range.
    #[error(transparent)]
    TrimRange(#[from] TrimRangeError),

    /// No destination directory was given and none could be determined.
    #[error("Could not determine a download directory")]
    NoDestination,
}

/// Error returned when parsing an invalid quality tier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid quality '{0}', expected 'max' or a height such as '1080p'")]
pub struct QualityParseError(pub(crate) String);

/// Error returned when parsing an invalid trim timestamp.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid timestamp '{0}', expected SS, MM:SS or HH:MM:SS")]
pub struct TimestampParseError(pub(crate) String);

/// Error for invalid trim ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrimRangeError {
    /// Only one end of the range was supplied.
    #[error("Trimming needs both a start and an end time")]
    Incomplete,

    /// Start is not before end.
    #[error("Invalid trim range: {start} is not before {end}")]
    Empty {
        /// The start timestamp.
        start: Timestamp,
        /// The end timestamp.
        end: Timestamp,
    },
}
