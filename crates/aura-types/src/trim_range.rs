//! Trim timestamps and ranges.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{TimestampParseError, TrimRangeError};

/// A position within a media file, with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp {
    millis: u64,
}

impl Timestamp {
    /// Creates a timestamp from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    /// Creates a timestamp from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            millis: secs * 1000,
        }
    }

    /// Returns the timestamp in milliseconds.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.millis
    }

    /// Renders the timestamp as `HH:MM:SS.mmm`, the form the transcoder expects.
    #[must_use]
    pub fn to_transcoder_arg(&self) -> String {
        let total_secs = self.millis / 1000;
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            total_secs / 3600,
            (total_secs / 60) % 60,
            total_secs % 60,
            self.millis % 1000
        )
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total_secs = self.millis / 1000;
        let (h, m, s) = (total_secs / 3600, (total_secs / 60) % 60, total_secs % 60);
        let ms = self.millis % 1000;
        if ms == 0 {
            write!(f, "{h:02}:{m:02}:{s:02}")
        } else {
            write!(f, "{h:02}:{m:02}:{s:02}.{ms:03}")
        }
    }
}

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    /// Parses `SS`, `MM:SS` or `HH:MM:SS`, each with an optional fraction.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TimestampParseError(s.to_string());
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(err());
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (trimmed, None),
        };

        let parts: Vec<&str> = whole.split(':').collect();
        if parts.len() > 3 {
            return Err(err());
        }

        let mut secs: u64 = 0;
        for (idx, part) in parts.iter().enumerate() {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            let value: u64 = part.parse().map_err(|_| err())?;
            // Minutes and seconds fields are bounded once a larger unit precedes them.
            if idx > 0 && value >= 60 {
                return Err(err());
            }
            secs = secs.checked_mul(60).and_then(|v| v.checked_add(value)).ok_or_else(err)?;
        }

        let millis = match fraction {
            None => 0,
            Some(f) if !f.is_empty() && f.len() <= 3 && f.bytes().all(|b| b.is_ascii_digit()) => {
                let padded = format!("{f:0<3}");
                padded.parse::<u64>().map_err(|_| err())?
            }
            Some(_) => return Err(err()),
        };

        secs.checked_mul(1000)
            .and_then(|v| v.checked_add(millis))
            .map(Self::from_millis)
            .ok_or_else(err)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = TimestampParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timestamp> for String {
    fn from(value: Timestamp) -> Self {
        value.to_string()
    }
}

/// A section of media to keep, `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimRange {
    /// Start of the kept section.
    pub start: Timestamp,
    /// End of the kept section.
    pub end: Timestamp,
}

impl TrimRange {
    /// Creates a new trim range, validating that start < end.
    ///
    /// # Errors
    ///
    /// Returns an error if start >= end.
    pub const fn new(start: Timestamp, end: Timestamp) -> Result<Self, TrimRangeError> {
        if start.millis >= end.millis {
            return Err(TrimRangeError::Empty { start, end });
        }
        Ok(Self { start, end })
    }

    /// Builds an optional range from optional wire strings.
    ///
    /// Both absent (or blank) means no trimming; exactly one present is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if only one end is given, either end fails to parse,
    /// or the range is empty.
    pub fn from_parts(
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Option<Self>, crate::RequestError> {
        let start = start.map(str::trim).filter(|s| !s.is_empty());
        let end = end.map(str::trim).filter(|s| !s.is_empty());
        match (start, end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => {
                let range = Self::new(start.parse()?, end.parse()?)?;
                Ok(Some(range))
            }
            _ => Err(TrimRangeError::Incomplete.into()),
        }
    }

    /// Returns the length of the kept section in milliseconds.
    #[must_use]
    pub const fn duration_millis(&self) -> u64 {
        self.end.millis - self.start.millis
    }
}

impl std::fmt::Display for TrimRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
