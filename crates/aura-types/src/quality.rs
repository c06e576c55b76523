//! Video quality tiers.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::QualityParseError;

/// Requested video quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum Quality {
    /// Best available stream, no height ceiling.
    #[default]
    Max,
    /// Best stream whose height does not exceed the given pixel count.
    Capped(u32),
}

impl Quality {
    /// Returns the height ceiling, or None for [`Quality::Max`].
    #[must_use]
    pub const fn max_height(&self) -> Option<u32> {
        match self {
            Self::Max => None,
            Self::Capped(h) => Some(*h),
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Max => write!(f, "max"),
            Self::Capped(h) => write!(f, "{h}p"),
        }
    }
}

impl FromStr for Quality {
    type Err = QualityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "max" | "best" => Ok(Self::Max),
            _ => lower
                .strip_suffix('p')
                .and_then(|digits| digits.parse::<u32>().ok())
                .filter(|h| *h > 0)
                .map(Self::Capped)
                .ok_or_else(|| QualityParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Quality {
    type Error = QualityParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Quality> for String {
    fn from(value: Quality) -> Self {
        value.to_string()
    }
}
