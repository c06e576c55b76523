//! Recognising significant downloader output lines.

use std::path::PathBuf;

/// How strongly a line identifies the final output file.
///
/// Ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathPriority {
    /// The file already existed and was not fetched again.
    AlreadyDownloaded,
    /// The downloader started writing the file.
    Destination,
    /// A post-processor produced the file (merge or audio extraction).
    PostProcessed,
}

/// What a single output line means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSignal {
    /// Nothing beyond the text itself.
    Plain,
    /// The line names an output file.
    OutputPath {
        /// Path as printed, possibly relative.
        path: PathBuf,
        /// Strength of the signal.
        priority: PathPriority,
    },
    /// The host is throttling requests.
    RateLimited,
}

/// Classifies tool output lines.
///
/// Implementations see one line at a time with no look-ahead.
pub trait OutputMatcher: Send + Sync {
    /// Classifies one line.
    fn classify(&self, line: &str) -> LineSignal;
}

/// Matcher for `yt-dlp` output.
#[derive(Debug, Clone, Copy, Default)]
pub struct YtDlpMatcher;

const MERGER_PREFIX: &str = "[Merger] Merging formats into ";
const EXTRACT_AUDIO_PREFIX: &str = "[ExtractAudio] Destination: ";
const DOWNLOAD_DESTINATION_PREFIX: &str = "[download] Destination: ";
const DOWNLOAD_PREFIX: &str = "[download] ";
const ALREADY_DOWNLOADED_SUFFIX: &str = " has already been downloaded";
const ALREADY_DOWNLOADED_MARKER: &str = "Already downloaded: ";

impl OutputMatcher for YtDlpMatcher {
    fn classify(&self, line: &str) -> LineSignal {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix(MERGER_PREFIX) {
            return output_path(rest, PathPriority::PostProcessed);
        }
        if let Some(rest) = line.strip_prefix(EXTRACT_AUDIO_PREFIX) {
            return output_path(rest, PathPriority::PostProcessed);
        }
        if let Some(rest) = line.strip_prefix(DOWNLOAD_DESTINATION_PREFIX) {
            return output_path(rest, PathPriority::Destination);
        }
        if let Some(rest) = line.strip_prefix(DOWNLOAD_PREFIX)
            && let Some(idx) = rest.find(ALREADY_DOWNLOADED_SUFFIX)
        {
            return output_path(&rest[..idx], PathPriority::AlreadyDownloaded);
        }
        if let Some(idx) = line.find(ALREADY_DOWNLOADED_MARKER) {
            return output_path(
                &line[idx + ALREADY_DOWNLOADED_MARKER.len()..],
                PathPriority::AlreadyDownloaded,
            );
        }

        if is_rate_limited(line) {
            return LineSignal::RateLimited;
        }
        LineSignal::Plain
    }
}

/// Returns true if the line reports HTTP 429 throttling.
#[must_use]
pub fn is_rate_limited(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.contains("http error 429") || lower.contains("too many requests")
}

fn output_path(raw: &str, priority: PathPriority) -> LineSignal {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    if unquoted.is_empty() {
        return LineSignal::Plain;
    }
    LineSignal::OutputPath {
        path: PathBuf::from(unquoted),
        priority,
    }
}
