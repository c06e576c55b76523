//! Metadata describing a URL before download.

use serde::{Deserialize, Serialize};

/// Summary of a media URL, produced by the metadata probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Title of the video or playlist.
    pub title: String,
    /// Duration in seconds, 0 when unknown.
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
    /// Whether the URL resolved to a playlist.
    pub is_playlist: bool,
    /// Number of playlist entries, 1 for a single item.
    #[serde(rename = "entries_count")]
    pub entry_count: usize,
    /// Format descriptors as reported by the downloader, passed through untouched.
    #[serde(rename = "formats")]
    pub available_formats: Vec<serde_json::Value>,
}

impl MediaInfo {
    /// Title used when the downloader reports none.
    pub const UNKNOWN_TITLE: &'static str = "Unknown Title";

    /// Builds a summary from the downloader's JSON dump (`-J --flat-playlist`).
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not valid JSON.
    pub fn from_probe_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let dump: ProbeDump = serde_json::from_slice(bytes)?;

        let is_playlist = dump.entries.is_some() || dump.kind.as_deref() == Some("playlist");
        let entry_count = if is_playlist {
            dump.entries.as_ref().map_or(0, Vec::len)
        } else {
            1
        };

        Ok(Self {
            title: dump
                .title
                .unwrap_or_else(|| Self::UNKNOWN_TITLE.to_string()),
            duration_seconds: dump.duration.filter(|d| d.is_finite() && *d >= 0.0).unwrap_or(0.0),
            is_playlist,
            entry_count,
            available_formats: dump.formats.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProbeDump {
    title: Option<String>,
    duration: Option<f64>,
    #[serde(rename = "_type")]
    kind: Option<String>,
    entries: Option<Vec<serde_json::Value>>,
    formats: Option<Vec<serde_json::Value>>,
}
