//! Download requests and their wire representation.

use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{Quality, RequestError, Result, TrimRange};

/// What to keep from the fetched media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Video with audio, muxed into one container.
    #[default]
    Video,
    /// Audio only, extracted to a lossy codec.
    Audio,
}

impl Mode {
    /// Returns the mode as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mode {
    type Err = RequestError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            _ => Err(RequestError::UnknownMode(s.to_string())),
        }
    }
}

/// Whether a playlist URL expands to all of its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Only the addressed item, even if the URL names a playlist.
    #[default]
    Single,
    /// Every entry of the playlist.
    Playlist,
}

impl Scope {
    /// Returns the scope as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Playlist => "playlist",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Scope {
    type Err = RequestError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "playlist" => Ok(Self::Playlist),
            _ => Err(RequestError::UnknownScope(s.to_string())),
        }
    }
}

/// A validated download request.
///
/// The URL is guaranteed non-blank. A request is never mutated once a job has
/// taken it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    url: String,
    mode: Mode,
    scope: Scope,
    destination_dir: PathBuf,
    quality: Quality,
    trim: Option<TrimRange>,
    sponsorblock_remove: bool,
    log_to_file: bool,
}

impl DownloadRequest {
    /// Creates a request for a single video at maximum quality.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingUrl`] if the URL is blank.
    pub fn new(url: impl Into<String>, destination_dir: impl Into<PathBuf>) -> Result<Self> {
        let url = url.into().trim().to_string();
        if url.is_empty() {
            return Err(RequestError::MissingUrl);
        }
        Ok(Self {
            url,
            mode: Mode::Video,
            scope: Scope::Single,
            destination_dir: destination_dir.into(),
            quality: Quality::Max,
            trim: None,
            sponsorblock_remove: false,
            log_to_file: false,
        })
    }

    /// Sets the download mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the playlist scope.
    #[must_use]
    pub const fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the quality tier.
    #[must_use]
    pub const fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Requests a trim to the given range after download.
    #[must_use]
    pub const fn with_trim(mut self, trim: Option<TrimRange>) -> Self {
        self.trim = trim;
        self
    }

    /// Enables removal of SponsorBlock segments.
    #[must_use]
    pub const fn with_sponsorblock_remove(mut self, enabled: bool) -> Self {
        self.sponsorblock_remove = enabled;
        self
    }

    /// Enables the plain-text output log in the destination directory.
    #[must_use]
    pub const fn with_log_to_file(mut self, enabled: bool) -> Self {
        self.log_to_file = enabled;
        self
    }

    /// The media URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The download mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The playlist scope.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// The directory downloaded files land in.
    #[must_use]
    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    /// The quality tier.
    #[must_use]
    pub const fn quality(&self) -> Quality {
        self.quality
    }

    /// The requested trim range, if any.
    #[must_use]
    pub const fn trim(&self) -> Option<TrimRange> {
        self.trim
    }

    /// Whether SponsorBlock segments are removed.
    #[must_use]
    pub const fn sponsorblock_remove(&self) -> bool {
        self.sponsorblock_remove
    }

    /// Whether raw tool output is appended to a log file.
    #[must_use]
    pub const fn log_to_file(&self) -> bool {
        self.log_to_file
    }
}

/// Download request as posted by the UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestPayload {
    /// Media URL.
    #[serde(default)]
    pub url: Option<String>,
    /// `video` or `audio`.
    #[serde(default)]
    pub mode: Option<String>,
    /// `single` or `playlist`.
    #[serde(default, rename = "type")]
    pub scope: Option<String>,
    /// Destination directory; the user's Downloads directory when absent.
    #[serde(default)]
    pub save_path: Option<String>,
    /// `max` or a height such as `1080p`.
    #[serde(default)]
    pub quality: Option<String>,
    /// Trim start timestamp.
    #[serde(default)]
    pub trim_start: Option<String>,
    /// Trim end timestamp.
    #[serde(default)]
    pub trim_end: Option<String>,
    /// Remove SponsorBlock segments.
    #[serde(default)]
    pub sponsorblock: bool,
    /// Append raw tool output to `download_log.txt`.
    #[serde(default)]
    pub log_to_file: bool,
}

impl RequestPayload {
    /// Validates the payload into a [`DownloadRequest`].
    ///
    /// `fallback_dir` is used when the payload has no `save_path`.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing URL, unknown mode or type, invalid
    /// quality, or an invalid trim range.
    pub fn into_request(self, fallback_dir: Option<&Path>) -> Result<DownloadRequest> {
        let url = self.url.unwrap_or_default();
        let mode: Mode = optional_field(self.mode.as_deref())
            .map_or(Ok(Mode::default()), str::parse::<Mode>)?;
        let scope: Scope = optional_field(self.scope.as_deref())
            .map_or(Ok(Scope::default()), str::parse::<Scope>)?;
        let quality: Quality = optional_field(self.quality.as_deref())
            .map_or(Ok(Quality::default()), str::parse::<Quality>)?;
        let trim = TrimRange::from_parts(self.trim_start.as_deref(), self.trim_end.as_deref())?;

        let destination = match optional_field(self.save_path.as_deref()) {
            Some(path) => PathBuf::from(path),
            None => fallback_dir
                .map(Path::to_path_buf)
                .or_else(default_download_dir)
                .ok_or(RequestError::NoDestination)?,
        };

        Ok(DownloadRequest::new(url, destination)?
            .with_mode(mode)
            .with_scope(scope)
            .with_quality(quality)
            .with_trim(trim)
            .with_sponsorblock_remove(self.sponsorblock)
            .with_log_to_file(self.log_to_file))
    }
}

fn optional_field(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Returns the user's Downloads directory.
///
/// Uses the platform directory lookup, falling back to `$HOME/Downloads`.
#[must_use]
pub fn default_download_dir() -> Option<PathBuf> {
    UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join("Downloads"))
        })
}
