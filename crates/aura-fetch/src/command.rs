//! Argument construction for the downloader and the transcoder.
//!
//! Both builders are pure: the same input always yields the same ordered
//! argument vector, and nothing touches the filesystem.

use aura_types::{DownloadRequest, Mode, Quality, Scope, TrimRange};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Output template for video downloads.
pub const VIDEO_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Output template for audio downloads.
pub const AUDIO_TEMPLATE: &str = "%(artist)s - %(title)s.%(ext)s";

/// Container the downloader merges separate video and audio streams into.
pub const MERGE_CONTAINER: &str = "mp4";

/// Builds the downloader argument vector for a request.
///
/// The URL is always the final argument. Trimming is never delegated to the
/// downloader; the full file is fetched and cut afterwards.
///
/// # Example
///
/// ```
/// use aura_fetch::download_args;
/// use aura_types::{DownloadRequest, Mode};
///
/// let request = DownloadRequest::new("https://example.com/v", "/media")
///     .unwrap()
///     .with_mode(Mode::Audio);
/// let args = download_args(&request);
/// assert_eq!(args.last().unwrap(), "https://example.com/v");
/// assert!(args.iter().any(|a| a == "--audio-format"));
/// ```
#[must_use]
pub fn download_args(request: &DownloadRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--newline".into()];

    args.push(
        match request.scope() {
            Scope::Single => "--no-playlist",
            Scope::Playlist => "--yes-playlist",
        }
        .into(),
    );

    let template = match request.mode() {
        Mode::Video => VIDEO_TEMPLATE,
        Mode::Audio => AUDIO_TEMPLATE,
    };
    args.push("--output".into());
    args.push(request.destination_dir().join(template).into_os_string());

    match request.mode() {
        Mode::Audio => {
            args.extend(
                ["-x", "--audio-format", "mp3", "--audio-quality", "0"]
                    .into_iter()
                    .map(OsString::from),
            );
        }
        Mode::Video => {
            args.push("-f".into());
            args.push(video_format_selector(request.quality()).into());
            args.push("--merge-output-format".into());
            args.push(MERGE_CONTAINER.into());
        }
    }

    if request.sponsorblock_remove() {
        args.push("--sponsorblock-remove".into());
        args.push("default".into());
    }

    args.push(request.url().into());
    args
}

/// Returns the format selector for a video quality tier.
#[must_use]
pub fn video_format_selector(quality: Quality) -> String {
    match quality.max_height() {
        None => "bestvideo+bestaudio/best".to_string(),
        Some(h) => format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]/best"),
    }
}

/// Builds the metadata probe argument vector.
#[must_use]
pub fn probe_args(url: &str) -> Vec<OsString> {
    vec!["-J".into(), "--flat-playlist".into(), url.into()]
}

/// Builds the transcoder argument vector that cuts `source` to `range`.
///
/// The seek is placed after the input so every frame is decoded and the cut
/// is frame-accurate.
#[must_use]
pub fn trim_args(source: &Path, target: &Path, range: TrimRange, mode: Mode) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-y", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(source.as_os_str().to_owned());
    args.push("-ss".into());
    args.push(range.start.to_transcoder_arg().into());
    args.push("-to".into());
    args.push(range.end.to_transcoder_arg().into());

    let profile: &[&str] = match mode {
        Mode::Video => &[
            "-c:v", "libx264", "-preset", "fast", "-crf", "22", "-c:a", "aac", "-b:a", "192k",
        ],
        Mode::Audio => &["-vn", "-c:a", "libmp3lame", "-q:a", "0"],
    };
    args.extend(profile.iter().map(OsString::from));
    args.push(target.as_os_str().to_owned());
    args
}

/// Returns `<stem>_trimmed.<ext>` next to `path`.
#[must_use]
pub fn trimmed_sibling(path: &Path) -> PathBuf {
    sibling_with_suffix(path, "_trimmed")
}

/// Returns `<stem>_original.<ext>` next to `path`, used as the backup while
/// the trimmed file replaces the original.
#[must_use]
pub fn backup_sibling(path: &Path) -> PathBuf {
    sibling_with_suffix(path, "_original")
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = OsString::from(format!("{stem}{suffix}"));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}
