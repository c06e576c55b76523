//! Read-only metadata probe.

use aura_types::MediaInfo;
use thiserror::Error;

use crate::command::probe_args;
use crate::runner::{ProcessError, ProcessRunner};
use crate::tools::ToolCommand;

/// Errors that can occur while probing a URL.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The downloader could not be run.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// The downloader exited with an error; its stderr is kept verbatim.
    #[error("{stderr}")]
    Failed {
        /// Exit code, if any.
        code: Option<i32>,
        /// Downloader stderr.
        stderr: String,
    },

    /// The downloader's JSON dump could not be parsed.
    #[error("Unreadable metadata: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fetches metadata for `url` without downloading any media.
///
/// # Errors
///
/// Returns an error if the downloader cannot be run, exits non-zero, or
/// prints something other than a JSON document.
pub async fn probe(
    runner: &ProcessRunner,
    downloader: &ToolCommand,
    url: &str,
) -> Result<MediaInfo, ProbeError> {
    log::info!("probing {url}");
    let output = runner.output(downloader, &probe_args(url)).await?;
    if !output.exit.success() {
        log::warn!("probe of {url} failed with {}", output.exit.describe());
        return Err(ProbeError::Failed {
            code: output.exit.code,
            stderr: output.stderr.trim_end().to_string(),
        });
    }
    Ok(MediaInfo::from_probe_json(&output.stdout)?)
}
