//! Cutting a downloaded file to the requested range.

use aura_fetch::{ProcessRunner, ToolCommand, backup_sibling, trim_args, trimmed_sibling};
use aura_types::{Mode, TrimRange};
use std::path::Path;

use crate::{JobError, JobOutput, ReplaceError};

/// Re-encodes a downloaded file to a time range and swaps it in for the
/// original.
#[derive(Debug, Clone, Copy)]
pub struct TrimStage<'a> {
    runner: &'a ProcessRunner,
    transcoder: &'a ToolCommand,
}

impl<'a> TrimStage<'a> {
    /// Creates a stage that runs `transcoder`.
    #[must_use]
    pub const fn new(runner: &'a ProcessRunner, transcoder: &'a ToolCommand) -> Self {
        Self { runner, transcoder }
    }

    /// Trims `source` in place.
    ///
    /// The transcoder writes `<stem>_trimmed.<ext>` next to the source; on
    /// success that file replaces the source.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Tool`] if the transcoder cannot be run,
    /// [`JobError::TrimFailed`] if it exits unsuccessfully (the partial output
    /// is removed and the source is untouched), and [`JobError::Replace`] if
    /// the swap fails.
    pub async fn run(
        &self,
        source: &Path,
        range: TrimRange,
        mode: Mode,
        output: &mut JobOutput,
    ) -> Result<(), JobError> {
        let target = trimmed_sibling(source);
        log::info!(
            "trimming {} to {} ({} ms kept)",
            source.display(),
            range,
            range.duration_millis()
        );
        output
            .note(format!(
                "> [aura] Trimming {} from {} to {}...",
                file_name(source),
                range.start,
                range.end
            ))
            .await;

        let mut process = self
            .runner
            .spawn(self.transcoder, &trim_args(source, &target, range, mode))?;
        while let Some(line) = process.next_line().await {
            let shown = format!("[ffmpeg] {}", line.trim());
            output.tool_line(&line, shown).await;
        }
        let exit = process.finish().await?;

        if !exit.success() {
            remove_partial(&target).await;
            return Err(JobError::TrimFailed { exit });
        }

        output
            .note("> [aura] Trim successful, replacing original file...")
            .await;
        replace_original(source, &target).await?;
        output.note("> [aura] Ready!").await;
        Ok(())
    }
}

/// Replaces `original` with `trimmed`, all or nothing.
///
/// The original is moved to a sibling backup first, the trimmed file is
/// renamed onto the original path, and only then is the backup deleted.
///
/// # Errors
///
/// Returns an error if either rename fails. The original content is always
/// left on disk and the trimmed file is never deleted.
pub async fn replace_original(original: &Path, trimmed: &Path) -> Result<(), ReplaceError> {
    let backup = backup_sibling(original);

    tokio::fs::rename(original, &backup)
        .await
        .map_err(|source| ReplaceError::Backup {
            original: original.to_path_buf(),
            trimmed: trimmed.to_path_buf(),
            source,
        })?;

    if let Err(source) = tokio::fs::rename(trimmed, original).await {
        return match tokio::fs::rename(&backup, original).await {
            Ok(()) => Err(ReplaceError::Rename {
                original: original.to_path_buf(),
                trimmed: trimmed.to_path_buf(),
                source,
            }),
            Err(restore) => {
                log::error!(
                    "rename of {} failed ({source}) and restore failed ({restore})",
                    trimmed.display()
                );
                Err(ReplaceError::Restore {
                    original: original.to_path_buf(),
                    backup,
                    trimmed: trimmed.to_path_buf(),
                    source: restore,
                })
            }
        };
    }

    if let Err(e) = tokio::fs::remove_file(&backup).await {
        log::warn!("could not remove backup {}: {e}", backup.display());
    }
    Ok(())
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => log::debug!("removed partial trim output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("could not remove partial trim output {}: {e}", path.display()),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
