//! Optional plain-text log of raw tool output.

use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Appends raw output lines to a file in the destination directory.
///
/// The first write failure disables the log for the rest of the job; the job
/// itself is never affected.
#[derive(Debug)]
pub struct FileLog {
    path: PathBuf,
    file: Option<File>,
    disabled: bool,
}

impl FileLog {
    /// File name used inside the destination directory.
    pub const FILE_NAME: &'static str = "download_log.txt";

    /// Prepares a log in `dir`. The file is opened on the first append.
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(Self::FILE_NAME),
            file: None,
            disabled: false,
        }
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true once a failure has disabled the log.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Appends one line.
    ///
    /// Returns a warning the first time writing fails, and `None` otherwise.
    pub async fn append(&mut self, line: &str) -> Option<String> {
        if self.disabled {
            return None;
        }
        match self.write_line(line).await {
            Ok(()) => None,
            Err(e) => {
                self.disabled = true;
                self.file = None;
                log::warn!("disabling output log {}: {e}", self.path.display());
                Some(format!(
                    "> [aura] Could not write {}: {e}. File logging disabled.",
                    self.path.display()
                ))
            }
        }
    }

    async fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        let file = match self.file.take() {
            Some(file) => file,
            None => {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .await?
            }
        };
        let file = self.file.insert(file);
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await
    }
}
