//! External tool configuration.

use std::ffi::OsString;
use std::path::PathBuf;

/// How to invoke one external tool: a program plus arguments placed before the
/// job's own arguments (e.g. `python -m yt_dlp`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Program name or path.
    pub program: PathBuf,
    /// Arguments inserted before the generated ones.
    pub leading_args: Vec<OsString>,
}

impl ToolCommand {
    /// Creates a tool command with no leading arguments.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Adds leading arguments.
    #[must_use]
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Short name used in logs and error messages.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.program
            .file_name()
            .map_or_else(
                || self.program.to_string_lossy().into_owned(),
                |name| name.to_string_lossy().into_owned(),
            )
    }

    /// Resolves a bare program name against `PATH`.
    ///
    /// Programs given as paths, and names that cannot be found, are left
    /// untouched so that spawning reports the failure.
    #[must_use]
    pub fn resolved(mut self) -> Self {
        if self.program.components().count() == 1 {
            match which::which(&self.program) {
                Ok(path) => self.program = path,
                Err(e) => log::warn!("{} not found on PATH: {e}", self.program.display()),
            }
        }
        self
    }
}

/// Configuration for the external tools and the buffers between them and the
/// event consumer.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Media downloader.
    pub downloader: ToolCommand,
    /// Transcoder used for trimming.
    pub transcoder: ToolCommand,
    /// Output lines buffered between a child's drain tasks and its reader.
    pub line_buffer: usize,
    /// Events buffered between a job and its consumer.
    pub event_buffer: usize,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            downloader: ToolCommand::new(Self::DEFAULT_DOWNLOADER),
            transcoder: ToolCommand::new(Self::DEFAULT_TRANSCODER),
            line_buffer: 256,
            event_buffer: 64,
        }
    }
}

impl ToolConfig {
    /// Default downloader program.
    pub const DEFAULT_DOWNLOADER: &'static str = "yt-dlp";

    /// Default transcoder program.
    pub const DEFAULT_TRANSCODER: &'static str = "ffmpeg";

    /// Resolves both programs against `PATH`.
    #[must_use]
    pub fn resolved(self) -> Self {
        Self {
            downloader: self.downloader.resolved(),
            transcoder: self.transcoder.resolved(),
            ..self
        }
    }
}
