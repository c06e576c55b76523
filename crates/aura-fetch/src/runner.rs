//! Spawning external tools and streaming their output.
//!
//! Standard output and standard error of a streamed process share one OS
//! pipe, so lines arrive in the order the child wrote them.

use std::ffi::OsString;
use std::io::PipeReader;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::split::LineSplitter;
use crate::tools::ToolCommand;

/// How long the drain task may keep running after the child has been reaped.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

const READ_CHUNK: usize = 8 * 1024;

/// Errors that can occur while running an external tool.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be found.
    #[error("{tool} was not found. Install it or put it on PATH.")]
    ToolMissing {
        /// Tool display name.
        tool: String,
    },

    /// The program exists but could not be started.
    #[error("Failed to start {tool}: {source}")]
    Spawn {
        /// Tool display name.
        tool: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// I/O failure while talking to a running process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    fn from_spawn(tool: &ToolCommand, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::ToolMissing {
                tool: tool.display_name(),
            },
            _ => Self::Spawn {
                tool: tool.display_name(),
                source: err,
            },
        }
    }
}

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    /// Exit code, `None` if the process was ended by a signal.
    pub code: Option<i32>,
    /// Whether [`RunningProcess::terminate`] was called.
    pub terminated: bool,
}

impl ExitReport {
    /// Returns true if the process exited with code 0 on its own.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0)) && !self.terminated
    }

    /// Describes the exit for user-facing messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Captured result of a run-to-completion invocation.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    /// Exit report.
    pub exit: ExitReport,
    /// Raw standard output.
    pub stdout: Vec<u8>,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

/// Starts external tools with piped output.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    line_buffer: usize,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ProcessRunner {
    /// Creates a runner whose output channel holds up to `line_buffer` lines.
    #[must_use]
    pub const fn new(line_buffer: usize) -> Self {
        Self {
            line_buffer: if line_buffer == 0 { 1 } else { line_buffer },
        }
    }

    fn command(tool: &ToolCommand, args: &[OsString]) -> Command {
        let mut cmd = Command::new(&tool.program);
        cmd.args(&tool.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// Starts `tool` with `args` and begins draining its combined output.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::ToolMissing`] if the program does not exist and
    /// [`ProcessError::Spawn`] for any other start failure.
    pub fn spawn(
        &self,
        tool: &ToolCommand,
        args: &[OsString],
    ) -> Result<RunningProcess, ProcessError> {
        log::debug!("spawning {} with {} args", tool.program.display(), args.len());
        let (reader, writer) = std::io::pipe()?;

        let mut cmd = Self::command(tool, args);
        cmd.stdout(writer.try_clone()?).stderr(writer);
        let child = cmd.spawn().map_err(|e| ProcessError::from_spawn(tool, e))?;
        // The parent's write ends must close, or the reader never sees EOF.
        drop(cmd);

        let (tx, rx) = mpsc::channel(self.line_buffer);
        let drain = start_drain(reader, tx)?;

        Ok(RunningProcess {
            tool: tool.display_name(),
            child,
            lines: rx,
            drain,
            terminated: false,
        })
    }

    /// Runs `tool` to completion and captures stdout and stderr separately.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started or waited on.
    pub async fn output(
        &self,
        tool: &ToolCommand,
        args: &[OsString],
    ) -> Result<CapturedOutput, ProcessError> {
        log::debug!("running {} to completion", tool.program.display());
        let output = Self::command(tool, args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ProcessError::from_spawn(tool, e))?;
        Ok(CapturedOutput {
            exit: ExitReport {
                code: output.status.code(),
                terminated: false,
            },
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// A started tool whose output is being drained.
///
/// The child is killed if this handle is dropped before [`finish`](Self::finish).
#[derive(Debug)]
pub struct RunningProcess {
    tool: String,
    child: Child,
    lines: mpsc::Receiver<String>,
    drain: JoinHandle<()>,
    terminated: bool,
}

impl RunningProcess {
    /// Returns the next output line, or `None` once the output is exhausted.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    /// Kills the process.
    ///
    /// This is a hard kill (`SIGKILL` on unix): the tool gets no chance to
    /// clean up partial files, and any helper process it started keeps
    /// running until it exits on its own. Never fails; a process that has
    /// already exited is left alone.
    pub fn terminate(&mut self) {
        self.terminated = true;
        if let Err(e) = self.child.start_kill() {
            log::debug!("kill request for {} ignored: {e}", self.tool);
        }
    }

    /// Reaps the process and returns how it ended.
    ///
    /// Lines not yet read are discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if waiting on the child fails.
    pub async fn finish(mut self) -> Result<ExitReport, ProcessError> {
        self.lines.close();
        let status = self.child.wait().await?;

        if tokio::time::timeout(DRAIN_GRACE, &mut self.drain).await.is_err() {
            log::warn!("{} output drain did not finish in time", self.tool);
            self.drain.abort();
        }

        let report = ExitReport {
            code: status.code(),
            terminated: self.terminated,
        };
        log::debug!("{} finished: {}", self.tool, report.describe());
        Ok(report)
    }
}

#[cfg(unix)]
fn start_drain(reader: PipeReader, tx: mpsc::Sender<String>) -> std::io::Result<JoinHandle<()>> {
    let receiver = tokio::net::unix::pipe::Receiver::from_owned_fd(reader.into())?;
    Ok(tokio::spawn(drain(receiver, tx)))
}

#[cfg(not(unix))]
fn start_drain(reader: PipeReader, tx: mpsc::Sender<String>) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::task::spawn_blocking(move || {
        drain_blocking(reader, tx);
    }))
}

#[cfg(unix)]
async fn drain<R>(mut reader: R, tx: mpsc::Sender<String>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    use tokio::io::AsyncReadExt;

    let mut splitter = LineSplitter::new();
    let mut buf = vec![0u8; READ_CHUNK];
    let mut open = true;

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::debug!("read from output pipe failed: {e}");
                break;
            }
        };

        let lines = splitter.push(&buf[..n]);
        if !open {
            continue;
        }
        for text in lines {
            if tx.send(text).await.is_err() {
                // Keep reading so the child never blocks on a full pipe.
                open = false;
                break;
            }
        }
    }

    if open && let Some(text) = splitter.finish() {
        let _ = tx.send(text).await;
    }
}

#[cfg(not(unix))]
fn drain_blocking<R: std::io::Read>(mut reader: R, tx: mpsc::Sender<String>) {
    let mut splitter = LineSplitter::new();
    let mut buf = vec![0u8; READ_CHUNK];
    let mut open = true;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::debug!("read from output pipe failed: {e}");
                break;
            }
        };

        let lines = splitter.push(&buf[..n]);
        if !open {
            continue;
        }
        for text in lines {
            if tx.blocking_send(text).is_err() {
                open = false;
                break;
            }
        }
    }

    if open && let Some(text) = splitter.finish() {
        let _ = tx.blocking_send(text);
    }
}
