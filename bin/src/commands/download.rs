//! Download command implementation.
//!
//! Runs one job in the foreground and renders its events on the terminal.

use crate::display::{is_progress_line, job_spinner};
use anyhow::{Context, Result, bail};
use aura_lib::RATE_LIMITED_MESSAGE;
use aura_lib::prelude::*;
use futures::StreamExt;

/// Download a URL described by `payload`.
pub(crate) async fn download(
    config: ToolConfig,
    payload: RequestPayload,
    quiet: bool,
) -> Result<()> {
    let request = payload
        .into_request(None)
        .context("Invalid download request")?;
    let destination = request.destination_dir().to_path_buf();

    let orchestrator = JobOrchestrator::new(config);
    let progress = job_spinner(quiet);
    progress.set_message(format!("Fetching {}", request.url()));

    let mut events = orchestrator.start(request);
    while let Some(event) = events.next().await {
        match event {
            JobEvent::LogLine(line) => {
                if is_progress_line(&line) {
                    progress.set_message(line);
                } else if !quiet {
                    progress.println(line);
                }
            }
            JobEvent::StatusCompleted => {
                progress.finish_and_clear();
                if !quiet {
                    println!("Saved to: {}", destination.display());
                }
                return Ok(());
            }
            JobEvent::StatusFailed(reason) => {
                progress.abandon();
                bail!(reason);
            }
            JobEvent::RateLimited => {
                progress.abandon();
                bail!(RATE_LIMITED_MESSAGE);
            }
        }
    }

    progress.abandon();
    bail!("Job ended without reporting a result")
}
