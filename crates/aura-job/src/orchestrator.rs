//! Driving a download job from request to terminal event.

use aura_fetch::{ParsedLine, ProcessRunner, ProgressParser, ToolConfig, download_args};
use aura_types::{DownloadRequest, JobEvent};

use crate::stream::event_channel;
use crate::{
    EventSink, FileLog, JobError, JobOutcome, JobOutput, JobRecord, JobState, JobStream,
    TrimStage,
};

/// Warning shown when a trim was requested but the output file is unknown.
pub const TRIM_SKIPPED_WARNING: &str = "> [aura] Trim skipped: could not determine the \
                                        downloaded file's path. The full file was kept.";

/// Final bookkeeping of a finished job.
#[derive(Debug)]
pub struct JobReport {
    /// The job's record in its final state.
    pub record: JobRecord,
    /// How the job ended.
    pub outcome: JobOutcome,
}

/// Runs download jobs.
///
/// Each job owns its processes, parser and record; the orchestrator itself
/// holds only configuration and can be shared freely.
#[derive(Debug, Clone)]
pub struct JobOrchestrator {
    config: ToolConfig,
    runner: ProcessRunner,
}

impl Default for JobOrchestrator {
    fn default() -> Self {
        Self::new(ToolConfig::default())
    }
}

impl JobOrchestrator {
    /// Creates an orchestrator for the given tools.
    #[must_use]
    pub const fn new(config: ToolConfig) -> Self {
        let runner = ProcessRunner::new(config.line_buffer);
        Self { config, runner }
    }

    /// Returns the tool configuration.
    #[must_use]
    pub const fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Returns the process runner shared by this orchestrator's jobs.
    #[must_use]
    pub const fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    /// Starts a job in the background and returns its event stream.
    ///
    /// The job keeps running if the stream is dropped.
    #[must_use]
    pub fn start(&self, request: DownloadRequest) -> JobStream {
        let record = JobRecord::new();
        let (sink, stream) = event_channel(record.id, self.config.event_buffer);
        let orchestrator = self.clone();
        tokio::spawn(async move {
            orchestrator.run(request, record, sink).await;
        });
        stream
    }

    /// Runs a job to completion, emitting its events to `sink`.
    ///
    /// Exactly one terminal event is emitted, after all output.
    pub async fn run(
        &self,
        request: DownloadRequest,
        mut record: JobRecord,
        sink: EventSink,
    ) -> JobReport {
        log::info!("job {} started for {}", record.id, request.url());
        let mut output = JobOutput::new(sink);

        let outcome = match self.drive(&request, &mut record, &mut output).await {
            Ok(None) => JobOutcome::Completed,
            Ok(Some(warning)) => JobOutcome::PartialSuccess { warning },
            Err(err) => {
                let next = if record.state == JobState::Trimming {
                    JobState::TrimFailed
                } else {
                    err.terminal_state()
                };
                if let Err(e) = record.transition(next) {
                    log::error!("job {}: {e}", record.id);
                }
                JobOutcome::Failed(err)
            }
        };

        let terminal = match &outcome {
            JobOutcome::Completed => JobEvent::StatusCompleted,
            JobOutcome::PartialSuccess { warning } => {
                output.note(warning.clone()).await;
                JobEvent::StatusCompleted
            }
            JobOutcome::Failed(err) => {
                log::warn!("job {} failed: {err}", record.id);
                err.to_event()
            }
        };

        record.mark_finished();
        log::info!("job {} finished in state {}", record.id, record.state);
        output.finish(terminal).await;
        JobReport { record, outcome }
    }

    /// Returns a warning for a partial success.
    async fn drive(
        &self,
        request: &DownloadRequest,
        record: &mut JobRecord,
        output: &mut JobOutput,
    ) -> Result<Option<String>, JobError> {
        let destination = request.destination_dir();
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|source| JobError::CreateDir {
                path: destination.to_path_buf(),
                source,
            })?;
        if request.log_to_file() {
            let file_log = FileLog::new(destination);
            log::debug!("appending tool output to {}", file_log.path().display());
            output.set_file_log(file_log);
        }

        let args = download_args(request);
        let mut process = self.runner.spawn(&self.config.downloader, &args)?;
        record.transition(JobState::Running)?;

        let mut parser = ProgressParser::new(destination);
        let mut rate_limited = false;
        while let Some(line) = process.next_line().await {
            output.record_raw(&line).await;
            match parser.feed(&line) {
                ParsedLine::Log(text) => output.note(text).await,
                ParsedLine::RateLimited(text) => {
                    log::warn!("job {} rate limited: {text}", record.id);
                    process.terminate();
                    rate_limited = true;
                    break;
                }
            }
        }
        let exit = process.finish().await?;

        if rate_limited {
            return Err(JobError::RateLimited);
        }
        if !exit.success() {
            return Err(JobError::DownloadFailed { exit });
        }
        record.transition(JobState::Succeeded)?;
        record.output_path = parser.into_resolved_path();

        let Some(range) = request.trim() else {
            return Ok(None);
        };
        let Some(path) = record.output_path.clone() else {
            return Ok(Some(TRIM_SKIPPED_WARNING.to_string()));
        };

        record.transition(JobState::Trimming)?;
        TrimStage::new(&self.runner, &self.config.transcoder)
            .run(&path, range, request.mode(), output)
            .await?;
        record.transition(JobState::TrimSucceeded)?;
        Ok(None)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::ReplaceError;
    use aura_fetch::ToolCommand;
    use aura_types::{Mode, RATE_LIMITED_MESSAGE, Timestamp, TrimRange};
    use futures::StreamExt;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            std::fs::create_dir(dir.path().join("media")).unwrap();
            Self { dir }
        }

        fn media(&self) -> PathBuf {
            self.dir.path().join("media")
        }

        fn tool(&self, name: &str, body: &str) -> ToolCommand {
            let path = self.dir.path().join(format!("{name}.sh"));
            std::fs::write(&path, body).unwrap();
            ToolCommand::new("sh").with_leading_args([path.into_os_string()])
        }

        fn orchestrator(&self, downloader: &str, transcoder: &str) -> JobOrchestrator {
            JobOrchestrator::new(ToolConfig {
                downloader: self.tool("yt-dlp", downloader),
                transcoder: self.tool("ffmpeg", transcoder),
                ..ToolConfig::default()
            })
        }

        fn request(&self) -> DownloadRequest {
            DownloadRequest::new("https://example.com/watch?v=1", self.media()).unwrap()
        }
    }

    fn trim_range() -> Option<TrimRange> {
        Some(TrimRange::new(Timestamp::from_secs(5), Timestamp::from_secs(15)).unwrap())
    }

    async fn run_job(
        orchestrator: &JobOrchestrator,
        request: DownloadRequest,
    ) -> (Vec<JobEvent>, JobReport) {
        let record = JobRecord::new();
        let (sink, stream) = event_channel(record.id, 8);
        let collector = tokio::spawn(stream.collect::<Vec<_>>());
        let report = tokio::time::timeout(
            Duration::from_secs(20),
            orchestrator.run(request, record, sink),
        )
        .await
        .unwrap();
        (collector.await.unwrap(), report)
    }

    fn logs(events: &[JobEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                JobEvent::LogLine(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn assert_single_terminal(events: &[JobEvent]) {
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        assert!(events.last().unwrap().is_terminal());
    }

    fn downloader_writing(media: &Path, name: &str) -> String {
        format!(
            "echo '[youtube] 1: Downloading webpage'\n\
             echo '[download] Destination: {media}/{name}'\n\
             printf '[download]  50.0%%\\r[download] 100.0%%\\n'\n\
             printf 'full content' > '{media}/{name}'\n",
            media = media.display()
        )
    }

    const TRANSCODER_OK: &str = "for a; do last=$a; done\n\
                                 echo 'frame=   10' >&2\n\
                                 printf 'frame=   20\\r' >&2\n\
                                 printf 'trimmed' > \"$last\"\n";

    const TRANSCODER_FAILS: &str = "for a; do last=$a; done\n\
                                    printf 'partial' > \"$last\"\n\
                                    echo 'Invalid data found when processing input' >&2\n\
                                    exit 1\n";

    #[tokio::test]
    async fn test_success_without_trim() {
        let fx = Fixture::new();
        let orchestrator = fx.orchestrator(&downloader_writing(&fx.media(), "clip.mp4"), "exit 9");
        let (events, report) = run_job(&orchestrator, fx.request()).await;

        assert_single_terminal(&events);
        assert_eq!(events.last(), Some(&JobEvent::StatusCompleted));
        let lines = logs(&events);
        assert_eq!(lines[0], "[youtube] 1: Downloading webpage");
        assert!(lines.contains(&"[download]  50.0%"));
        assert!(lines.contains(&"[download] 100.0%"));
        assert_eq!(report.record.state, JobState::Succeeded);
        assert_eq!(report.record.output_path, Some(fx.media().join("clip.mp4")));
        assert!(report.record.is_finished());
        assert!(report.outcome.is_success());
    }

    #[tokio::test]
    async fn test_downloader_failure() {
        let fx = Fixture::new();
        let orchestrator =
            fx.orchestrator("echo 'ERROR: Video unavailable' >&2\nexit 1\n", "exit 9");
        let (events, report) = run_job(&orchestrator, fx.request()).await;

        assert_single_terminal(&events);
        assert_eq!(logs(&events), vec!["ERROR: Video unavailable"]);
        assert_eq!(
            events.last(),
            Some(&JobEvent::StatusFailed("Download failed (exit code 1)".into()))
        );
        assert_eq!(report.record.state, JobState::Failed);
    }

    #[tokio::test]
    async fn test_rate_limit_terminates_downloader() {
        let fx = Fixture::new();
        let orchestrator = fx.orchestrator(
            "echo '[youtube] 1: Downloading webpage'\n\
             echo 'ERROR: unable to download webpage: HTTP Error 429: Too Many Requests' >&2\n\
             exec sleep 30\n",
            "exit 9",
        );
        let started = std::time::Instant::now();
        let (events, report) = run_job(&orchestrator, fx.request()).await;

        assert!(started.elapsed() < Duration::from_secs(15));
        assert_single_terminal(&events);
        assert_eq!(events.last(), Some(&JobEvent::RateLimited));
        assert!(!logs(&events).iter().any(|l| l.contains("429")));
        assert_eq!(report.record.state, JobState::RateLimited);
        assert_eq!(
            events.last().unwrap().to_wire(),
            aura_types::WireEvent::Error {
                error: RATE_LIMITED_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_downloader() {
        let fx = Fixture::new();
        let orchestrator = JobOrchestrator::new(ToolConfig {
            downloader: ToolCommand::new("/nonexistent/bin/yt-dlp"),
            ..ToolConfig::default()
        });
        let (events, report) = run_job(&orchestrator, fx.request()).await;

        assert_eq!(events.len(), 1);
        match &events[0] {
            JobEvent::StatusFailed(reason) => assert!(reason.contains("yt-dlp was not found")),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(report.record.state, JobState::Failed);
    }

    #[tokio::test]
    async fn test_destination_cannot_be_created() {
        let fx = Fixture::new();
        let blocker = fx.dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let orchestrator = fx.orchestrator("exit 0", "exit 0");
        let request = DownloadRequest::new("u", blocker.join("sub")).unwrap();
        let (events, _) = run_job(&orchestrator, request).await;

        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            JobEvent::StatusFailed(reason) if reason.starts_with("Failed to create download directory")
        ));
    }

    #[tokio::test]
    async fn test_trim_success_replaces_original() {
        let fx = Fixture::new();
        let orchestrator =
            fx.orchestrator(&downloader_writing(&fx.media(), "clip.mp4"), TRANSCODER_OK);
        let request = fx.request().with_trim(trim_range()).with_log_to_file(true);
        let (events, report) = run_job(&orchestrator, request).await;

        assert_single_terminal(&events);
        assert_eq!(events.last(), Some(&JobEvent::StatusCompleted));
        let lines = logs(&events);
        assert!(lines.contains(&"[ffmpeg] frame=   10"));
        assert!(lines.contains(&"[ffmpeg] frame=   20"));
        assert!(lines.iter().any(|l| l.starts_with("> [aura] Trimming clip.mp4 from 00:00:05 to 00:00:15")));
        assert_eq!(report.record.state, JobState::TrimSucceeded);

        let media = fx.media();
        assert_eq!(std::fs::read_to_string(media.join("clip.mp4")).unwrap(), "trimmed");
        assert!(!media.join("clip_trimmed.mp4").exists());
        assert!(!media.join("clip_original.mp4").exists());

        let log = std::fs::read_to_string(media.join(FileLog::FILE_NAME)).unwrap();
        assert!(log.contains("[download] Destination: "));
        assert!(log.contains("frame=   20\n"));
        assert!(!log.contains("[ffmpeg]"));
    }

    #[tokio::test]
    async fn test_trim_failure_keeps_original() {
        let fx = Fixture::new();
        let orchestrator =
            fx.orchestrator(&downloader_writing(&fx.media(), "clip.mp4"), TRANSCODER_FAILS);
        let request = fx.request().with_trim(trim_range());
        let (events, report) = run_job(&orchestrator, request).await;

        assert_single_terminal(&events);
        match events.last().unwrap() {
            JobEvent::StatusFailed(reason) => assert!(reason.contains("exit code 1")),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(report.record.state, JobState::TrimFailed);
        let media = fx.media();
        assert_eq!(std::fs::read_to_string(media.join("clip.mp4")).unwrap(), "full content");
        assert!(!media.join("clip_trimmed.mp4").exists());
    }

    #[tokio::test]
    async fn test_replace_failure_reports_error() {
        let fx = Fixture::new();
        // Writes the trimmed copy, then removes the input so the swap cannot start.
        let transcoder = "for a; do last=$a; done\n\
                          printf 'trimmed' > \"$last\"\n\
                          rm -f \"$5\"\n";
        let orchestrator =
            fx.orchestrator(&downloader_writing(&fx.media(), "clip.mp4"), transcoder);
        let request = fx.request().with_trim(trim_range());
        let (events, report) = run_job(&orchestrator, request).await;

        assert_single_terminal(&events);
        let media = fx.media();
        match events.last().unwrap() {
            JobEvent::StatusFailed(reason) => {
                assert!(reason.starts_with("Could not move"));
                assert!(reason.contains("clip_trimmed.mp4"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(!logs(&events).contains(&"> [aura] Ready!"));
        assert_eq!(report.record.state, JobState::TrimFailed);
        assert!(matches!(
            report.outcome,
            JobOutcome::Failed(JobError::Replace(ReplaceError::Backup { .. }))
        ));
        assert_eq!(
            std::fs::read_to_string(media.join("clip_trimmed.mp4")).unwrap(),
            "trimmed"
        );
    }

    #[tokio::test]
    async fn test_trim_skipped_without_output_path() {
        let fx = Fixture::new();
        let orchestrator = fx.orchestrator("echo '[youtube] nothing to report'\n", TRANSCODER_OK);
        let request = fx.request().with_trim(trim_range());
        let (events, report) = run_job(&orchestrator, request).await;

        assert_single_terminal(&events);
        assert_eq!(events.last(), Some(&JobEvent::StatusCompleted));
        assert!(logs(&events).contains(&TRIM_SKIPPED_WARNING));
        assert!(matches!(report.outcome, JobOutcome::PartialSuccess { .. }));
        assert_eq!(report.record.state, JobState::Succeeded);
    }

    #[tokio::test]
    async fn test_merge_line_selects_trim_source() {
        let fx = Fixture::new();
        let media = fx.media();
        let downloader = format!(
            "echo '[download] Destination: {m}/v.f137.mp4'\n\
             echo '[download] Destination: {m}/v.f140.m4a'\n\
             echo '[Merger] Merging formats into \"{m}/v.mp4\"'\n\
             printf 'merged' > '{m}/v.mp4'\n",
            m = media.display()
        );
        let transcoder = "echo \"input:$5\"\nfor a; do last=$a; done\nprintf 'trimmed' > \"$last\"\n";
        let orchestrator = fx.orchestrator(&downloader, transcoder);
        let request = fx.request().with_trim(trim_range());
        let (events, report) = run_job(&orchestrator, request).await;

        assert_eq!(report.record.output_path, Some(media.join("v.mp4")));
        let expected = format!("[ffmpeg] input:{}", media.join("v.mp4").display());
        assert!(logs(&events).contains(&expected.as_str()));
        assert_eq!(std::fs::read_to_string(media.join("v.mp4")).unwrap(), "trimmed");
    }

    #[tokio::test]
    async fn test_audio_trim_uses_audio_profile() {
        let fx = Fixture::new();
        let transcoder = "echo \"$*\"\nfor a; do last=$a; done\nprintf 'trimmed' > \"$last\"\n";
        let downloader = format!(
            "echo '[ExtractAudio] Destination: {}/song.mp3'\nprintf x > '{}/song.mp3'\n",
            fx.media().display(),
            fx.media().display()
        );
        let orchestrator = fx.orchestrator(&downloader, transcoder);
        let request = fx.request().with_mode(Mode::Audio).with_trim(trim_range());
        let (events, _) = run_job(&orchestrator, request).await;

        let args_line = logs(&events)
            .into_iter()
            .find(|l| l.contains("-hide_banner"))
            .unwrap()
            .to_string();
        assert!(args_line.contains("-c:a libmp3lame"));
        assert!(!args_line.contains("libx264"));
        assert_eq!(events.last(), Some(&JobEvent::StatusCompleted));
    }

    #[tokio::test]
    async fn test_job_continues_after_consumer_disconnects() {
        let fx = Fixture::new();
        let orchestrator =
            fx.orchestrator(&downloader_writing(&fx.media(), "clip.mp4"), TRANSCODER_OK);
        let record = JobRecord::new();
        let (sink, stream) = event_channel(record.id, 1);
        drop(stream);

        let request = fx.request().with_trim(trim_range());
        let report = orchestrator.run(request, record, sink).await;
        assert_eq!(report.record.state, JobState::TrimSucceeded);
        assert_eq!(
            std::fs::read_to_string(fx.media().join("clip.mp4")).unwrap(),
            "trimmed"
        );
    }

    #[tokio::test]
    async fn test_start_streams_events() {
        let fx = Fixture::new();
        let orchestrator = fx.orchestrator("echo hello\n", "exit 0");
        let events: Vec<_> = orchestrator.start(fx.request()).collect().await;
        assert_eq!(events, vec![JobEvent::log("hello"), JobEvent::StatusCompleted]);
    }
}
