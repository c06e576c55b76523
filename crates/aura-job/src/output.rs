//! Fan-out of job output to the consumer and the optional file log.

use aura_types::JobEvent;

use crate::{EventSink, FileLog};

/// Where a job's output goes.
#[derive(Debug)]
pub struct JobOutput {
    sink: EventSink,
    file_log: Option<FileLog>,
}

impl JobOutput {
    /// Creates output that only feeds the event stream.
    #[must_use]
    pub const fn new(sink: EventSink) -> Self {
        Self {
            sink,
            file_log: None,
        }
    }

    /// Also appends raw tool lines to `file_log`.
    pub fn set_file_log(&mut self, file_log: FileLog) {
        self.file_log = Some(file_log);
    }

    /// Records a raw tool line in the file log, if enabled.
    pub async fn record_raw(&mut self, raw: &str) {
        if let Some(file_log) = self.file_log.as_mut()
            && let Some(warning) = file_log.append(raw).await
        {
            self.sink.log(warning).await;
        }
    }

    /// Records a raw tool line and shows `shown` to the consumer.
    pub async fn tool_line(&mut self, raw: &str, shown: String) {
        self.record_raw(raw).await;
        self.sink.log(shown).await;
    }

    /// Shows a pipeline note to the consumer.
    pub async fn note(&mut self, text: impl Into<String>) {
        self.sink.log(text).await;
    }

    /// Emits the terminal event, consuming the output.
    pub async fn finish(mut self, event: JobEvent) {
        debug_assert!(event.is_terminal());
        self.sink.emit(event).await;
    }
}
