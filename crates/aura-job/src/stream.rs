//! Event delivery between a running job and its consumer.

use aura_types::JobEvent;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use crate::JobId;

/// Creates a connected sink and stream holding up to `capacity` events.
#[must_use]
pub fn event_channel(id: JobId, capacity: usize) -> (EventSink, JobStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        EventSink {
            tx,
            consumer_gone: false,
        },
        JobStream { id, rx },
    )
}

/// Sending half of a job's event channel.
///
/// Sending waits while the buffer is full. Once the consumer has gone away,
/// events are dropped and the job carries on.
#[derive(Debug)]
pub struct EventSink {
    tx: mpsc::Sender<JobEvent>,
    consumer_gone: bool,
}

impl EventSink {
    /// Delivers one event.
    pub async fn emit(&mut self, event: JobEvent) {
        if self.consumer_gone {
            return;
        }
        if self.tx.send(event).await.is_err() {
            log::info!("event consumer disconnected, job continues without output");
            self.consumer_gone = true;
        }
    }

    /// Delivers a log line.
    pub async fn log(&mut self, line: impl Into<String>) {
        self.emit(JobEvent::log(line)).await;
    }

    /// Returns true once the consumer has been observed to disconnect.
    #[must_use]
    pub const fn consumer_gone(&self) -> bool {
        self.consumer_gone
    }
}

/// Receiving half of a job's event channel.
///
/// Yields every event in order and ends after the terminal event.
#[derive(Debug)]
pub struct JobStream {
    id: JobId,
    rx: mpsc::Receiver<JobEvent>,
}

impl JobStream {
    /// Identifier of the job feeding this stream.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Waits for the next event.
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        self.rx.recv().await
    }
}

impl Stream for JobStream {
    type Item = JobEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_events_in_order() {
        let (mut sink, stream) = event_channel(Uuid::new_v4(), 4);
        tokio::spawn(async move {
            for i in 0..10 {
                sink.log(format!("line {i}")).await;
            }
            sink.emit(JobEvent::StatusCompleted).await;
        });
        let events: Vec<_> = stream.collect().await;
        assert_eq!(events.len(), 11);
        assert_eq!(events[0], JobEvent::log("line 0"));
        assert_eq!(events[9], JobEvent::log("line 9"));
        assert_eq!(events[10], JobEvent::StatusCompleted);
    }

    #[tokio::test]
    async fn test_dropped_consumer_does_not_block() {
        let (mut sink, stream) = event_channel(Uuid::new_v4(), 1);
        drop(stream);
        for _ in 0..100 {
            sink.log("ignored").await;
        }
        assert!(sink.consumer_gone());
    }

    #[tokio::test]
    async fn test_stream_ends_when_sink_dropped() {
        let id = Uuid::new_v4();
        let (sink, mut stream) = event_channel(id, 2);
        assert_eq!(stream.id(), id);
        drop(sink);
        assert_eq!(stream.next_event().await, None);
    }
}
