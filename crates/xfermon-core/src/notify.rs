// ── Notification buffer and sink seam ──
//
// Digest lines accumulate during a cycle and are flushed once at its end.
// Operator alerts (one per pause) ride the same flush. Whatever the sink
// fails to accept, or does not accept in time, stays buffered for the next
// flush. Each task holds at most one digest line.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::model::TaskId;

/// Delivery failure reported by a [`NotificationSink`].
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("notification command `{program}` exited with {status}")]
    Command { program: String, status: String },

    #[error("notification sink unavailable: {0}")]
    Unavailable(String),

    #[error("notification delivery timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

/// Destination for digests and operator alerts (terminal, file, mailer
/// command, ...).
pub trait NotificationSink: Send + Sync {
    fn deliver(
        &self,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// A standalone operator message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

/// Pending notification content for one endpoint.
#[derive(Debug, Default)]
pub struct NotificationBuffer {
    lines: Vec<(TaskId, String)>,
    alerts: VecDeque<Alert>,
}

impl NotificationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer the digest line for `task_id`, replacing any line still
    /// pending for that task from an earlier undelivered cycle.
    pub fn append(&mut self, task_id: &TaskId, line: impl Into<String>) {
        let line = line.into();
        match self.lines.iter_mut().find(|(id, _)| id == task_id) {
            Some(entry) => entry.1 = line,
            None => self.lines.push((task_id.clone(), line)),
        }
    }

    pub fn push_alert(&mut self, alert: Alert) {
        self.alerts.push_back(alert);
    }

    /// Buffered digest text, one line per entry.
    pub fn digest(&self) -> String {
        let mut out = String::new();
        for (_, line) in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.alerts.is_empty()
    }

    /// Deliver pending alerts, then the digest under `digest_subject`.
    ///
    /// Each delivery is bounded by `timeout`. Stops at the first failure;
    /// everything not yet delivered stays buffered. Returns the number of
    /// alerts and digest lines delivered.
    pub async fn flush<N: NotificationSink>(
        &mut self,
        sink: &N,
        digest_subject: &str,
        timeout: Duration,
    ) -> Result<(usize, usize), SinkError> {
        let mut alerts_sent = 0;
        while let Some(alert) = self.alerts.front() {
            deliver_within(sink, &alert.subject, &alert.body, timeout).await?;
            self.alerts.pop_front();
            alerts_sent += 1;
        }

        if self.lines.is_empty() {
            return Ok((alerts_sent, 0));
        }
        deliver_within(sink, digest_subject, &self.digest(), timeout).await?;
        let lines_sent = self.lines.len();
        self.lines.clear();
        Ok((alerts_sent, lines_sent))
    }
}

async fn deliver_within<N: NotificationSink>(
    sink: &N,
    subject: &str,
    body: &str,
    timeout: Duration,
) -> Result<(), SinkError> {
    tokio::time::timeout(timeout, sink.deliver(subject, body))
        .await
        .map_err(|_| SinkError::Timeout {
            timeout_secs: timeout.as_secs(),
        })?
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    const WAIT: Duration = Duration::from_secs(30);

    /// Records deliveries; fails every call once `fail_after` have succeeded.
    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<(String, String)>>,
        fail_after: Option<usize>,
        calls: AtomicUsize,
    }

    impl NotificationSink for RecordingSink {
        async fn deliver(&self, subject: &str, body: &str) -> Result<(), SinkError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_after.is_some_and(|limit| n >= limit) {
                return Err(SinkError::Unavailable("mailer down".into()));
            }
            self.delivered
                .lock()
                .unwrap()
                .push((subject.to_owned(), body.to_owned()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn flush_sends_alerts_then_digest_and_clears() {
        let sink = RecordingSink::default();
        let mut buf = NotificationBuffer::new();
        buf.append(&"t-1".into(), "DEST  t-1  1200 alice");
        buf.append(&"t-2".into(), "SRC   t-2  5 bob");
        buf.push_alert(Alert {
            subject: "PAUSED_NFILES:alice".into(),
            body: "paused".into(),
        });

        let sent = buf.flush(&sink, "ep_many_file_xfers", WAIT).await.unwrap();
        assert_eq!(sent, (1, 2));
        assert!(buf.is_empty());

        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(delivered[0].0, "PAUSED_NFILES:alice");
        assert_eq!(delivered[1].0, "ep_many_file_xfers");
        assert_eq!(delivered[1].1, "DEST  t-1  1200 alice\nSRC   t-2  5 bob\n");
    }

    #[tokio::test]
    async fn empty_buffer_delivers_nothing() {
        let sink = RecordingSink::default();
        let mut buf = NotificationBuffer::new();
        assert_eq!(buf.flush(&sink, "s", WAIT).await.unwrap(), (0, 0));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_digest_is_retained_for_next_flush() {
        let sink = RecordingSink {
            fail_after: Some(1),
            ..RecordingSink::default()
        };
        let mut buf = NotificationBuffer::new();
        buf.push_alert(Alert {
            subject: "a".into(),
            body: "b".into(),
        });
        buf.append(&"t-1".into(), "line one");

        assert!(buf.flush(&sink, "digest", WAIT).await.is_err());
        assert_eq!(buf.alert_count(), 0);
        assert_eq!(buf.line_count(), 1);

        buf.append(&"t-2".into(), "line two");
        let healthy = RecordingSink::default();
        assert_eq!(buf.flush(&healthy, "digest", WAIT).await.unwrap(), (0, 2));
        assert_eq!(
            healthy.delivered.lock().unwrap()[0].1,
            "line one\nline two\n"
        );
    }

    #[tokio::test]
    async fn failed_alert_keeps_it_and_the_digest() {
        let sink = RecordingSink {
            fail_after: Some(0),
            ..RecordingSink::default()
        };
        let mut buf = NotificationBuffer::new();
        buf.push_alert(Alert {
            subject: "a".into(),
            body: "b".into(),
        });
        buf.append(&"t-1".into(), "line");

        assert!(buf.flush(&sink, "digest", WAIT).await.is_err());
        assert_eq!(buf.alert_count(), 1);
        assert_eq!(buf.line_count(), 1);
    }

    #[test]
    fn reappending_a_task_replaces_its_pending_line() {
        let mut buf = NotificationBuffer::new();
        buf.append(&"t-1".into(), "DEST  t-1  1200 alice");
        buf.append(&"t-2".into(), "SRC   t-2  5 bob");
        buf.append(&"t-1".into(), "DEST  t-1  1300 alice");

        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.digest(), "DEST  t-1  1300 alice\nSRC   t-2  5 bob\n");
    }

    /// Never completes a delivery.
    struct HangingSink;

    impl NotificationSink for HangingSink {
        async fn deliver(&self, _subject: &str, _body: &str) -> Result<(), SinkError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_delivery_times_out_and_keeps_content() {
        let mut buf = NotificationBuffer::new();
        buf.push_alert(Alert {
            subject: "a".into(),
            body: "b".into(),
        });
        buf.append(&"t-1".into(), "line");

        let err = buf
            .flush(&HangingSink, "digest", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Timeout { timeout_secs: 5 }));
        assert_eq!(buf.alert_count(), 1);
        assert_eq!(buf.line_count(), 1);
    }
}
