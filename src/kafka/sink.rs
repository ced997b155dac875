//! The broker-client seam of the delivery pipeline.
//!
//! [`EventSink::send`] enqueues without waiting for the broker and
//! [`EventSink::flush`] waits for every outstanding acknowledgment. The Kafka
//! implementation lives in [`super::producer`]; [`MemorySink`] backs tests
//! and dry runs.

use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tracing::trace;

/// Outcome of one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Records acknowledged by the broker.
    pub delivered: u64,
    /// Records the broker (or client) reported as failed.
    pub failed: u64,
}

#[async_trait]
pub trait EventSink: Send {
    /// Hands one payload to the client without waiting for acknowledgment.
    ///
    /// An `Err` means the record was rejected before it was queued.
    async fn send(&mut self, topic: &str, key: Option<&str>, payload: &str) -> Result<()>;

    /// Blocks until every record handed over so far is acknowledged or failed.
    async fn flush(&mut self) -> Result<FlushReport>;
}

/// A message recorded by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub topic: String,
    pub key: Option<String>,
    pub payload: String,
}

/// In-process sink that acknowledges what it is given on flush, apart from
/// topics set up with [`MemorySink::reject_topic`] or [`MemorySink::fail_on_flush`].
///
/// Created with [`MemorySink::new`] it keeps every delivered message; created
/// with [`MemorySink::counting`] it only keeps per-topic counts, so it can
/// run indefinitely in dry-run mode.
#[derive(Debug, Default)]
pub struct MemorySink {
    retain: bool,
    pending: Vec<SentMessage>,
    delivered: Vec<SentMessage>,
    counts: BTreeMap<String, u64>,
    rejected_topics: HashSet<String>,
    unacked_topics: HashSet<String>,
    flushes: u64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            retain: true,
            ..Default::default()
        }
    }

    pub fn counting() -> Self {
        Self::default()
    }

    /// Makes every `send` to `topic` fail, as a full queue or unknown topic
    /// would.
    pub fn reject_topic(mut self, topic: impl Into<String>) -> Self {
        self.rejected_topics.insert(topic.into());
        self
    }

    /// Accepts every `send` to `topic` but reports those records as failed on
    /// flush, as a broker refusing to acknowledge them would.
    pub fn fail_on_flush(mut self, topic: impl Into<String>) -> Self {
        self.unacked_topics.insert(topic.into());
        self
    }

    /// Messages acknowledged by a flush, in send order.
    pub fn delivered(&self) -> &[SentMessage] {
        &self.delivered
    }

    pub fn delivered_to<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a SentMessage> {
        self.delivered.iter().filter(move |m| m.topic == topic)
    }

    /// Number of acknowledged messages per topic.
    pub fn count(&self, topic: &str) -> u64 {
        self.counts.get(topic).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    /// Messages sent but not yet flushed.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn send(&mut self, topic: &str, key: Option<&str>, payload: &str) -> Result<()> {
        if self.rejected_topics.contains(topic) {
            return Err(Error::Delivery {
                topic: topic.to_string(),
                message: "topic rejected by sink".to_string(),
            });
        }

        self.pending.push(SentMessage {
            topic: topic.to_string(),
            key: key.map(str::to_string),
            payload: payload.to_string(),
        });
        Ok(())
    }

    async fn flush(&mut self) -> Result<FlushReport> {
        self.flushes += 1;
        let mut report = FlushReport::default();

        for message in self.pending.drain(..) {
            if self.unacked_topics.contains(&message.topic) {
                report.failed += 1;
                continue;
            }
            report.delivered += 1;
            *self.counts.entry(message.topic.clone()).or_insert(0) += 1;
            if self.retain {
                self.delivered.push(message);
            }
        }

        trace!(
            delivered = report.delivered,
            failed = report.failed,
            "Memory sink flushed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_is_pending_until_flush() {
        let mut sink = MemorySink::new();
        sink.send("orders", None, "{}").await.unwrap();
        sink.send("orders", Some("k"), "{}").await.unwrap();

        assert_eq!(sink.pending(), 2);
        assert!(sink.delivered().is_empty());

        let report = sink.flush().await.unwrap();
        assert_eq!(report, FlushReport { delivered: 2, failed: 0 });
        assert_eq!(sink.pending(), 0);
        assert_eq!(sink.count("orders"), 2);
        assert_eq!(sink.delivered()[1].key.as_deref(), Some("k"));
    }

    #[tokio::test]
    async fn test_counting_sink_drops_payloads() {
        let mut sink = MemorySink::counting();
        sink.send("page_views", None, "{}").await.unwrap();
        sink.flush().await.unwrap();

        assert_eq!(sink.count("page_views"), 1);
        assert!(sink.delivered().is_empty());
        assert_eq!(sink.flushes(), 1);
    }

    #[tokio::test]
    async fn test_rejected_topic() {
        let mut sink = MemorySink::new().reject_topic("orders");
        let err = sink.send("orders", None, "{}").await.unwrap_err();
        assert!(matches!(err, Error::Delivery { .. }));
        assert!(sink.send("page_views", None, "{}").await.is_ok());
    }

    #[tokio::test]
    async fn test_unacknowledged_topic_fails_on_flush() {
        let mut sink = MemorySink::new().fail_on_flush("orders");
        sink.send("orders", None, "{}").await.unwrap();
        sink.send("orders", None, "{}").await.unwrap();
        sink.send("page_views", None, "{}").await.unwrap();

        let report = sink.flush().await.unwrap();
        assert_eq!(report, FlushReport { delivered: 1, failed: 2 });
        assert_eq!(sink.pending(), 0);
        assert_eq!(sink.count("orders"), 0);
        assert_eq!(sink.count("page_views"), 1);
    }
}
