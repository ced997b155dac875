use crate::event::Record;
use crate::kafka::{EventSink, FlushReport, JsonSerializer, KeyStrategy};
use crate::Result;
use tracing::{debug, instrument, warn};

/// Running totals kept by the [`DeliveryPipeline`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Records accepted by the sink's queue.
    pub enqueued: u64,
    /// Records acknowledged by the broker.
    pub delivered: u64,
    /// Records rejected on send or failed on acknowledgment.
    pub failed: u64,
    pub flushes: u64,
}

/// Serializes records, keys them and hands them to an [`EventSink`].
///
/// Delivery is best effort: a record the sink refuses or the broker fails is
/// logged and counted, and the run goes on. Only serialization errors and
/// configuration errors surfaced by the sink are returned.
pub struct DeliveryPipeline<S> {
    sink: S,
    key_strategy: KeyStrategy,
    stats: DeliveryStats,
}

impl<S: EventSink> DeliveryPipeline<S> {
    pub fn new(sink: S, key_strategy: KeyStrategy) -> Self {
        Self {
            sink,
            key_strategy,
            stats: DeliveryStats::default(),
        }
    }

    pub async fn publish<T: Record + Sync>(&mut self, topic: &str, record: &T) -> Result<()> {
        let payload = JsonSerializer::serialize(record)?;
        let key = self.key_strategy.extract_key(record);

        match self.sink.send(topic, key, &payload).await {
            Ok(()) => {
                self.stats.enqueued += 1;
                Ok(())
            }
            Err(e) if !e.is_fatal() => {
                self.stats.failed += 1;
                warn!(
                    topic,
                    record_id = record.record_id(),
                    ts_ms = record.ts_ms(),
                    error = %e,
                    "Failed to enqueue record"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn flush(&mut self) -> Result<FlushReport> {
        let report = match self.sink.flush().await {
            Ok(report) => report,
            Err(e) if !e.is_fatal() => {
                warn!(error = %e, "Flush failed");
                FlushReport::default()
            }
            Err(e) => return Err(e),
        };

        self.stats.flushes += 1;
        self.stats.delivered += report.delivered;
        self.stats.failed += report.failed;

        if report.failed > 0 {
            warn!(
                delivered = report.delivered,
                failed = report.failed,
                "Some records were not acknowledged"
            );
        } else {
            debug!(delivered = report.delivered, "Flushed");
        }

        Ok(report)
    }

    pub fn stats(&self) -> DeliveryStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
