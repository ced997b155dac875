use crate::kafka::sink::{EventSink, FlushReport};
use crate::{config::KafkaConfig, Error, Result};
use async_trait::async_trait;
use futures::future::join_all;
use rdkafka::producer::{DeliveryFuture, FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use tracing::{debug, warn};

/// [`EventSink`] over an rdkafka `FutureProducer`.
///
/// `send` enqueues into librdkafka's buffer and keeps the delivery future;
/// `flush` awaits every outstanding future. Retries for transient network
/// errors are left to librdkafka.
pub struct KafkaProducer {
    producer: FutureProducer,
    in_flight: Vec<(String, DeliveryFuture)>,
}

impl KafkaProducer {
    pub fn new(config: &KafkaConfig) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.bootstrap_servers())
            .set("compression.type", &config.compression)
            .set("acks", &config.acks)
            .set("linger.ms", config.linger_ms.to_string())
            .set("message.timeout.ms", config.message_timeout_ms.to_string())
            .set(
                "queue.buffering.max.messages",
                config.queue_buffering_max_messages.to_string(),
            )
            .create()
            .map_err(Error::Kafka)?;

        debug!(
            brokers = %config.bootstrap_servers(),
            acks = %config.acks,
            "Created Kafka producer"
        );

        Ok(Self {
            producer,
            in_flight: Vec::new(),
        })
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

#[async_trait]
impl EventSink for KafkaProducer {
    async fn send(&mut self, topic: &str, key: Option<&str>, payload: &str) -> Result<()> {
        let mut record: FutureRecord<'_, str, str> = FutureRecord::to(topic).payload(payload);
        if let Some(key) = key {
            record = record.key(key);
        }

        match self.producer.send_result(record) {
            Ok(future) => {
                self.in_flight.push((topic.to_string(), future));
                Ok(())
            }
            Err((e, _record)) => Err(Error::Delivery {
                topic: topic.to_string(),
                message: e.to_string(),
            }),
        }
    }

    async fn flush(&mut self) -> Result<FlushReport> {
        let in_flight = std::mem::take(&mut self.in_flight);
        let outcomes = join_all(
            in_flight
                .into_iter()
                .map(|(topic, future)| async move { (topic, future.await) }),
        )
        .await;

        let mut report = FlushReport::default();
        for (topic, outcome) in outcomes {
            match outcome {
                Ok(Ok((partition, offset))) => {
                    report.delivered += 1;
                    tracing::trace!(%topic, partition, offset, "Record acknowledged");
                }
                Ok(Err((e, _message))) => {
                    report.failed += 1;
                    warn!(%topic, error = %e, "Record delivery failed");
                }
                Err(_canceled) => {
                    report.failed += 1;
                    warn!(%topic, "Delivery future cancelled before acknowledgment");
                }
            }
        }

        Ok(report)
    }
}
