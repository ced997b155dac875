use crate::config::ProvisioningConfig;
use crate::{Error, Result};
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::error::RDKafkaErrorCode;
use rdkafka::ClientConfig;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, instrument};

/// Creates destination topics that do not exist yet.
pub struct TopicManager {
    admin_client: AdminClient<DefaultClientContext>,
    partitions: i32,
    replication_factor: i32,
    metadata_timeout: Duration,
}

impl TopicManager {
    pub fn new(bootstrap_servers: &str, provisioning: &ProvisioningConfig) -> Result<Self> {
        let admin_client: AdminClient<_> = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .create()
            .map_err(Error::Kafka)?;

        Ok(Self {
            admin_client,
            partitions: provisioning.partitions,
            replication_factor: provisioning.replication_factor,
            metadata_timeout: Duration::from_secs(5),
        })
    }

    /// Creates every topic in `topics` that the cluster does not know about.
    ///
    /// Returns the names of the topics that were created.
    #[instrument(skip(self))]
    pub async fn ensure_topics(&self, topics: &[&str]) -> Result<Vec<String>> {
        let existing = self.existing_topics()?;
        let missing = missing_topics(topics, &existing);

        if missing.is_empty() {
            info!("All destination topics already exist");
            return Ok(Vec::new());
        }

        let new_topics: Vec<NewTopic<'_>> = missing
            .iter()
            .map(|name| {
                NewTopic::new(
                    name,
                    self.partitions,
                    TopicReplication::Fixed(self.replication_factor),
                )
                .set("cleanup.policy", "delete")
            })
            .collect();

        let opts = AdminOptions::new().operation_timeout(Some(Duration::from_secs(30)));
        let results = self
            .admin_client
            .create_topics(&new_topics, &opts)
            .await
            .map_err(Error::Kafka)?;

        let mut created = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(topic) => {
                    info!("Created topic: {}", topic);
                    created.push(topic);
                }
                // Another producer got there first.
                Err((topic, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    info!("Topic '{}' already exists", topic);
                }
                Err((_topic, error)) => {
                    return Err(Error::Kafka(rdkafka::error::KafkaError::AdminOp(error)));
                }
            }
        }

        Ok(created)
    }

    fn existing_topics(&self) -> Result<HashSet<String>> {
        let metadata = self
            .admin_client
            .inner()
            .fetch_metadata(None, self.metadata_timeout)
            .map_err(Error::Kafka)?;

        Ok(metadata
            .topics()
            .iter()
            .map(|topic| topic.name().to_string())
            .collect())
    }
}

fn missing_topics<'a>(wanted: &[&'a str], existing: &HashSet<String>) -> Vec<&'a str> {
    let mut missing: Vec<&'a str> = Vec::new();
    for &topic in wanted {
        if !existing.contains(topic) && !missing.contains(&topic) {
            missing.push(topic);
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_topics() {
        let existing: HashSet<String> = ["orders".to_string()].into_iter().collect();
        let missing = missing_topics(&["page_views", "orders", "page_views"], &existing);
        assert_eq!(missing, vec!["page_views"]);
    }

    #[tokio::test]
    #[ignore] // Requires running Kafka
    async fn test_ensure_topics() {
        let manager = TopicManager::new(
            "localhost:9092",
            &ProvisioningConfig {
                partitions: 1,
                replication_factor: 1,
            },
        )
        .unwrap();

        let topic = format!("event_forge_topic_test_{}", std::process::id());
        let created = manager.ensure_topics(&[topic.as_str()]).await.unwrap();
        assert_eq!(created, vec![topic.clone()]);

        // Second call finds it.
        let created = manager.ensure_topics(&[topic.as_str()]).await.unwrap();
        assert!(created.is_empty());
    }
}
