use crate::event::Record;
use clap::ValueEnum;

/// How the Kafka message key is derived from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum KeyStrategy {
    /// No key; the partitioner spreads records freely.
    #[default]
    #[value(name = "none")]
    None,
    /// Key by `user_id`, keeping one user's events on one partition.
    #[value(name = "user_id")]
    UserId,
    /// Key by the record's own id (`event_id`, `order_id` or `login_id`).
    #[value(name = "record_id")]
    RecordId,
}

impl KeyStrategy {
    pub fn extract_key<'a, T: Record>(&self, record: &'a T) -> Option<&'a str> {
        match self {
            KeyStrategy::None => None,
            KeyStrategy::UserId => Some(record.user_id()),
            KeyStrategy::RecordId => Some(record.record_id()),
        }
    }
}
