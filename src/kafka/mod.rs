pub mod key_strategy;
pub mod pipeline;
pub mod producer;
pub mod serializer;
pub mod sink;
pub mod topic_manager;

#[cfg(test)]
mod tests;

pub use key_strategy::KeyStrategy;
pub use pipeline::{DeliveryPipeline, DeliveryStats};
pub use producer::KafkaProducer;
pub use serializer::JsonSerializer;
pub use sink::{EventSink, FlushReport, MemorySink, SentMessage};
pub use topic_manager::TopicManager;
