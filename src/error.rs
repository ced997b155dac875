//! Error types and result handling for event-forge.
//!
//! This module defines the main error type [`Error`] and a convenience
//! [`Result`] type alias used throughout the crate.
//!
//! # Example
//!
//! ```rust
//! use event_forge::{Error, Result};
//!
//! fn check_range() -> Result<()> {
//!     Err(Error::Config("end_date must be >= start_date".to_string()))
//! }
//!
//! match check_range() {
//!     Ok(()) => println!("Range ok"),
//!     Err(Error::Config(msg)) => eprintln!("Configuration error: {}", msg),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for event-forge operations.
///
/// Only [`Error::Config`] and [`Error::Serialization`] abort a run. Delivery
/// failures are reported through [`Error::Delivery`] by the sink and then
/// logged and counted by the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error, typically from invalid environment variables.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Kafka client or producer error.
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// JSON serialization error when encoding records.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A single record could not be handed to, or acknowledged by, the broker.
    #[error("Delivery error on topic '{topic}': {message}")]
    Delivery {
        /// Destination topic of the failed record
        topic: String,
        /// Reason reported by the client
        message: String,
    },
}

impl Error {
    /// Returns `true` for errors that should stop the run before (or while)
    /// publishing, as opposed to per-record delivery failures.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Delivery { .. } | Error::Kafka(_))
    }
}

/// A convenient Result type alias for event-forge operations.
///
/// This is equivalent to `std::result::Result<T, event_forge::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
