use crate::clock::{parse_date, DateRange};
use crate::kafka::KeyStrategy;
use crate::{Error, Result};
use clap::{Parser, ValueEnum};
use std::fmt;
use std::time::Duration;

/// Command line, with every option also readable from the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "event-forge")]
#[command(about = "Synthetic page view, order and user login events for Kafka", long_about = None)]
pub struct Args {
    /// Kafka bootstrap servers, comma separated
    #[arg(long, env = "BROKER_ADDRESS", default_value = "localhost:9092")]
    pub broker_address: String,

    #[arg(long, env = "MODE", value_enum, ignore_case = true, default_value_t = ModeKind::Continuous)]
    pub mode: ModeKind,

    #[arg(long, env = "TOPIC_PAGE_VIEWS", default_value = "page_views")]
    pub topic_page_views: String,

    #[arg(long, env = "TOPIC_ORDERS", default_value = "orders")]
    pub topic_orders: String,

    #[arg(long, env = "TOPIC_USER_LOGIN", default_value = "user_login")]
    pub topic_user_login: String,

    /// First backfill day, YYYY.MM.DD (user_login_range mode)
    #[arg(long, env = "START_DATE")]
    pub start_date: Option<String>,

    /// Last backfill day, inclusive, YYYY.MM.DD (user_login_range mode)
    #[arg(long, env = "END_DATE")]
    pub end_date: Option<String>,

    #[arg(long, env = "PER_DAY_COUNT", default_value_t = 1000)]
    pub per_day_count: u64,

    /// Stop continuous mode after this many ticks
    #[arg(long, env = "MAX_TICKS")]
    pub max_ticks: Option<u64>,

    #[arg(long, env = "KAFKA_ACKS", default_value = "1")]
    pub acks: String,

    #[arg(long, env = "KAFKA_LINGER_MS", default_value_t = 50)]
    pub linger_ms: u32,

    #[arg(long, env = "KAFKA_COMPRESSION", default_value = "none")]
    pub compression: String,

    #[arg(long, env = "KAFKA_MESSAGE_TIMEOUT_MS", default_value_t = 30_000)]
    pub message_timeout_ms: u32,

    #[arg(long, env = "TICK_INTERVAL_MS", default_value_t = 500)]
    pub tick_interval_ms: u64,

    /// Flush and pause after this many backfill events
    #[arg(long, env = "THROTTLE_EVERY", default_value_t = 1000)]
    pub throttle_every: u64,

    #[arg(long, env = "THROTTLE_PAUSE_MS", default_value_t = 100)]
    pub throttle_pause_ms: u64,

    /// Seed for reproducible output
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,

    #[arg(long, env = "MESSAGE_KEY", value_enum, default_value_t = KeyStrategy::None)]
    pub message_key: KeyStrategy,

    /// Create missing destination topics before producing
    #[arg(long, env = "ENSURE_TOPICS")]
    pub ensure_topics: bool,

    #[arg(long, env = "TOPIC_PARTITIONS", default_value_t = 3)]
    pub topic_partitions: i32,

    #[arg(long, env = "TOPIC_REPLICATION_FACTOR", default_value_t = 1)]
    pub topic_replication_factor: i32,

    /// Generate without connecting to Kafka
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable JSON output for logs")]
    pub json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeKind {
    #[value(name = "continuous")]
    Continuous,
    #[value(name = "user_login_range")]
    UserLoginRange,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeKind::Continuous => f.write_str("continuous"),
            ModeKind::UserLoginRange => f.write_str("user_login_range"),
        }
    }
}

/// Temporal mode, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Continuous {
        max_ticks: Option<u64>,
    },
    UserLoginRange {
        range: DateRange,
        per_day_count: u64,
    },
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Continuous { .. } => ModeKind::Continuous,
            Mode::UserLoginRange { .. } => ModeKind::UserLoginRange,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    pub acks: String,
    pub linger_ms: u32,
    pub compression: String,
    pub message_timeout_ms: u32,
    pub queue_buffering_max_messages: u32,
}

impl KafkaConfig {
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: vec![default_broker()],
            acks: default_acks(),
            linger_ms: default_linger_ms(),
            compression: default_compression(),
            message_timeout_ms: default_message_timeout_ms(),
            queue_buffering_max_messages: default_queue_buffering_max_messages(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicConfig {
    pub page_views: String,
    pub orders: String,
    pub user_login: String,
}

impl TopicConfig {
    /// Topics written to in `mode`.
    pub fn for_mode(&self, mode: ModeKind) -> Vec<&str> {
        match mode {
            ModeKind::Continuous => vec![self.page_views.as_str(), self.orders.as_str()],
            ModeKind::UserLoginRange => vec![self.user_login.as_str()],
        }
    }
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            page_views: "page_views".to_string(),
            orders: "orders".to_string(),
            user_login: "user_login".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Sleep between continuous-mode ticks.
    pub tick_interval: Duration,
    /// Backfill flush checkpoint, counted across the whole run.
    pub throttle_every: u64,
    pub throttle_pause: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(500),
            throttle_every: 1000,
            throttle_pause: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningConfig {
    pub partitions: i32,
    pub replication_factor: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub kafka: KafkaConfig,
    pub topics: TopicConfig,
    pub pacing: PacingConfig,
    pub key_strategy: KeyStrategy,
    /// `Some` when missing topics should be created at startup.
    pub provisioning: Option<ProvisioningConfig>,
    pub seed: Option<u64>,
    pub dry_run: bool,
}

impl Config {
    /// Validates `args`; nothing is published if this fails.
    pub fn from_args(args: Args) -> Result<Self> {
        let mode = match args.mode {
            ModeKind::Continuous => Mode::Continuous {
                max_ticks: args.max_ticks,
            },
            ModeKind::UserLoginRange => {
                let (start, end) = match (args.start_date.as_deref(), args.end_date.as_deref()) {
                    (Some(start), Some(end)) if !start.trim().is_empty() && !end.trim().is_empty() => {
                        (start, end)
                    }
                    _ => {
                        return Err(Error::Config(
                            "START_DATE and END_DATE are required for user_login_range mode (format: YYYY.MM.DD)"
                                .to_string(),
                        ))
                    }
                };
                if args.per_day_count == 0 {
                    return Err(Error::Config(
                        "PER_DAY_COUNT must be a positive integer".to_string(),
                    ));
                }
                Mode::UserLoginRange {
                    range: DateRange::new(parse_date(start)?, parse_date(end)?)?,
                    per_day_count: args.per_day_count,
                }
            }
        };

        let brokers: Vec<String> = args
            .broker_address
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if brokers.is_empty() {
            return Err(Error::Config("BROKER_ADDRESS must not be empty".to_string()));
        }

        if args.throttle_every == 0 {
            return Err(Error::Config(
                "THROTTLE_EVERY must be a positive integer".to_string(),
            ));
        }
        // A backfill checkpoint must fit in the producer queue, otherwise
        // sends past the queue limit are dropped instead of waiting.
        let queue_limit = default_queue_buffering_max_messages();
        if args.throttle_every > u64::from(queue_limit) {
            return Err(Error::Config(format!(
                "THROTTLE_EVERY must not exceed the producer queue size ({})",
                queue_limit
            )));
        }

        let provisioning = if args.ensure_topics {
            if args.topic_partitions < 1 || args.topic_replication_factor < 1 {
                return Err(Error::Config(
                    "TOPIC_PARTITIONS and TOPIC_REPLICATION_FACTOR must be at least 1".to_string(),
                ));
            }
            Some(ProvisioningConfig {
                partitions: args.topic_partitions,
                replication_factor: args.topic_replication_factor,
            })
        } else {
            None
        };

        Ok(Self {
            mode,
            kafka: KafkaConfig {
                brokers,
                acks: args.acks,
                linger_ms: args.linger_ms,
                compression: args.compression,
                message_timeout_ms: args.message_timeout_ms,
                queue_buffering_max_messages: queue_limit,
            },
            topics: TopicConfig {
                page_views: args.topic_page_views,
                orders: args.topic_orders,
                user_login: args.topic_user_login,
            },
            pacing: PacingConfig {
                tick_interval: Duration::from_millis(args.tick_interval_ms),
                throttle_every: args.throttle_every,
                throttle_pause: Duration::from_millis(args.throttle_pause_ms),
            },
            key_strategy: args.message_key,
            provisioning,
            seed: args.seed,
            dry_run: args.dry_run,
        })
    }
}

fn default_broker() -> String {
    "localhost:9092".to_string()
}

fn default_acks() -> String {
    // Leader ack only
    "1".to_string()
}

fn default_linger_ms() -> u32 {
    50
}

fn default_compression() -> String {
    "none".to_string()
}

fn default_message_timeout_ms() -> u32 {
    30_000
}

fn default_queue_buffering_max_messages() -> u32 {
    100_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parse(argv: &[&str]) -> Result<Config> {
        let mut full = vec!["event-forge"];
        full.extend_from_slice(argv);
        Config::from_args(Args::try_parse_from(full).unwrap())
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.mode, Mode::Continuous { max_ticks: None });
        assert_eq!(config.kafka, KafkaConfig::default());
        assert_eq!(config.topics, TopicConfig::default());
        assert_eq!(config.pacing, PacingConfig::default());
        assert_eq!(config.key_strategy, KeyStrategy::None);
        assert!(config.provisioning.is_none());
        assert!(!config.dry_run);
    }

    #[test]
    fn test_range_mode() {
        let config = parse(&[
            "--mode",
            "user_login_range",
            "--start-date",
            "2024.03.01",
            "--end-date",
            "2024.03.02",
            "--per-day-count",
            "3",
        ])
        .unwrap();

        match config.mode {
            Mode::UserLoginRange {
                range,
                per_day_count,
            } => {
                assert_eq!(range.start(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
                assert_eq!(range.day_count(), 2);
                assert_eq!(per_day_count, 3);
            }
            other => panic!("unexpected mode: {:?}", other),
        }
    }

    #[test]
    fn test_mode_is_case_insensitive() {
        let config = parse(&[
            "--mode",
            "USER_LOGIN_RANGE",
            "--start-date",
            "2024.01.01",
            "--end-date",
            "2024.01.01",
        ])
        .unwrap();
        assert_eq!(config.mode.kind(), ModeKind::UserLoginRange);
    }

    #[test]
    fn test_range_mode_requires_dates() {
        let err = parse(&["--mode", "user_login_range", "--start-date", "2024.01.01"]).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("START_DATE")));
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = parse(&[
            "--mode",
            "user_login_range",
            "--start-date",
            "2024.01.05",
            "--end-date",
            "2024.01.01",
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_per_day_count_rejected() {
        let err = parse(&[
            "--mode",
            "user_login_range",
            "--start-date",
            "2024.01.01",
            "--end-date",
            "2024.01.02",
            "--per-day-count",
            "0",
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_throttle_bounded_by_producer_queue() {
        let config = parse(&["--throttle-every", "100000"]).unwrap();
        assert_eq!(config.pacing.throttle_every, 100_000);

        let err = parse(&["--throttle-every", "100001"]).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("THROTTLE_EVERY")));

        let err = parse(&["--throttle-every", "0"]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_multiple_brokers() {
        let config = parse(&["--broker-address", "kafka-1:9092, kafka-2:9092"]).unwrap();
        assert_eq!(config.kafka.brokers, vec!["kafka-1:9092", "kafka-2:9092"]);
        assert_eq!(config.kafka.bootstrap_servers(), "kafka-1:9092,kafka-2:9092");
    }

    #[test]
    fn test_provisioning_and_keys() {
        let config = parse(&[
            "--ensure-topics",
            "--topic-partitions",
            "6",
            "--message-key",
            "user_id",
        ])
        .unwrap();
        assert_eq!(
            config.provisioning,
            Some(ProvisioningConfig {
                partitions: 6,
                replication_factor: 1
            })
        );
        assert_eq!(config.key_strategy, KeyStrategy::UserId);
    }

    #[test]
    fn test_topics_for_mode() {
        let topics = TopicConfig::default();
        assert_eq!(topics.for_mode(ModeKind::Continuous), vec!["page_views", "orders"]);
        assert_eq!(topics.for_mode(ModeKind::UserLoginRange), vec!["user_login"]);
    }
}
