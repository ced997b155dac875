#![allow(dead_code)]

use event_forge::config::{Args, Config};
use clap::Parser;
use std::env;

/// Builds a validated configuration from command line style arguments.
///
/// Pacing is disabled so runs finish immediately.
pub fn config_from(extra: &[&str]) -> Config {
    let mut argv = vec![
        "event-forge",
        "--tick-interval-ms",
        "0",
        "--throttle-pause-ms",
        "0",
        "--seed",
        "42",
    ];
    argv.extend_from_slice(extra);
    Config::from_args(Args::try_parse_from(argv).unwrap()).unwrap()
}

/// Configuration pointing at the test broker, with per-process topic names.
pub fn kafka_test_config(extra: &[&str]) -> Config {
    let brokers = env::var("TEST_KAFKA_BROKERS").unwrap_or_else(|_| "localhost:9092".to_string());
    let mut config = config_from(extra);
    config.kafka.brokers = brokers.split(',').map(|s| s.trim().to_string()).collect();
    config.kafka.linger_ms = 0;

    let suffix = std::process::id();
    config.topics.page_views = format!("test_page_views_{}", suffix);
    config.topics.orders = format!("test_orders_{}", suffix);
    config.topics.user_login = format!("test_user_login_{}", suffix);
    config
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("event_forge=debug")
        .try_init()
        .ok();
}
