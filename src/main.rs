use clap::Parser;
use event_forge::config::{Config, Mode};
use event_forge::kafka::{KafkaProducer, MemorySink, TopicManager};
use event_forge::{driver, Args, RunSummary};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, args.verbose);

    info!("Starting event-forge");

    let config = match Config::from_args(args) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    print_banner(&config);
    info!(
        mode = %config.mode.kind(),
        brokers = %config.kafka.bootstrap_servers(),
        acks = %config.kafka.acks,
        topics = ?config.topics.for_mode(config.mode.kind()),
        key_strategy = ?config.key_strategy,
        seed = ?config.seed,
        dry_run = config.dry_run,
        "Configuration summary"
    );

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    let summary = if config.dry_run {
        let (summary, sink) = driver::run(&config, MemorySink::counting(), cancel).await?;
        for (topic, count) in sink.counts() {
            info!(%topic, count, "Dry run totals");
        }
        summary
    } else {
        if let Some(provisioning) = &config.provisioning {
            let manager = TopicManager::new(&config.kafka.bootstrap_servers(), provisioning)?;
            manager
                .ensure_topics(&config.topics.for_mode(config.mode.kind()))
                .await?;
        }
        let producer = KafkaProducer::new(&config.kafka)?;
        driver::run(&config, producer, cancel).await?.0
    };

    report(&summary);
    Ok(())
}

fn print_banner(config: &Config) {
    let topics = config.topics.for_mode(config.mode.kind()).join(", ");
    match &config.mode {
        Mode::Continuous { .. } => println!(
            "Producing (continuous) to {} | topics: {}",
            config.kafka.bootstrap_servers(),
            topics
        ),
        Mode::UserLoginRange {
            range,
            per_day_count,
        } => println!(
            "Producing user_login events to {} | topic: {}\nRange: {} ~ {}, {} per day",
            config.kafka.bootstrap_servers(),
            topics,
            range.start().format(event_forge::clock::DATE_FORMAT),
            range.end().format(event_forge::clock::DATE_FORMAT),
            per_day_count
        ),
    }
}

fn report(summary: &RunSummary) {
    if summary.failed > 0 {
        warn!(
            failed = summary.failed,
            total = summary.total_events(),
            "Some records were not delivered"
        );
    }
    info!(
        mode = %summary.mode,
        total = summary.total_events(),
        cancelled = summary.cancelled,
        "event-forge finished"
    );
}

/// Cancels `token` on Ctrl+C or SIGTERM.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Received shutdown signal, flushing and exiting");
    token.cancel();
}

fn init_logging(json: bool, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("event_forge=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("event_forge=info,warn"))
    };

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
