//! Temporal driver: decides when records are stamped and how fast they go out.
//!
//! Continuous mode produces one tick (a page-view burst plus one order) every
//! tick interval until cancelled. Backfill mode walks a date range and emits a
//! fixed number of logins per day, flushing and pausing every
//! `throttle_every` events.

use crate::clock::{Clock, DateRange, SystemClock};
use crate::config::{Config, Mode, ModeKind, PacingConfig, TopicConfig};
use crate::fake_source::{FakeSource, Faker};
use crate::identity::{LOGIN_POOL_SIZE, VIEW_ORDER_POOL_SIZE};
use crate::kafka::{DeliveryPipeline, EventSink};
use crate::synth::EventSynthesizer;
use crate::{Error, Result};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Totals for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub mode: ModeKind,
    pub ticks: u64,
    pub page_views: u64,
    pub orders: u64,
    pub logins: u64,
    pub days: u64,
    /// Records rejected on send or failed on acknowledgment.
    pub failed: u64,
    /// `true` if the run stopped because of a shutdown signal.
    pub cancelled: bool,
}

impl RunSummary {
    fn new(mode: ModeKind) -> Self {
        Self {
            mode,
            ticks: 0,
            page_views: 0,
            orders: 0,
            logins: 0,
            days: 0,
            failed: 0,
            cancelled: false,
        }
    }

    /// Records handed to the pipeline, whatever their delivery outcome.
    pub fn total_events(&self) -> u64 {
        self.page_views + self.orders + self.logins
    }

    /// Closing progress line of a backfill.
    pub fn total_line(&self) -> String {
        if self.cancelled {
            format!("Stopped early. Total sent: {}", self.logins)
        } else {
            format!("Done. Total sent: {}", self.logins)
        }
    }
}

pub struct Driver<S, F, R, C> {
    pipeline: DeliveryPipeline<S>,
    synth: EventSynthesizer<F, R>,
    clock: C,
    topics: TopicConfig,
    pacing: PacingConfig,
    cancel: CancellationToken,
}

impl<S, F, R, C> Driver<S, F, R, C>
where
    S: EventSink,
    F: FakeSource,
    R: Rng,
    C: Clock,
{
    pub fn new(
        pipeline: DeliveryPipeline<S>,
        synth: EventSynthesizer<F, R>,
        clock: C,
        topics: TopicConfig,
        pacing: PacingConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            pipeline,
            synth,
            clock,
            topics,
            pacing,
            cancel,
        }
    }

    pub async fn run(&mut self, mode: &Mode) -> Result<RunSummary> {
        match mode {
            Mode::Continuous { max_ticks } => self.run_continuous(*max_ticks).await,
            Mode::UserLoginRange {
                range,
                per_day_count,
            } => {
                self.run_user_login_range(range.start(), range.end(), *per_day_count)
                    .await
            }
        }
    }

    /// Streams page views and orders stamped "now" until cancelled, or until
    /// `max_ticks` ticks have been produced.
    ///
    /// The pipeline is flushed after every tick and once more on exit.
    pub async fn run_continuous(&mut self, max_ticks: Option<u64>) -> Result<RunSummary> {
        let pool = self.synth.identity_pool(VIEW_ORDER_POOL_SIZE)?;
        let mut summary = RunSummary::new(ModeKind::Continuous);

        info!(
            topic_page_views = %self.topics.page_views,
            topic_orders = %self.topics.orders,
            interval_ms = self.pacing.tick_interval.as_millis() as u64,
            "Continuous mode started"
        );

        loop {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            if max_ticks.is_some_and(|max| summary.ticks >= max) {
                break;
            }

            let tick_ts = self.clock.now_ms();
            let clock = &self.clock;
            let burst = self
                .synth
                .page_view_burst(&pool, tick_ts, || clock.now_ms());
            let order = self.synth.order(&pool, tick_ts);

            self.pipeline
                .publish(&self.topics.page_views, &burst.primary)
                .await?;
            self.pipeline.publish(&self.topics.orders, &order).await?;
            for followup in &burst.followups {
                self.pipeline.publish(&self.topics.page_views, followup).await?;
            }
            self.pipeline.flush().await?;

            summary.ticks += 1;
            summary.page_views += burst.len() as u64;
            summary.orders += 1;
            debug!(
                tick = summary.ticks,
                ts_ms = tick_ts,
                page_views = burst.len(),
                "Tick published"
            );

            if max_ticks.is_some_and(|max| summary.ticks >= max) {
                break;
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Shutdown requested, stopping continuous mode");
                    summary.cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(self.pacing.tick_interval) => {}
            }
        }

        self.pipeline.flush().await?;
        summary.failed = self.pipeline.stats().failed;
        info!(
            ticks = summary.ticks,
            page_views = summary.page_views,
            orders = summary.orders,
            failed = summary.failed,
            "Continuous mode stopped"
        );
        Ok(summary)
    }

    /// Emits `per_day_count` logins for every day in `[start, end]`, each
    /// stamped uniformly at random within its day.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] before publishing anything if `end < start`
    /// or `per_day_count` is zero.
    pub async fn run_user_login_range(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        per_day_count: u64,
    ) -> Result<RunSummary> {
        let range = DateRange::new(start, end)?;
        if per_day_count == 0 {
            return Err(Error::Config(
                "per_day_count must be a positive integer".to_string(),
            ));
        }

        let pool = self.synth.identity_pool(LOGIN_POOL_SIZE)?;
        let mut summary = RunSummary::new(ModeKind::UserLoginRange);

        info!(
            topic = %self.topics.user_login,
            days = range.day_count(),
            per_day_count,
            "Backfill started"
        );

        'days: for day in range.days() {
            let mut sent_today = 0u64;
            for _ in 0..per_day_count {
                if self.cancel.is_cancelled() {
                    warn!(day = %day.label(), sent_today, "Shutdown requested, stopping backfill");
                    summary.cancelled = true;
                    break 'days;
                }

                let login = self.synth.login(&pool, &day);
                self.pipeline.publish(&self.topics.user_login, &login).await?;
                sent_today += 1;
                summary.logins += 1;

                if self.pacing.throttle_every > 0 && summary.logins % self.pacing.throttle_every == 0 {
                    self.pipeline.flush().await?;
                    tokio::time::sleep(self.pacing.throttle_pause).await;
                }
            }

            summary.days += 1;
            println!("{}: sent {}", day.label(), sent_today);
            info!(day = %day.label(), count = sent_today, "Day complete");
        }

        self.pipeline.flush().await?;
        summary.failed = self.pipeline.stats().failed;

        println!("{}", summary.total_line());
        info!(
            total = summary.logins,
            days = summary.days,
            failed = summary.failed,
            "Backfill finished"
        );
        Ok(summary)
    }

    pub fn pipeline(&self) -> &DeliveryPipeline<S> {
        &self.pipeline
    }

    pub fn into_pipeline(self) -> DeliveryPipeline<S> {
        self.pipeline
    }
}

/// Wires a driver for `config` around `sink` and runs the configured mode.
///
/// Uses wall-clock time, the `fake`-backed [`Faker`] and a `StdRng` seeded
/// from `config.seed` (or from entropy when unset).
pub async fn run<S: EventSink>(
    config: &Config,
    sink: S,
    cancel: CancellationToken,
) -> Result<(RunSummary, S)> {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut driver = Driver::new(
        DeliveryPipeline::new(sink, config.key_strategy),
        EventSynthesizer::new(Faker, rng),
        SystemClock,
        config.topics.clone(),
        config.pacing,
        cancel,
    );

    let summary = driver.run(&config.mode).await?;
    Ok((summary, driver.into_pipeline().into_sink()))
}
