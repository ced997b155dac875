//! Builds page views, orders and user logins.

use crate::clock::DayWindow;
use crate::domain;
use crate::event::{Order, OrderStatus, PageView, PageViewBurst, UserLogin};
use crate::fake_source::FakeSource;
use crate::identity::IdentityPool;
use crate::Result;
use rand::seq::SliceRandom;
use rand::Rng;

pub const MIN_AMOUNT: f64 = 10.0;
pub const MAX_AMOUNT: f64 = 5000.0;

/// Largest amount representable in cents below [`MAX_AMOUNT`].
const MAX_ROUNDED_AMOUNT: f64 = 4999.99;

/// Follow-ups per burst, inclusive.
pub const MIN_FOLLOWUPS: usize = 1;
pub const MAX_FOLLOWUPS: usize = 5;

/// Synthesizes records from the domain catalogs, identity pools and a fake
/// source, drawing every random choice from one injectable RNG.
pub struct EventSynthesizer<F, R> {
    fake: F,
    rng: R,
}

impl<F: FakeSource, R: Rng> EventSynthesizer<F, R> {
    pub fn new(fake: F, rng: R) -> Self {
        Self { fake, rng }
    }

    /// Builds an identity pool from this synthesizer's fake source and RNG.
    pub fn identity_pool(&mut self, size: usize) -> Result<IdentityPool> {
        IdentityPool::build(size, &self.fake, &mut self.rng)
    }

    /// Builds a primary page view stamped `tick_ts` plus 1 to 5 follow-ups.
    ///
    /// Follow-ups keep the primary's user, device, os, country and referrer,
    /// re-roll the page and take their timestamp from `next_ts`. Follow-up
    /// timestamps never go below the previous one in the burst.
    pub fn page_view_burst<T>(
        &mut self,
        pool: &IdentityPool,
        tick_ts: i64,
        mut next_ts: T,
    ) -> PageViewBurst
    where
        T: FnMut() -> i64,
    {
        let primary = PageView {
            event_id: self.fake.uuid(&mut self.rng),
            user_id: pool.sample(&mut self.rng).to_string(),
            page: domain::PAGES.choose(&mut self.rng).to_string(),
            referrer: self.fake.uri(&mut self.rng),
            device: domain::DEVICES.choose(&mut self.rng).to_string(),
            os: domain::OPERATING_SYSTEMS.choose(&mut self.rng).to_string(),
            country: domain::COUNTRIES.choose(&mut self.rng).to_string(),
            ts_ms: tick_ts,
        };

        let count = self.rng.gen_range(MIN_FOLLOWUPS..=MAX_FOLLOWUPS);
        let mut last_ts = tick_ts;
        let mut followups = Vec::with_capacity(count);
        for _ in 0..count {
            last_ts = last_ts.max(next_ts());
            followups.push(PageView {
                event_id: self.fake.uuid(&mut self.rng),
                page: domain::PAGES.choose(&mut self.rng).to_string(),
                ts_ms: last_ts,
                ..primary.clone()
            });
        }

        PageViewBurst { primary, followups }
    }

    /// Builds one order stamped `ts`.
    ///
    /// The user is sampled on its own, independently of any page view built
    /// in the same tick.
    pub fn order(&mut self, pool: &IdentityPool, ts: i64) -> Order {
        Order {
            order_id: self.fake.uuid(&mut self.rng),
            user_id: pool.sample(&mut self.rng).to_string(),
            amount: self.amount(),
            currency: domain::CURRENCIES.choose(&mut self.rng).to_string(),
            status: *OrderStatus::ALL
                .choose(&mut self.rng)
                .unwrap_or(&OrderStatus::Created),
            ts_ms: ts,
            region: domain::REGIONS.choose(&mut self.rng).to_string(),
            channel: domain::CHANNELS.choose(&mut self.rng).to_string(),
        }
    }

    /// Builds one login with a timestamp uniform within `day`.
    pub fn login(&mut self, pool: &IdentityPool, day: &DayWindow) -> UserLogin {
        UserLogin {
            login_id: self.fake.uuid(&mut self.rng),
            user_id: pool.sample(&mut self.rng).to_string(),
            ip: self.fake.ipv4(&mut self.rng),
            user_agent: self.fake.user_agent(&mut self.rng),
            device: domain::DEVICES.choose(&mut self.rng).to_string(),
            os: domain::OPERATING_SYSTEMS.choose(&mut self.rng).to_string(),
            is_success: self.rng.gen_bool(0.5),
            ts_ms: day.sample_ts(&mut self.rng),
            region: domain::REGIONS.choose(&mut self.rng).to_string(),
            method: domain::LOGIN_METHODS.choose(&mut self.rng).to_string(),
        }
    }

    fn amount(&mut self) -> f64 {
        round_amount(self.rng.gen_range(MIN_AMOUNT..MAX_AMOUNT))
    }
}

/// Rounds to cents, keeping the result inside `[MIN_AMOUNT, MAX_AMOUNT)`.
pub fn round_amount(raw: f64) -> f64 {
    let rounded = (raw * 100.0).round() / 100.0;
    if rounded >= MAX_AMOUNT {
        MAX_ROUNDED_AMOUNT
    } else {
        rounded.max(MIN_AMOUNT)
    }
}
