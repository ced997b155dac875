//! Fixed-size pools of synthetic user identifiers.
//!
//! Drawing `user_id` from a bounded pool (with replacement) makes the same
//! users show up again and again, the way returning visitors do.

use crate::fake_source::FakeSource;
use crate::{Error, Result};
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Pool size shared by page views and orders.
pub const VIEW_ORDER_POOL_SIZE: usize = 1000;

/// Pool size for user logins, which run at much higher volume in backfills.
pub const LOGIN_POOL_SIZE: usize = 5000;

#[derive(Debug, Clone)]
pub struct IdentityPool {
    ids: Vec<String>,
}

impl IdentityPool {
    /// Generates `size` distinct identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `size` is zero.
    pub fn build<F, R>(size: usize, fake: &F, rng: &mut R) -> Result<Self>
    where
        F: FakeSource,
        R: Rng + ?Sized,
    {
        if size == 0 {
            return Err(Error::Config(
                "identity pool size must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(size);
        let mut ids = Vec::with_capacity(size);
        while ids.len() < size {
            let id = fake.uuid(rng);
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }

        debug!(size, "Built identity pool");
        Ok(Self { ids })
    }

    /// Returns one identifier chosen uniformly at random, with replacement.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.ids[rng.gen_range(0..self.ids.len())]
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|candidate| candidate == id)
    }
}
