//! Fixed catalogs of categorical field values.
//!
//! Every categorical field of the generated records is drawn uniformly from
//! one of the [`Domain`]s below.

use rand::Rng;

/// A finite, ordered, non-empty set of allowed values for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    name: &'static str,
    values: &'static [&'static str],
}

impl Domain {
    const fn new(name: &'static str, values: &'static [&'static str]) -> Self {
        Self { name, values }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn values(&self) -> &'static [&'static str] {
        self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| *v == value)
    }

    /// Picks one value uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        self.values[rng.gen_range(0..self.values.len())]
    }
}

pub const PAGES: Domain = Domain::new(
    "page",
    &[
        "/",
        "/home",
        "/product/alpha",
        "/product/beta",
        "/search",
        "/cart",
        "/checkout",
    ],
);

pub const DEVICES: Domain = Domain::new("device", &["mobile", "desktop", "tablet"]);

pub const OPERATING_SYSTEMS: Domain =
    Domain::new("os", &["iOS", "Android", "MacOS", "Windows", "Linux"]);

pub const COUNTRIES: Domain = Domain::new("country", &["CN", "US", "JP", "DE", "FR", "IN"]);

pub const CURRENCIES: Domain = Domain::new("currency", &["CNY", "USD", "EUR"]);

pub const CHANNELS: Domain = Domain::new("channel", &["organic", "paid", "email", "social"]);

pub const REGIONS: Domain = Domain::new("region", &["East", "North", "South", "West"]);

pub const LOGIN_METHODS: Domain = Domain::new("method", &["password", "otp", "oauth", "sso"]);

/// All registered domains, in declaration order.
pub const ALL: &[Domain] = &[
    PAGES,
    DEVICES,
    OPERATING_SYSTEMS,
    COUNTRIES,
    CURRENCIES,
    CHANNELS,
    REGIONS,
    LOGIN_METHODS,
];
