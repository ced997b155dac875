//! Record types published to Kafka.
//!
//! Records are plain data: built once by the synthesizer, serialized to a
//! flat JSON object and then dropped. Field names match the JSON keys.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    pub event_id: String,
    pub user_id: String,
    pub page: String,
    pub referrer: String,
    pub device: String,
    pub os: String,
    pub country: String,
    pub ts_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
    Cancelled,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Created,
        OrderStatus::Paid,
        OrderStatus::Cancelled,
        OrderStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    /// Always rounded to 2 decimal places, in `[10, 5000)`.
    pub amount: f64,
    pub currency: String,
    pub status: OrderStatus,
    pub ts_ms: i64,
    pub region: String,
    pub channel: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLogin {
    pub login_id: String,
    pub user_id: String,
    pub ip: String,
    pub user_agent: String,
    pub device: String,
    pub os: String,
    pub is_success: bool,
    pub ts_ms: i64,
    pub region: String,
    pub method: String,
}

/// One primary page view plus its correlated follow-ups.
#[derive(Debug, Clone, PartialEq)]
pub struct PageViewBurst {
    pub primary: PageView,
    pub followups: Vec<PageView>,
}

impl PageViewBurst {
    /// Total number of page views in the burst, primary included.
    pub fn len(&self) -> usize {
        1 + self.followups.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageView> {
        std::iter::once(&self.primary).chain(self.followups.iter())
    }
}

/// A record that can be published by the delivery pipeline.
pub trait Record: Serialize {
    /// The record's own unique identifier.
    fn record_id(&self) -> &str;

    fn user_id(&self) -> &str;

    fn ts_ms(&self) -> i64;
}

impl Record for PageView {
    fn record_id(&self) -> &str {
        &self.event_id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn ts_ms(&self) -> i64 {
        self.ts_ms
    }
}

impl Record for Order {
    fn record_id(&self) -> &str {
        &self.order_id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn ts_ms(&self) -> i64 {
        self.ts_ms
    }
}

impl Record for UserLogin {
    fn record_id(&self) -> &str {
        &self.login_id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn ts_ms(&self) -> i64 {
        self.ts_ms
    }
}
