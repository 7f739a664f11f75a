use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a fetched exchange rate stays fresh.
pub const RATE_CACHE_TTL_SECS: i64 = 3600;

/// A cached USD→TWD exchange rate with its fetch timestamp.
///
/// This is the only remote value trusted across sessions: the in-memory
/// copy lives inside the rate resolver, and a persisted copy is written
/// to storage as an offline fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateCache {
    /// TWD per 1 USD
    pub rate: f64,

    /// When the rate was fetched
    pub last_updated: DateTime<Utc>,
}

impl RateCache {
    pub fn new(rate: f64, last_updated: DateTime<Utc>) -> Self {
        Self { rate, last_updated }
    }

    /// `true` if the cached rate is younger than the TTL as of `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.last_updated < Duration::seconds(RATE_CACHE_TTL_SECS)
    }
}
