use chrono::Utc;
use tracing::{debug, warn};

use crate::models::rate::RateCache;
use crate::providers::registry::ProviderChain;
use crate::storage::backend::KeyValueStore;
use crate::storage::store::LocalStore;

/// Fallback USD→TWD rate used when no fetched or persisted rate exists.
pub const DEFAULT_USD_TWD_RATE: f64 = 32.0;

/// Currency-pair ticker aliases for USD→TWD, tried in order.
pub const RATE_ALIASES: &[&str] = &["TWD=X", "USDTWD=X"];

/// Resolves the USD→TWD exchange rate.
///
/// Resolution order: in-memory cache (1 h window) → quote endpoints via
/// the alias list → persisted copy of the last successful fetch → the
/// fixed default. Resolution never fails; at worst it degrades to the
/// default constant.
pub struct RateResolver {
    cache: Option<RateCache>,
}

impl RateResolver {
    pub fn new() -> Self {
        Self { cache: None }
    }

    /// The in-memory cache, if any (stale or fresh).
    #[must_use]
    pub fn cached(&self) -> Option<RateCache> {
        self.cache
    }

    /// Drop the in-memory cache so the next resolution refetches.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Resolve the USD→TWD multiplier.
    ///
    /// Successful fetches refresh both the in-memory cache and the
    /// persisted copy in `store`.
    pub async fn resolve<S: KeyValueStore>(
        &mut self,
        chain: &ProviderChain,
        store: &mut LocalStore<S>,
    ) -> f64 {
        let now = Utc::now();

        if let Some(cache) = self.cache {
            if cache.is_fresh(now) {
                debug!(rate = cache.rate, "using cached USD→TWD rate");
                return cache.rate;
            }
        }

        for alias in RATE_ALIASES {
            match chain.fetch_quote(alias).await {
                // A simulated quote is a fabricated number; better to fall
                // through to the persisted copy than to persist garbage.
                Ok(quote) if !quote.simulated && quote.price > 0.0 => {
                    let cache = RateCache::new(quote.price, now);
                    self.cache = Some(cache);
                    if let Err(e) = store.save_rate_cache(&cache) {
                        warn!(error = %e, "failed to persist rate cache");
                    }
                    debug!(alias, rate = quote.price, "fetched USD→TWD rate");
                    return quote.price;
                }
                Ok(quote) => {
                    warn!(alias, price = quote.price, simulated = quote.simulated,
                        "rejecting unusable rate quote");
                }
                Err(e) => {
                    warn!(alias, error = %e, "rate alias failed");
                }
            }
        }

        if let Some(persisted) = store.load_rate_cache() {
            warn!(rate = persisted.rate, "rate fetch failed, using persisted rate");
            return persisted.rate;
        }

        warn!(rate = DEFAULT_USD_TWD_RATE, "no rate available, using default");
        DEFAULT_USD_TWD_RATE
    }
}

impl Default for RateResolver {
    fn default() -> Self {
        Self::new()
    }
}
