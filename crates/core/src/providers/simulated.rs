use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tracing::warn;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::quote::Quote;

/// Relative size of the random perturbation around the base price.
const PERTURBATION: f64 = 0.02;

/// Last-resort provider that fabricates a plausible quote when every
/// real data source has failed, so callers can still render something.
///
/// The base price is a deterministic hash of the symbol (the same symbol
/// always lands near the same price); a small random perturbation makes
/// repeated refreshes move a little. Quotes are flagged `simulated: true`
/// and must never be treated as market data.
pub struct SimulatedProvider;

impl SimulatedProvider {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic pseudo-price for a symbol, in [10.0, 960.0).
    #[must_use]
    pub fn base_price(symbol: &str) -> f64 {
        // FNV-1a over the symbol bytes
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in symbol.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        10.0 + (hash % 9500) as f64 / 10.0
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for SimulatedProvider {
    fn name(&self) -> &str {
        "Simulated"
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        warn!(%symbol, "all real endpoints failed, serving simulated quote");

        let base = Self::base_price(symbol);
        let factor = 1.0 + rand::thread_rng().gen_range(-PERTURBATION..PERTURBATION);
        let price = base * factor;
        let change = price - base;
        let change_percent = change / base * 100.0;

        let currency = if symbol.ends_with(".TW") { "TWD" } else { "USD" };

        Ok(Quote {
            symbol: symbol.to_string(),
            original_symbol: symbol.to_string(),
            price,
            change,
            change_percent,
            currency: currency.to_string(),
            exchange_name: String::new(),
            time: Utc::now(),
            simulated: true,
        })
    }
}
