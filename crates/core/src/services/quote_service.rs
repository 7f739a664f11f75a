use std::time::Duration;

use futures::future::join_all;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::quote::{BatchQuoteResult, Quote, QuoteError};
use crate::providers::registry::ProviderChain;
use crate::symbol::normalize_symbol;

/// Tuning knobs for batch fetching.
///
/// The quote API rate-limits aggressively, so batches are kept small and
/// separated by a fixed delay. Tests shrink both.
#[derive(Debug, Clone)]
pub struct QuoteServiceConfig {
    /// How many symbols are fetched concurrently per group
    pub batch_size: usize,

    /// Pause between consecutive groups (skipped after the last one)
    pub batch_delay: Duration,
}

impl Default for QuoteServiceConfig {
    fn default() -> Self {
        Self {
            batch_size: 2,
            batch_delay: Duration::from_millis(1500),
        }
    }
}

/// Fetches quotes through the provider chain, one symbol at a time or in
/// rate-limited batches.
pub struct QuoteService {
    chain: ProviderChain,
    config: QuoteServiceConfig,
}

impl QuoteService {
    pub fn new(chain: ProviderChain) -> Self {
        Self {
            chain,
            config: QuoteServiceConfig::default(),
        }
    }

    pub fn with_config(chain: ProviderChain, config: QuoteServiceConfig) -> Self {
        Self { chain, config }
    }

    #[must_use]
    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    /// Fetch one quote. The raw symbol is normalized before the request
    /// and carried back on the quote for caller-side correlation.
    pub async fn get_quote(&self, raw_symbol: &str) -> Result<Quote, CoreError> {
        let original = raw_symbol.trim();
        let normalized = normalize_symbol(original);
        if normalized.is_empty() {
            return Err(CoreError::ValidationError("empty symbol".into()));
        }

        let mut quote = self.chain.fetch_quote(&normalized).await?;
        quote.original_symbol = original.to_string();
        Ok(quote)
    }

    /// Fetch quotes for many symbols.
    ///
    /// Blank entries are dropped; the result has exactly one entry per
    /// remaining symbol, in input order. Symbols are processed in groups
    /// of `batch_size`: requests within a group run concurrently, groups
    /// run strictly sequentially with `batch_delay` between them. One
    /// symbol failing never aborts the rest — it becomes an
    /// `BatchQuoteResult::Error` entry.
    pub async fn get_quotes(&self, raw_symbols: &[String]) -> Vec<BatchQuoteResult> {
        let valid: Vec<&str> = raw_symbols
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        if valid.is_empty() {
            return Vec::new();
        }

        let batch_size = self.config.batch_size.max(1);
        let group_count = valid.len().div_ceil(batch_size);
        debug!(symbols = valid.len(), groups = group_count, "starting batch fetch");

        let mut results = Vec::with_capacity(valid.len());
        for (group_idx, group) in valid.chunks(batch_size).enumerate() {
            debug!(group = group_idx + 1, of = group_count, symbols = ?group, "fetching group");

            let fetches = group.iter().map(|symbol| self.fetch_one(symbol));
            results.extend(join_all(fetches).await);

            if group_idx + 1 < group_count {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }

        results
    }

    /// Single fetch that converts failure into a per-symbol error record.
    async fn fetch_one(&self, raw_symbol: &str) -> BatchQuoteResult {
        match self.get_quote(raw_symbol).await {
            Ok(quote) => BatchQuoteResult::Quote(quote),
            Err(e) => BatchQuoteResult::Error(QuoteError {
                original_symbol: raw_symbol.to_string(),
                symbol: normalize_symbol(raw_symbol),
                message: e.to_string(),
            }),
        }
    }
}
