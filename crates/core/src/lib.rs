pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;
pub mod symbol;

use uuid::Uuid;

use errors::CoreError;
use models::holding::Holding;
use models::quote::{BatchQuoteResult, Quote};
use models::realized::RealizedTrade;
use models::summary::PortfolioSummary;
use providers::registry::ProviderChain;
use services::portfolio_service::PortfolioService;
use services::quote_service::{QuoteService, QuoteServiceConfig};
use services::rate_service::RateResolver;
use storage::backend::KeyValueStore;
use storage::store::LocalStore;

/// Main entry point for the Investment Tracker core library.
///
/// Owns the local store and all services needed to operate on it:
/// record CRUD, resilient quote fetching, USD→TWD resolution, and
/// derived portfolio figures.
#[must_use]
pub struct InvestmentTracker<S: KeyValueStore> {
    store: LocalStore<S>,
    quote_service: QuoteService,
    rate_resolver: RateResolver,
    portfolio_service: PortfolioService,
}

impl<S: KeyValueStore> std::fmt::Debug for InvestmentTracker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvestmentTracker")
            .field("holdings", &self.store.holdings().len())
            .field("realized_trades", &self.store.realized_trades().len())
            .field("endpoints", &self.quote_service.chain().len())
            .finish()
    }
}

impl<S: KeyValueStore> InvestmentTracker<S> {
    /// Tracker over `backend` with the default endpoint chain
    /// (direct hosts, then CORS proxies; no synthetic fallback).
    pub fn new(backend: S) -> Self {
        Self::build(backend, ProviderChain::new_with_defaults(false))
    }

    /// Like [`new`](Self::new), but the chain ends in the simulated
    /// provider, so quote fetches degrade to flagged placeholder data
    /// instead of error records when every endpoint is down.
    pub fn with_simulated_fallback(backend: S) -> Self {
        Self::build(backend, ProviderChain::new_with_defaults(true))
    }

    /// Tracker with an explicit chain and batch configuration.
    pub fn with_chain(backend: S, chain: ProviderChain, config: QuoteServiceConfig) -> Self {
        Self {
            store: LocalStore::new(backend),
            quote_service: QuoteService::with_config(chain, config),
            rate_resolver: RateResolver::new(),
            portfolio_service: PortfolioService::new(),
        }
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// All stored holdings.
    #[must_use]
    pub fn get_holdings(&self) -> Vec<Holding> {
        self.store.holdings()
    }

    /// Add a holding. Returns its id.
    pub fn add_holding(&mut self, holding: Holding) -> Result<Uuid, CoreError> {
        Self::validate_position(holding.quantity, holding.cost_per_share)?;
        let id = holding.id;
        self.store.add_holding(holding)?;
        Ok(id)
    }

    /// Replace the holding with `id`.
    pub fn update_holding(&mut self, id: Uuid, updated: Holding) -> Result<(), CoreError> {
        Self::validate_position(updated.quantity, updated.cost_per_share)?;
        self.store.update_holding(id, updated)
    }

    /// Delete the holding with `id`.
    pub fn delete_holding(&mut self, id: Uuid) -> Result<(), CoreError> {
        self.store.delete_holding(id)
    }

    // ── Realized trades ─────────────────────────────────────────────

    /// All stored realized trades.
    #[must_use]
    pub fn get_realized_trades(&self) -> Vec<RealizedTrade> {
        self.store.realized_trades()
    }

    /// Add a realized trade. Returns its id.
    pub fn add_realized_trade(&mut self, trade: RealizedTrade) -> Result<Uuid, CoreError> {
        Self::validate_position(trade.quantity, trade.buy_price)?;
        let id = trade.id;
        self.store.add_realized_trade(trade)?;
        Ok(id)
    }

    /// Replace the realized trade with `id`.
    pub fn update_realized_trade(
        &mut self,
        id: Uuid,
        updated: RealizedTrade,
    ) -> Result<(), CoreError> {
        Self::validate_position(updated.quantity, updated.buy_price)?;
        self.store.update_realized_trade(id, updated)
    }

    /// Delete the realized trade with `id`.
    pub fn delete_realized_trade(&mut self, id: Uuid) -> Result<(), CoreError> {
        self.store.delete_realized_trade(id)
    }

    // ── Quotes ──────────────────────────────────────────────────────

    /// Fetch one quote through the endpoint chain.
    pub async fn get_quote(&self, raw_symbol: &str) -> Result<Quote, CoreError> {
        self.quote_service.get_quote(raw_symbol).await
    }

    /// Fetch quotes for an arbitrary symbol list (batched, rate-limited).
    pub async fn get_quotes(&self, raw_symbols: &[String]) -> Vec<BatchQuoteResult> {
        self.quote_service.get_quotes(raw_symbols).await
    }

    /// Fetch quotes for every distinct held symbol.
    pub async fn refresh_quotes(&self) -> Vec<BatchQuoteResult> {
        let symbols = self.held_symbols();
        self.quote_service.get_quotes(&symbols).await
    }

    /// Names of the registered quote endpoints, in try order.
    #[must_use]
    pub fn endpoint_names(&self) -> Vec<String> {
        self.quote_service.chain().provider_names()
    }

    // ── Exchange rate ───────────────────────────────────────────────

    /// Resolve the USD→TWD rate (cached, fetched, persisted, or default).
    pub async fn get_usd_twd_rate(&mut self) -> f64 {
        self.rate_resolver
            .resolve(self.quote_service.chain(), &mut self.store)
            .await
    }

    // ── Summary ─────────────────────────────────────────────────────

    /// Fetch fresh quotes and the exchange rate, then compute the
    /// TWD-denominated portfolio summary.
    pub async fn portfolio_summary(&mut self) -> PortfolioSummary {
        let holdings = self.store.holdings();
        let trades = self.store.realized_trades();

        let symbols = self.held_symbols();
        let quotes = self.quote_service.get_quotes(&symbols).await;
        let rate = self
            .rate_resolver
            .resolve(self.quote_service.chain(), &mut self.store)
            .await;

        self.portfolio_service
            .summarize(&holdings, &quotes, &trades, rate)
    }

    /// Summary from quotes the caller already fetched (no network).
    #[must_use]
    pub fn summarize_with(
        &self,
        quotes: &[BatchQuoteResult],
        usd_twd_rate: f64,
    ) -> PortfolioSummary {
        let holdings = self.store.holdings();
        let trades = self.store.realized_trades();
        self.portfolio_service
            .summarize(&holdings, quotes, &trades, usd_twd_rate)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(backend: S, chain: ProviderChain) -> Self {
        Self {
            store: LocalStore::new(backend),
            quote_service: QuoteService::new(chain),
            rate_resolver: RateResolver::new(),
            portfolio_service: PortfolioService::new(),
        }
    }

    /// Distinct held symbols in first-seen order (case-insensitive).
    fn held_symbols(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.store
            .holdings()
            .iter()
            .map(|h| h.symbol.trim().to_string())
            .filter(|s| !s.is_empty() && seen.insert(s.to_uppercase()))
            .collect()
    }

    fn validate_position(quantity: f64, price: f64) -> Result<(), CoreError> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(CoreError::ValidationError(
                "quantity must be positive".into(),
            ));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(CoreError::ValidationError(
                "price must be non-negative".into(),
            ));
        }
        Ok(())
    }
}
