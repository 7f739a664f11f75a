// ═══════════════════════════════════════════════════════════════════
// Integration Tests — InvestmentTracker facade end-to-end
// ═══════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use invest_tracker_core::errors::CoreError;
use invest_tracker_core::models::holding::Holding;
use invest_tracker_core::models::quote::Quote;
use invest_tracker_core::models::realized::RealizedTrade;
use invest_tracker_core::providers::registry::ProviderChain;
use invest_tracker_core::providers::traits::QuoteProvider;
use invest_tracker_core::services::quote_service::QuoteServiceConfig;
use invest_tracker_core::services::rate_service::DEFAULT_USD_TWD_RATE;
use invest_tracker_core::storage::backend::MemoryStore;
use invest_tracker_core::InvestmentTracker;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Mock endpoint serving a fixed symbol → price map, counting calls.
struct MapProvider {
    prices: HashMap<String, f64>,
    calls: Arc<AtomicUsize>,
}

impl MapProvider {
    fn new(entries: &[(&str, f64)]) -> Self {
        Self {
            prices: entries
                .iter()
                .map(|(s, p)| (s.to_string(), *p))
                .collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl QuoteProvider for MapProvider {
    fn name(&self) -> &str {
        "MapProvider"
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let price = self.prices.get(symbol).copied().ok_or_else(|| {
            CoreError::QuoteApi {
                symbol: symbol.to_string(),
                message: "no data found".to_string(),
            }
        })?;
        Ok(Quote {
            symbol: symbol.to_string(),
            original_symbol: symbol.to_string(),
            price,
            change: 0.0,
            change_percent: 0.0,
            currency: if symbol.ends_with(".TW") { "TWD" } else { "USD" }.to_string(),
            exchange_name: String::new(),
            time: Utc::now(),
            simulated: false,
        })
    }
}

/// Tracker over an in-memory store wired to a mock endpoint,
/// with short inter-group delays so tests stay fast.
fn tracker_with(entries: &[(&str, f64)]) -> (InvestmentTracker<MemoryStore>, Arc<AtomicUsize>) {
    let provider = MapProvider::new(entries);
    let counter = provider.call_counter();
    let mut chain = ProviderChain::new();
    chain.register(Box::new(provider));
    let config = QuoteServiceConfig {
        batch_size: 2,
        batch_delay: Duration::from_millis(20),
    };
    (
        InvestmentTracker::with_chain(MemoryStore::new(), chain, config),
        counter,
    )
}

fn holding(symbol: &str, qty: f64, cost: f64, currency: &str) -> Holding {
    Holding::new(symbol, "", qty, cost, currency, date(2024, 1, 15))
}

// ═══════════════════════════════════════════════════════════════════
// Record management
// ═══════════════════════════════════════════════════════════════════

mod records {
    use super::*;

    #[test]
    fn holding_crud_round_trip() {
        let (mut tracker, _) = tracker_with(&[]);

        let id = tracker
            .add_holding(holding("2330", 100.0, 550.0, "TWD"))
            .unwrap();
        assert_eq!(tracker.get_holdings().len(), 1);

        let mut updated = holding("2330", 200.0, 550.0, "TWD");
        updated.name = "台積電".to_string();
        tracker.update_holding(id, updated).unwrap();

        let read = tracker.get_holdings();
        assert_eq!(read[0].id, id);
        assert_eq!(read[0].quantity, 200.0);
        assert_eq!(read[0].name, "台積電");

        tracker.delete_holding(id).unwrap();
        assert!(tracker.get_holdings().is_empty());
    }

    #[test]
    fn realized_trade_crud_round_trip() {
        let (mut tracker, _) = tracker_with(&[]);

        let trade = RealizedTrade::new("2603", "長榮", 2000.0, 120.0, 185.5, "TWD", date(2024, 5, 20));
        let id = tracker.add_realized_trade(trade).unwrap();
        assert_eq!(tracker.get_realized_trades().len(), 1);

        tracker.delete_realized_trade(id).unwrap();
        assert!(tracker.get_realized_trades().is_empty());
    }

    #[test]
    fn rejects_invalid_positions() {
        let (mut tracker, _) = tracker_with(&[]);

        for bad in [
            holding("2330", 0.0, 550.0, "TWD"),
            holding("2330", -5.0, 550.0, "TWD"),
            holding("2330", f64::NAN, 550.0, "TWD"),
            holding("2330", 100.0, -1.0, "TWD"),
            holding("2330", 100.0, f64::INFINITY, "TWD"),
        ] {
            let err = tracker.add_holding(bad).unwrap_err();
            assert!(matches!(err, CoreError::ValidationError(_)));
        }
        assert!(tracker.get_holdings().is_empty());
    }

    #[test]
    fn unknown_id_is_record_not_found() {
        let (mut tracker, _) = tracker_with(&[]);
        let err = tracker.delete_holding(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, CoreError::RecordNotFound(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Quotes through the facade
// ═══════════════════════════════════════════════════════════════════

mod quotes {
    use super::*;

    #[tokio::test]
    async fn get_quote_normalizes_taiwan_symbols() {
        let (tracker, _) = tracker_with(&[("2330.TW", 1005.0)]);
        let quote = tracker.get_quote("2330").await.unwrap();
        assert_eq!(quote.symbol, "2330.TW");
        assert_eq!(quote.original_symbol, "2330");
    }

    #[tokio::test]
    async fn refresh_quotes_covers_distinct_held_symbols() {
        let (mut tracker, counter) = tracker_with(&[("2330.TW", 1005.0), ("AAPL", 210.0)]);
        tracker
            .add_holding(holding("2330", 100.0, 550.0, "TWD"))
            .unwrap();
        tracker
            .add_holding(holding("AAPL", 10.0, 180.0, "USD"))
            .unwrap();
        // Same symbol again, different lot: fetched only once
        tracker
            .add_holding(holding("aapl", 5.0, 190.0, "USD"))
            .unwrap();

        let results = tracker.refresh_quotes().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].original_symbol(), "2330");
        assert_eq!(results[1].original_symbol(), "AAPL");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_quotes_with_no_holdings_is_empty() {
        let (tracker, counter) = tracker_with(&[]);
        assert!(tracker.refresh_quotes().await.is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn default_chain_has_direct_hosts_and_proxies() {
        let tracker = InvestmentTracker::new(MemoryStore::new());
        assert_eq!(tracker.endpoint_names().len(), 5);

        let fallback = InvestmentTracker::with_simulated_fallback(MemoryStore::new());
        let names = fallback.endpoint_names();
        assert_eq!(names.len(), 6);
        assert_eq!(names.last().map(String::as_str), Some("Simulated"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Exchange rate & summary
// ═══════════════════════════════════════════════════════════════════

mod summary {
    use super::*;

    #[tokio::test]
    async fn rate_resolves_and_caches() {
        let (mut tracker, counter) = tracker_with(&[("TWD=X", 32.5)]);

        assert_eq!(tracker.get_usd_twd_rate().await, 32.5);
        let calls = counter.load(Ordering::SeqCst);

        // Within the cache window nothing hits the network
        assert_eq!(tracker.get_usd_twd_rate().await, 32.5);
        assert_eq!(counter.load(Ordering::SeqCst), calls);
    }

    #[tokio::test]
    async fn rate_defaults_when_unreachable() {
        let (mut tracker, _) = tracker_with(&[]);
        assert_eq!(tracker.get_usd_twd_rate().await, DEFAULT_USD_TWD_RATE);
    }

    #[tokio::test]
    async fn portfolio_summary_end_to_end() {
        let (mut tracker, _) = tracker_with(&[
            ("2330.TW", 600.0),
            ("AAPL", 200.0),
            ("TWD=X", 32.0),
        ]);
        tracker
            .add_holding(holding("2330", 100.0, 550.0, "TWD"))
            .unwrap();
        tracker
            .add_holding(holding("AAPL", 10.0, 180.0, "USD"))
            .unwrap();
        tracker
            .add_realized_trade(RealizedTrade::new(
                "2603", "", 100.0, 120.0, 150.0, "TWD", date(2024, 5, 20),
            ))
            .unwrap();

        let summary = tracker.portfolio_summary().await;

        assert_eq!(summary.usd_twd_rate, 32.0);
        // 100×600 + 10×200×32
        assert!((summary.total_value_twd - 124_000.0).abs() < 1e-6);
        // 55,000 + 1,800×32
        assert!((summary.total_cost_twd - 112_600.0).abs() < 1e-6);
        assert!((summary.unrealized_gain_twd - 11_400.0).abs() < 1e-6);
        assert!((summary.realized_gain_twd - 3_000.0).abs() < 1e-6);
        assert_eq!(summary.unpriced_holdings, 0);
        assert_eq!(summary.holdings.len(), 2);
    }

    #[tokio::test]
    async fn summary_keeps_unreachable_positions_visible() {
        let (mut tracker, _) = tracker_with(&[("2330.TW", 600.0)]);
        tracker
            .add_holding(holding("2330", 100.0, 550.0, "TWD"))
            .unwrap();
        tracker
            .add_holding(holding("9999", 10.0, 50.0, "TWD"))
            .unwrap();

        let summary = tracker.portfolio_summary().await;

        assert_eq!(summary.holdings.len(), 2);
        assert_eq!(summary.unpriced_holdings, 1);
        let dead = summary
            .holdings
            .iter()
            .find(|v| v.symbol == "9999")
            .unwrap();
        assert_eq!(dead.market_value, None);
        assert!(dead.error.is_some());
        assert_eq!(dead.total_cost, 500.0);
    }

    #[tokio::test]
    async fn summarize_with_uses_caller_quotes() {
        let (mut tracker, counter) = tracker_with(&[]);
        tracker
            .add_holding(holding("2330", 100.0, 550.0, "TWD"))
            .unwrap();

        let quotes = tracker_quotes("2330", "2330.TW", 600.0);
        let summary = tracker.summarize_with(&quotes, 32.0);

        assert!((summary.total_value_twd - 60_000.0).abs() < 1e-6);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    fn tracker_quotes(
        original: &str,
        normalized: &str,
        price: f64,
    ) -> Vec<invest_tracker_core::models::quote::BatchQuoteResult> {
        vec![invest_tracker_core::models::quote::BatchQuoteResult::Quote(
            Quote {
                symbol: normalized.to_string(),
                original_symbol: original.to_string(),
                price,
                change: 0.0,
                change_percent: 0.0,
                currency: "TWD".to_string(),
                exchange_name: String::new(),
                time: Utc::now(),
                simulated: false,
            },
        )]
    }
}

// ═══════════════════════════════════════════════════════════════════
// Simulated fallback path
// ═══════════════════════════════════════════════════════════════════

mod simulated_fallback {
    use super::*;
    use invest_tracker_core::providers::simulated::SimulatedProvider;

    /// Endpoint that always fails with a network error.
    struct DownProvider;

    #[async_trait]
    impl QuoteProvider for DownProvider {
        fn name(&self) -> &str {
            "Down"
        }

        async fn fetch_quote(&self, _symbol: &str) -> Result<Quote, CoreError> {
            Err(CoreError::Network("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn degrades_to_flagged_placeholder_quotes() {
        let mut chain = ProviderChain::new();
        chain.register(Box::new(DownProvider));
        chain.register(Box::new(SimulatedProvider::new()));
        let tracker = InvestmentTracker::with_chain(
            MemoryStore::new(),
            chain,
            QuoteServiceConfig {
                batch_size: 2,
                batch_delay: Duration::from_millis(20),
            },
        );

        let quote = tracker.get_quote("2330").await.unwrap();
        assert!(quote.simulated);
        assert_eq!(quote.symbol, "2330.TW");
        assert_eq!(quote.currency, "TWD");
        assert!(quote.price > 0.0);
    }

    #[tokio::test]
    async fn without_fallback_failure_surfaces_last_error() {
        let mut chain = ProviderChain::new();
        chain.register(Box::new(DownProvider));
        let tracker = InvestmentTracker::with_chain(
            MemoryStore::new(),
            chain,
            QuoteServiceConfig::default(),
        );

        let err = tracker.get_quote("2330").await.unwrap_err();
        match err {
            CoreError::EndpointsExhausted { symbol, last_error } => {
                assert_eq!(symbol, "2330.TW");
                assert!(last_error.contains("connection refused"));
            }
            other => panic!("expected EndpointsExhausted, got {other:?}"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Debug
// ═══════════════════════════════════════════════════════════════════

#[test]
fn debug_reports_store_and_chain_sizes() {
    let tracker = InvestmentTracker::new(MemoryStore::new());
    let rendered = format!("{tracker:?}");
    assert!(rendered.contains("InvestmentTracker"));
    assert!(rendered.contains("endpoints: 5"));
}
