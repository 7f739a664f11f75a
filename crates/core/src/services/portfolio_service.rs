use tracing::debug;

use crate::models::holding::Holding;
use crate::models::quote::BatchQuoteResult;
use crate::models::realized::RealizedTrade;
use crate::models::summary::{HoldingValuation, PortfolioSummary};

/// Computes derived portfolio figures from holdings, quotes, and realized
/// trades. Pure business logic — no I/O, no API calls.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Value a single holding against its batch result (if any).
    ///
    /// A missing or failed quote yields a valuation with the cost-basis
    /// figures filled in and the market-value figures absent, so the
    /// caller can still display the position.
    pub fn value_holding(
        &self,
        holding: &Holding,
        result: Option<&BatchQuoteResult>,
    ) -> HoldingValuation {
        let total_cost = holding.total_cost();

        let (price, currency, simulated, error) = match result {
            Some(BatchQuoteResult::Quote(q)) => {
                (Some(q.price), q.currency.clone(), q.simulated, None)
            }
            Some(BatchQuoteResult::Error(e)) => {
                (None, holding.currency.clone(), false, Some(e.message.clone()))
            }
            None => (
                None,
                holding.currency.clone(),
                false,
                Some("no quote available".to_string()),
            ),
        };

        let market_value = price.map(|p| holding.quantity * p);
        let unrealized_gain = market_value.map(|v| v - total_cost);
        let unrealized_gain_pct = unrealized_gain.and_then(|gain| {
            if total_cost.abs() < f64::EPSILON {
                None
            } else {
                Some(gain / total_cost * 100.0)
            }
        });

        HoldingValuation {
            holding_id: holding.id,
            symbol: holding.symbol.clone(),
            price,
            currency,
            market_value,
            total_cost,
            unrealized_gain,
            unrealized_gain_pct,
            simulated,
            error,
        }
    }

    /// Summarize the whole portfolio in TWD.
    ///
    /// Quotes are correlated with holdings by the original (un-normalized)
    /// symbol. Non-TWD values are converted with `usd_twd_rate` — every
    /// non-TWD position in this tracker is USD-denominated.
    pub fn summarize(
        &self,
        holdings: &[Holding],
        quotes: &[BatchQuoteResult],
        trades: &[RealizedTrade],
        usd_twd_rate: f64,
    ) -> PortfolioSummary {
        let mut total_value_twd = 0.0;
        let mut total_cost_twd = 0.0;
        let mut unpriced = 0;

        let valuations: Vec<HoldingValuation> = holdings
            .iter()
            .map(|holding| {
                let result = quotes
                    .iter()
                    .find(|r| r.original_symbol().eq_ignore_ascii_case(holding.symbol.trim()));
                let valuation = self.value_holding(holding, result);

                let to_twd = Self::twd_factor(&valuation.currency, usd_twd_rate);
                match valuation.market_value {
                    Some(value) => {
                        total_value_twd += value * to_twd;
                        total_cost_twd += valuation.total_cost * to_twd;
                    }
                    None => unpriced += 1,
                }

                valuation
            })
            .collect();

        let realized_gain_twd: f64 = trades
            .iter()
            .map(|t| t.profit() * Self::twd_factor(&t.currency, usd_twd_rate))
            .sum();

        debug!(
            holdings = holdings.len(),
            unpriced,
            total_value_twd,
            realized_gain_twd,
            "portfolio summarized"
        );

        PortfolioSummary {
            usd_twd_rate,
            total_value_twd,
            total_cost_twd,
            unrealized_gain_twd: total_value_twd - total_cost_twd,
            realized_gain_twd,
            unpriced_holdings: unpriced,
            holdings: valuations,
        }
    }

    fn twd_factor(currency: &str, usd_twd_rate: f64) -> f64 {
        if currency.eq_ignore_ascii_case("TWD") {
            1.0
        } else {
            usd_twd_rate
        }
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
