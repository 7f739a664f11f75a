use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived figures for a single holding, computed from the holding and
/// its latest quote. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingValuation {
    /// Id of the holding this valuation belongs to
    pub holding_id: Uuid,

    /// Ticker as the user entered it
    pub symbol: String,

    /// Current price per share, if a quote was available
    pub price: Option<f64>,

    /// Currency of `price` and the monetary fields below
    pub currency: String,

    /// quantity × price, if a quote was available
    pub market_value: Option<f64>,

    /// quantity × cost_per_share
    pub total_cost: f64,

    /// market_value − total_cost
    pub unrealized_gain: Option<f64>,

    /// unrealized_gain / total_cost × 100
    pub unrealized_gain_pct: Option<f64>,

    /// `true` when the valuation rests on placeholder price data
    pub simulated: bool,

    /// Failure description when no quote was available
    pub error: Option<String>,
}

/// Whole-portfolio summary with everything converted to TWD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// USD→TWD rate used for the conversions below
    pub usd_twd_rate: f64,

    /// Total market value of valued holdings, in TWD
    pub total_value_twd: f64,

    /// Total cost basis of valued holdings, in TWD
    pub total_cost_twd: f64,

    /// total_value_twd − total_cost_twd
    pub unrealized_gain_twd: f64,

    /// Aggregate profit of all realized trades, in TWD
    pub realized_gain_twd: f64,

    /// Number of holdings that could not be valued (no quote)
    pub unpriced_holdings: usize,

    /// Per-holding breakdown, in input order
    pub holdings: Vec<HoldingValuation>,
}
