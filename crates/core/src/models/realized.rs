use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-entered record of a closed position's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedTrade {
    /// Unique identifier
    pub id: Uuid,

    /// Ticker as the user entered it
    pub symbol: String,

    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Number of shares closed (always positive)
    pub quantity: f64,

    /// Purchase price per share, in `currency`
    pub buy_price: f64,

    /// Sale price per share, in `currency`
    pub sell_price: f64,

    /// Currency of both prices (e.g., "TWD", "USD")
    pub currency: String,

    /// Date the position was closed
    pub sell_date: NaiveDate,

    /// Optional free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl RealizedTrade {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        quantity: f64,
        buy_price: f64,
        sell_price: f64,
        currency: impl Into<String>,
        sell_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            name: name.into(),
            quantity,
            buy_price,
            sell_price,
            currency: currency.into().to_uppercase(),
            sell_date,
            notes: None,
        }
    }

    /// Realized profit (or loss, when negative) of the trade.
    #[must_use]
    pub fn profit(&self) -> f64 {
        (self.sell_price - self.buy_price) * self.quantity
    }

    /// Percentage return over the cost basis. Zero cost yields 0.0.
    #[must_use]
    pub fn return_pct(&self) -> f64 {
        let cost = self.buy_price * self.quantity;
        if cost.abs() < f64::EPSILON {
            0.0
        } else {
            self.profit() / cost * 100.0
        }
    }
}
