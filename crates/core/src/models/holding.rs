use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-entered open stock position.
///
/// Records carry a stable `Uuid` identity. Update/delete address records
/// by id, so removing one holding never shifts the identity of the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Unique identifier
    pub id: Uuid,

    /// Ticker as the user entered it (e.g., "2330", "AAPL")
    pub symbol: String,

    /// Human-readable name (e.g., "台積電", "Apple Inc.")
    #[serde(default)]
    pub name: String,

    /// Number of shares held (always positive)
    pub quantity: f64,

    /// Purchase cost per share, in `currency`
    pub cost_per_share: f64,

    /// Currency of the cost basis (e.g., "TWD", "USD")
    pub currency: String,

    /// Date the position was opened
    pub purchase_date: NaiveDate,

    /// Optional free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl Holding {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        quantity: f64,
        cost_per_share: f64,
        currency: impl Into<String>,
        purchase_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            name: name.into(),
            quantity,
            cost_per_share,
            currency: currency.into().to_uppercase(),
            purchase_date,
            notes: None,
        }
    }

    /// Total cost of the position.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.quantity * self.cost_per_share
    }
}
