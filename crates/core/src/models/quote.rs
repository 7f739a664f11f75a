use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point-in-time price observation for a symbol.
///
/// **Important**: Quotes are ephemeral. They are displayed and used for
/// derived calculations, but never persisted — price data is not trusted
/// across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Normalized symbol the quote was fetched for (e.g., "2330.TW")
    pub symbol: String,

    /// The symbol exactly as the user entered it (e.g., "2330").
    /// Kept so callers can correlate batch results with their input.
    pub original_symbol: String,

    /// Last traded price in `currency`
    pub price: f64,

    /// Absolute change since previous close
    pub change: f64,

    /// Percentage change since previous close
    pub change_percent: f64,

    /// ISO 4217 currency of the price (e.g., "TWD", "USD")
    pub currency: String,

    /// Exchange the quote came from (e.g., "TAI", "NMS"); may be empty
    pub exchange_name: String,

    /// Market time of the observation
    pub time: DateTime<Utc>,

    /// `true` when this is deterministic placeholder data produced after
    /// every real data source failed
    #[serde(default)]
    pub simulated: bool,
}

/// Per-symbol outcome of a batch fetch.
///
/// A batch result vector always has the same length and order as the
/// (non-blank) input; a single failure never aborts the batch, it just
/// becomes an `Err` entry here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchQuoteResult {
    Quote(Quote),
    Error(QuoteError),
}

/// Error record for one symbol in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteError {
    /// The symbol exactly as the user entered it
    pub original_symbol: String,

    /// Normalized form of the symbol
    pub symbol: String,

    /// Human-readable description of the final failure
    pub message: String,
}

impl BatchQuoteResult {
    /// The un-normalized symbol this result belongs to.
    #[must_use]
    pub fn original_symbol(&self) -> &str {
        match self {
            BatchQuoteResult::Quote(q) => &q.original_symbol,
            BatchQuoteResult::Error(e) => &e.original_symbol,
        }
    }

    /// `true` if this entry resolved to a quote (simulated or real).
    #[must_use]
    pub fn is_quote(&self) -> bool {
        matches!(self, BatchQuoteResult::Quote(_))
    }

    /// The quote, if this entry resolved to one.
    #[must_use]
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            BatchQuoteResult::Quote(q) => Some(q),
            BatchQuoteResult::Error(_) => None,
        }
    }
}
