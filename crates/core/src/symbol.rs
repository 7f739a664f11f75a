//! Ticker symbol normalization and display formatting.
//!
//! Taiwan-market tickers are fetched from the quote API as `NNNN.TW`;
//! users typically enter just the number. US tickers are used as-is.

/// Market suffix appended to Taiwan-listed tickers.
pub const TAIWAN_SUFFIX: &str = ".TW";

/// Canonicalize a raw user-entered ticker.
///
/// - Empty input stays empty.
/// - Input already carrying a market suffix (any `.`) is returned unchanged.
/// - Taiwan-market symbols get `.TW` appended.
/// - Everything else is returned unchanged.
///
/// Idempotent: normalizing twice equals normalizing once.
#[must_use]
pub fn normalize_symbol(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.contains('.') {
        return trimmed.to_string();
    }
    if is_taiwan_symbol(trimmed) {
        format!("{trimmed}{TAIWAN_SUFFIX}")
    } else {
        trimmed.to_string()
    }
}

/// Classify a suffix-less ticker as Taiwan-listed.
///
/// Rule: at most 6 characters, a leading run of ASCII digits, optionally
/// followed by exactly one ASCII letter. Covers plain numeric codes
/// ("2330") and ETF share classes ("00878B"); plain letter tickers
/// ("AAPL") are not Taiwan-listed.
#[must_use]
pub fn is_taiwan_symbol(symbol: &str) -> bool {
    if symbol.is_empty() || symbol.len() > 6 {
        return false;
    }
    let digits = symbol.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return false;
    }
    let rest: Vec<char> = symbol.chars().skip(digits).collect();
    match rest.as_slice() {
        [] => true,
        [c] => c.is_ascii_alphabetic(),
        _ => false,
    }
}

/// Format a price with its currency symbol: `NT$101.50` for TWD,
/// `$101.50` for everything else. `None` renders as `-`.
#[must_use]
pub fn format_price(price: Option<f64>, currency: &str) -> String {
    let Some(price) = price else {
        return "-".to_string();
    };
    let prefix = if currency.eq_ignore_ascii_case("TWD") {
        "NT$"
    } else {
        "$"
    };
    format!("{prefix}{price:.2}")
}

/// Format a change and its percentage with an explicit sign:
/// `+1.50 (+2.00%)`. `None` renders as `-`.
#[must_use]
pub fn format_change(change: Option<f64>, change_percent: Option<f64>) -> String {
    let (Some(change), Some(pct)) = (change, change_percent) else {
        return "-".to_string();
    };
    let sign = if change >= 0.0 { "+" } else { "" };
    format!("{sign}{change:.2} ({sign}{pct:.2}%)")
}
