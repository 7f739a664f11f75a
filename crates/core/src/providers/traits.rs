use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::quote::Quote;

/// Trait abstraction for a single quote endpoint strategy.
///
/// Each way of reaching price data (direct chart API, CORS-proxied chart
/// API, synthetic fallback) implements this trait. The fallback chain
/// walks an ordered list of implementations, so an endpoint that stops
/// working is replaced without touching the rest of the codebase.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this endpoint (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the current quote for an already-normalized symbol.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError>;
}
