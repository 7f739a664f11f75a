use tracing::{debug, warn};

use super::cors_proxy::{CorsProxyProvider, DEFAULT_PROXIES};
use super::simulated::SimulatedProvider;
use super::traits::QuoteProvider;
use super::yahoo_chart::{YahooChartProvider, QUERY_HOSTS};
use crate::errors::CoreError;
use crate::models::quote::Quote;

/// Ordered chain of quote endpoints tried via a uniform retry loop.
///
/// The first provider to return a quote wins; when every provider fails
/// the last error is surfaced as `EndpointsExhausted`. New endpoints can
/// be registered without modifying existing code.
pub struct ProviderChain {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl ProviderChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Chain with all default endpoints: both direct query hosts first,
    /// then each public CORS proxy. With `with_simulated_fallback`, a
    /// synthetic provider terminates the chain so a fetch can only fail
    /// on an empty symbol, never on network conditions.
    pub fn new_with_defaults(with_simulated_fallback: bool) -> Self {
        let mut chain = Self::new();

        for host in QUERY_HOSTS {
            chain.register(Box::new(YahooChartProvider::new(*host)));
        }

        for proxy in DEFAULT_PROXIES {
            chain.register(Box::new(CorsProxyProvider::new(*proxy)));
        }

        if with_simulated_fallback {
            chain.register(Box::new(SimulatedProvider::new()));
        }

        chain
    }

    /// Append a provider to the end of the chain.
    pub fn register(&mut self, provider: Box<dyn QuoteProvider>) {
        self.providers.push(provider);
    }

    /// Names of the registered endpoints, in try order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Walk the chain for an already-normalized symbol.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        if self.providers.is_empty() {
            return Err(CoreError::EndpointsExhausted {
                symbol: symbol.to_string(),
                last_error: "no endpoints registered".to_string(),
            });
        }

        let mut last_error: Option<CoreError> = None;
        for provider in &self.providers {
            match provider.fetch_quote(symbol).await {
                Ok(quote) => {
                    // Reject non-finite or negative prices instead of
                    // propagating them into gain calculations.
                    if !quote.price.is_finite() || quote.price < 0.0 {
                        warn!(
                            provider = provider.name(),
                            %symbol,
                            price = quote.price,
                            "endpoint returned invalid price"
                        );
                        last_error = Some(CoreError::MalformedPayload {
                            endpoint: provider.name().to_string(),
                            message: format!("invalid price {} for {symbol}", quote.price),
                        });
                        continue;
                    }
                    debug!(provider = provider.name(), %symbol, price = quote.price, "quote resolved");
                    return Ok(quote);
                }
                Err(e) => {
                    warn!(provider = provider.name(), %symbol, error = %e, "endpoint failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        let last_error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        Err(CoreError::EndpointsExhausted {
            symbol: symbol.to_string(),
            last_error,
        })
    }
}

impl Default for ProviderChain {
    fn default() -> Self {
        Self::new()
    }
}
