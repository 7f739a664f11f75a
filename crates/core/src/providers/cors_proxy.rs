use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::traits::QuoteProvider;
use super::yahoo_chart::{build_client, chart_url, fetch_chart, quote_from_chart, QUERY_HOSTS};
use crate::errors::CoreError;
use crate::models::quote::Quote;

/// Public CORS proxies, in fallback order. Each expects the target URL
/// percent-encoded and appended to its base.
pub const DEFAULT_PROXIES: &[&str] = &[
    "https://corsproxy.io/?",
    "https://api.allorigins.win/raw?url=",
    "https://cors-anywhere.herokuapp.com/",
];

/// Quote provider that reaches the chart API through a CORS proxy.
///
/// The proxy receives the full target URL (including its cache-busting
/// query) as a single percent-encoded component appended to the proxy
/// base. Response body and parsing are identical to the direct provider.
pub struct CorsProxyProvider {
    client: Client,
    proxy_base: String,
    target_base: String,
    name: String,
}

impl CorsProxyProvider {
    /// Proxy in front of the default Yahoo query host.
    pub fn new(proxy_base: impl Into<String>) -> Self {
        Self::with_target(proxy_base, QUERY_HOSTS[0])
    }

    /// Proxy in front of an explicit target base (injectable for tests).
    pub fn with_target(proxy_base: impl Into<String>, target_base: impl Into<String>) -> Self {
        let proxy_base = proxy_base.into();
        let name = format!("CORS proxy ({proxy_base})");
        Self {
            client: build_client(),
            proxy_base,
            target_base: target_base.into().trim_end_matches('/').to_string(),
            name,
        }
    }

    /// Full proxied URL for a symbol: proxy base + percent-encoded target.
    #[must_use]
    pub fn proxied_url(&self, symbol: &str) -> String {
        let target = chart_url(&self.target_base, symbol);
        format!("{}{}", self.proxy_base, encode_component(&target))
    }
}

/// Percent-encode a URL so it survives being a query component of the
/// proxy URL. Unreserved characters (RFC 3986) pass through.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() * 3);
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[async_trait]
impl QuoteProvider for CorsProxyProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let url = self.proxied_url(symbol);
        debug!(provider = %self.name, %symbol, "fetching quote via proxy");
        let resp = fetch_chart(&self.client, &url, &self.proxy_base).await?;
        quote_from_chart(resp, symbol, &self.proxy_base)
    }
}
