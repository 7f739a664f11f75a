use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::quote::Quote;

/// Yahoo's two public query hosts. The v7 quote API is restricted, so
/// everything goes through the v8 chart endpoint.
pub const QUERY_HOSTS: &[&str] = &[
    "https://query1.finance.yahoo.com",
    "https://query2.finance.yahoo.com",
];

/// Browser-like UA; the chart endpoint rejects default client agents.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Direct Yahoo Finance chart API provider.
///
/// - **Free**: no API key.
/// - **Coverage**: global equities incl. Taiwan (`.TW`) listings.
/// - **Endpoint**: `{base}/v8/finance/chart/{symbol}?interval=1d`
///
/// The base URL is injectable so tests can point it at a local server.
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
    name: String,
}

impl YahooChartProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let name = format!("Yahoo Chart ({base_url})");
        Self {
            client: build_client(),
            base_url,
            name,
        }
    }
}

pub(crate) fn build_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Build the chart URL for a symbol. The timestamp query parameter busts
/// intermediary caches, mirroring what browsers need behind CORS proxies.
pub(crate) fn chart_url(base_url: &str, symbol: &str) -> String {
    let ts = Utc::now().timestamp_millis();
    format!("{base_url}/v8/finance/chart/{symbol}?interval=1d&t={ts}")
}

// ── Chart API response types ────────────────────────────────────────

#[derive(Deserialize)]
pub(crate) struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_time: Option<i64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    currency: Option<String>,
    exchange_name: Option<String>,
}

/// Issue the GET and map the three failure classes: no response →
/// `Network` (via `From<reqwest::Error>`), non-2xx → `HttpStatus`,
/// unparseable body → `MalformedPayload`.
pub(crate) async fn fetch_chart(
    client: &Client,
    url: &str,
    endpoint: &str,
) -> Result<ChartResponse, CoreError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .header("Cache-Control", "no-cache")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(CoreError::HttpStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .json()
        .await
        .map_err(|e| CoreError::MalformedPayload {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
}

/// Turn a parsed chart payload into a `Quote`.
///
/// A populated `chart.error` inside a 2xx body is a business error
/// (unknown symbol, delisted, etc.); a missing `meta` or price is a
/// payload-shape error.
pub(crate) fn quote_from_chart(
    resp: ChartResponse,
    symbol: &str,
    endpoint: &str,
) -> Result<Quote, CoreError> {
    if let Some(err) = resp.chart.error {
        return Err(CoreError::QuoteApi {
            symbol: symbol.to_string(),
            message: err.to_string(),
        });
    }

    let meta = resp
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { r.remove(0).meta })
        .ok_or_else(|| CoreError::MalformedPayload {
            endpoint: endpoint.to_string(),
            message: format!("missing chart.result[0].meta for {symbol}"),
        })?;

    let price = meta
        .regular_market_price
        .or(meta.previous_close)
        .ok_or_else(|| CoreError::MalformedPayload {
            endpoint: endpoint.to_string(),
            message: format!("no price field for {symbol}"),
        })?;

    // Change fields are often absent from the chart meta; derive them
    // from the previous close when needed.
    let prev_close = meta.previous_close.or(meta.chart_previous_close);
    let change = meta
        .regular_market_change
        .or_else(|| prev_close.map(|p| price - p))
        .unwrap_or(0.0);
    let change_percent = meta
        .regular_market_change_percent
        .or_else(|| {
            prev_close.and_then(|p| {
                if p.abs() < f64::EPSILON {
                    None
                } else {
                    Some((price - p) / p * 100.0)
                }
            })
        })
        .unwrap_or(0.0);

    let currency = meta.currency.unwrap_or_else(|| {
        if symbol.ends_with(".TW") {
            "TWD".to_string()
        } else {
            "USD".to_string()
        }
    });

    let time = meta
        .regular_market_time
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    Ok(Quote {
        symbol: symbol.to_string(),
        original_symbol: symbol.to_string(),
        price,
        change,
        change_percent,
        currency,
        exchange_name: meta.exchange_name.unwrap_or_default(),
        time,
        simulated: false,
    })
}

#[async_trait]
impl QuoteProvider for YahooChartProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let url = chart_url(&self.base_url, symbol);
        debug!(provider = %self.name, %symbol, "fetching quote");
        let resp = fetch_chart(&self.client, &url, &self.base_url).await?;
        quote_from_chart(resp, symbol, &self.base_url)
    }
}
