use thiserror::Error;

/// Unified error type for the entire invest-tracker-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    /// No response at all (DNS failure, refused connection, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The server responded, but with a non-success status.
    #[error("HTTP error from {endpoint}: status {status}")]
    HttpStatus { endpoint: String, status: u16 },

    /// The response body didn't have the shape we expect.
    #[error("Malformed payload from {endpoint}: {message}")]
    MalformedPayload { endpoint: String, message: String },

    /// A 2xx response carrying an application-level error
    /// (e.g., Yahoo's `chart.error` object for an unknown symbol).
    #[error("Quote API error for {symbol}: {message}")]
    QuoteApi { symbol: String, message: String },

    /// Every endpoint in the fallback chain failed.
    #[error("All quote endpoints failed for {symbol}: {last_error}")]
    EndpointsExhausted { symbol: String, last_error: String },

    // ── Storage ─────────────────────────────────────────────────────
    #[error("Storage I/O error: {0}")]
    StorageIO(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::StorageIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs. Proxy
        // URLs embed the full target URL (with its cache-busting params)
        // in the query string, which makes raw reqwest errors very noisy.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
