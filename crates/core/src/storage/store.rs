use tracing::warn;
use uuid::Uuid;

use super::backend::KeyValueStore;
use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::rate::RateCache;
use crate::models::realized::RealizedTrade;

/// Storage key for the holdings collection.
pub const STOCKS_KEY: &str = "investment-tracker-stocks";
/// Storage key for the realized-trades collection.
pub const REALIZED_KEY: &str = "investment-tracker-realized";
/// Storage key for the persisted exchange-rate cache.
pub const RATE_KEY: &str = "investment-tracker-exchange-rate";

/// Persistence façade over the two record collections and the
/// exchange-rate cache, generic over the key-value backend.
///
/// Reads prioritize availability: an absent key or unparseable value
/// yields an empty collection, never an error. Every mutation rewrites
/// the full collection JSON under its key. Records are addressed by
/// their `Uuid`; an unknown id is an explicit `RecordNotFound`, and the
/// stored collection is left untouched.
pub struct LocalStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> LocalStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// All stored holdings; empty on absence or corruption.
    #[must_use]
    pub fn holdings(&self) -> Vec<Holding> {
        self.read_collection(STOCKS_KEY)
    }

    /// Replace the whole holdings collection.
    pub fn set_holdings(&mut self, holdings: &[Holding]) -> Result<(), CoreError> {
        self.write_collection(STOCKS_KEY, holdings)
    }

    pub fn add_holding(&mut self, holding: Holding) -> Result<(), CoreError> {
        let mut holdings = self.holdings();
        holdings.push(holding);
        self.write_collection(STOCKS_KEY, &holdings)
    }

    /// Replace the holding with `id`. The stored record keeps its id.
    pub fn update_holding(&mut self, id: Uuid, mut updated: Holding) -> Result<(), CoreError> {
        let mut holdings = self.holdings();
        let slot = holdings
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| CoreError::RecordNotFound(format!("holding {id}")))?;
        updated.id = id;
        *slot = updated;
        self.write_collection(STOCKS_KEY, &holdings)
    }

    pub fn delete_holding(&mut self, id: Uuid) -> Result<(), CoreError> {
        let mut holdings = self.holdings();
        let before = holdings.len();
        holdings.retain(|h| h.id != id);
        if holdings.len() == before {
            return Err(CoreError::RecordNotFound(format!("holding {id}")));
        }
        self.write_collection(STOCKS_KEY, &holdings)
    }

    // ── Realized trades ─────────────────────────────────────────────

    /// All stored realized trades; empty on absence or corruption.
    #[must_use]
    pub fn realized_trades(&self) -> Vec<RealizedTrade> {
        self.read_collection(REALIZED_KEY)
    }

    /// Replace the whole realized-trades collection.
    pub fn set_realized_trades(&mut self, trades: &[RealizedTrade]) -> Result<(), CoreError> {
        self.write_collection(REALIZED_KEY, trades)
    }

    pub fn add_realized_trade(&mut self, trade: RealizedTrade) -> Result<(), CoreError> {
        let mut trades = self.realized_trades();
        trades.push(trade);
        self.write_collection(REALIZED_KEY, &trades)
    }

    pub fn update_realized_trade(
        &mut self,
        id: Uuid,
        mut updated: RealizedTrade,
    ) -> Result<(), CoreError> {
        let mut trades = self.realized_trades();
        let slot = trades
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::RecordNotFound(format!("realized trade {id}")))?;
        updated.id = id;
        *slot = updated;
        self.write_collection(REALIZED_KEY, &trades)
    }

    pub fn delete_realized_trade(&mut self, id: Uuid) -> Result<(), CoreError> {
        let mut trades = self.realized_trades();
        let before = trades.len();
        trades.retain(|t| t.id != id);
        if trades.len() == before {
            return Err(CoreError::RecordNotFound(format!("realized trade {id}")));
        }
        self.write_collection(REALIZED_KEY, &trades)
    }

    // ── Exchange-rate cache ─────────────────────────────────────────

    /// The persisted rate cache, if present and parseable.
    #[must_use]
    pub fn load_rate_cache(&self) -> Option<RateCache> {
        let raw = self.backend.get(RATE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!(key = RATE_KEY, error = %e, "discarding corrupt rate cache");
                None
            }
        }
    }

    pub fn save_rate_cache(&mut self, cache: &RateCache) -> Result<(), CoreError> {
        let json = serde_json::to_string(cache)?;
        self.backend.set(RATE_KEY, &json)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn read_collection<T: serde::de::DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(raw) = self.backend.get(key) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(key, error = %e, "unreadable collection, treating as empty");
                Vec::new()
            }
        }
    }

    fn write_collection<T: serde::Serialize>(
        &mut self,
        key: &str,
        records: &[T],
    ) -> Result<(), CoreError> {
        let json = serde_json::to_string(records)?;
        self.backend.set(key, &json)
    }
}
