use async_trait::async_trait;

use crate::{Candle, Result, Signal, SignalRecord};

/// Read-only access to exchange market data.
///
/// `BinanceFuturesClient` implements this against the USDT-M futures REST API.
/// Implementations must return candles oldest first and must bound every
/// network call with a timeout.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetch up to `limit` candles of `interval` (e.g. "1m", "5m") for `symbol`.
    async fn fetch_candles(&self, symbol: &str, interval: &str, limit: usize) -> Result<Vec<Candle>>;

    /// Latest funding rate for a perpetual contract, as a fraction.
    async fn fetch_funding_rate(&self, symbol: &str) -> Result<f64>;

    /// Symbols eligible for scanning.
    async fn list_tradable_symbols(&self) -> Result<Vec<String>>;
}

/// Delivers human-readable alert text.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<()>;
}

/// Append-only log of emitted signals.
#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn append(&self, signal: &Signal) -> Result<()>;

    /// Most recent records, newest first.
    async fn recent(&self, limit: i64) -> Result<Vec<SignalRecord>>;
}
