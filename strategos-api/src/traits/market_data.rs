//! Defines the `MarketDataSource` trait for market research inputs.
//!
//! This module specifies the contract all data-source adapters must
//! implement. It lets the pipeline abstract over different providers
//! (live HTTP feeds, replay tapes, synthetic generators) while handing
//! strategies a consistent view of sentiment and recent prices.

use crate::model::market::{PriceSeries, Sentiment};
use crate::model::symbol::Symbol;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("market data unavailable for {symbol}: {reason}")]
    Unavailable { symbol: Symbol, reason: String },
    #[error("market data request for {symbol} timed out")]
    Timeout { symbol: Symbol },
}

/// A component that produces market research for a symbol.
///
/// Implementations must not block indefinitely; callers apply a bounded
/// timeout and treat expiry as a fetch failure. Transient failures are
/// expected and are masked downstream with a flat fallback series rather
/// than halting the cycle.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Current sentiment label for the symbol.
    async fn sentiment(&self, symbol: &Symbol) -> Result<Sentiment, MarketDataError>;

    /// The most recent price points for the symbol, oldest first, over a
    /// bounded lookback window (e.g. hourly for 24h).
    async fn latest_prices(&self, symbol: &Symbol) -> Result<PriceSeries, MarketDataError>;
}
