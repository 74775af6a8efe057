use super::{LOOKBACK_POINTS, LOOKBACK_STEP_SECS};
use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use std::sync::Arc;
use std::time::Duration;
use strategos_api::{MarketDataError, MarketDataSource, PriceSeries, Sentiment, Symbol};
use tokio::time::timeout;

/// Wraps any feed and masks failures with degraded-but-usable data: a
/// constant placeholder series and neutral sentiment.
///
/// The pipeline keeps running through transient data-source outages at
/// the cost of a flat signal. A call exceeding `call_timeout` counts as
/// a failure.
pub struct ResilientFeed {
    inner: Arc<dyn MarketDataSource>,
    fallback_price: f64,
    call_timeout: Duration,
}

impl ResilientFeed {
    pub fn new(inner: Arc<dyn MarketDataSource>, fallback_price: f64, call_timeout: Duration) -> Self {
        Self {
            inner,
            fallback_price,
            call_timeout,
        }
    }

    fn fallback_series(&self) -> PriceSeries {
        PriceSeries::constant(
            LOOKBACK_POINTS,
            self.fallback_price,
            Utc::now().timestamp(),
            LOOKBACK_STEP_SECS,
        )
    }
}

#[async_trait]
impl MarketDataSource for ResilientFeed {
    async fn sentiment(&self, symbol: &Symbol) -> Result<Sentiment, MarketDataError> {
        match timeout(self.call_timeout, self.inner.sentiment(symbol)).await {
            Ok(Ok(sentiment)) => Ok(sentiment),
            Ok(Err(e)) => {
                warn!("sentiment fetch failed for {}: {}; treating as neutral", symbol, e);
                Ok(Sentiment::Neutral)
            }
            Err(_) => {
                warn!("sentiment fetch for {} timed out; treating as neutral", symbol);
                Ok(Sentiment::Neutral)
            }
        }
    }

    async fn latest_prices(&self, symbol: &Symbol) -> Result<PriceSeries, MarketDataError> {
        match timeout(self.call_timeout, self.inner.latest_prices(symbol)).await {
            Ok(Ok(series)) => Ok(series),
            Ok(Err(e)) => {
                warn!("price fetch failed for {}: {}; serving flat fallback series", symbol, e);
                Ok(self.fallback_series())
            }
            Err(_) => {
                warn!("price fetch for {} timed out; serving flat fallback series", symbol);
                Ok(self.fallback_series())
            }
        }
    }
}
