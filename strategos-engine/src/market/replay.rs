use super::LOOKBACK_STEP_SECS;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use strategos_api::{
    MarketDataError, MarketDataSource, PricePoint, PriceSeries, Sentiment, Symbol,
};

/// Scripted feed for tests and demos: a fixed sentiment and price tape
/// per symbol, with switchable failure injection.
#[derive(Default)]
pub struct ReplayFeed {
    sentiment: HashMap<Symbol, Sentiment>,
    tapes: HashMap<Symbol, Vec<f64>>,
    failing: RwLock<HashSet<Symbol>>,
}

impl ReplayFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sentiment(mut self, symbol: Symbol, sentiment: Sentiment) -> Self {
        self.sentiment.insert(symbol, sentiment);
        self
    }

    /// Price tape, oldest first; the last point is the current price.
    pub fn with_tape(mut self, symbol: Symbol, tape: Vec<f64>) -> Self {
        self.tapes.insert(symbol, tape);
        self
    }

    /// Makes subsequent fetches for `symbol` fail, to exercise the
    /// degradation path.
    pub fn set_failing(&self, symbol: Symbol, failing: bool) {
        let mut set = self.failing.write().unwrap();
        if failing {
            set.insert(symbol);
        } else {
            set.remove(&symbol);
        }
    }

    fn check_available(&self, symbol: &Symbol) -> Result<(), MarketDataError> {
        if self.failing.read().unwrap().contains(symbol) {
            return Err(MarketDataError::Unavailable {
                symbol: symbol.clone(),
                reason: "injected outage".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataSource for ReplayFeed {
    async fn sentiment(&self, symbol: &Symbol) -> Result<Sentiment, MarketDataError> {
        self.check_available(symbol)?;
        Ok(self
            .sentiment
            .get(symbol)
            .copied()
            .unwrap_or(Sentiment::Neutral))
    }

    async fn latest_prices(&self, symbol: &Symbol) -> Result<PriceSeries, MarketDataError> {
        self.check_available(symbol)?;
        let tape = self
            .tapes
            .get(symbol)
            .ok_or_else(|| MarketDataError::Unavailable {
                symbol: symbol.clone(),
                reason: "no tape configured".to_string(),
            })?;

        let end = Utc::now().timestamp();
        let points = tape
            .iter()
            .enumerate()
            .map(|(i, price)| {
                let offset = (tape.len() as i64 - 1 - i as i64) * LOOKBACK_STEP_SECS;
                PricePoint::new(end - offset, *price)
            })
            .collect();
        Ok(PriceSeries::new(points))
    }
}
