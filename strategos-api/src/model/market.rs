use serde::{Deserialize, Serialize};

/// Categorical market-research label for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Bullish,
    Neutral,
    Bearish,
}

impl Sentiment {
    /// The entry-signal condition of the strategy engine.
    pub fn is_positive(&self) -> bool {
        matches!(self, Sentiment::Bullish)
    }
}

/// A single observed price at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    timestamp: i64,
    price: f64,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn price(&self) -> f64 {
        self.price
    }
}

/// An ordered, bounded window of recent prices for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    /// Fixed-length series of a constant placeholder price, ending at
    /// `end_timestamp` with `step_secs` between points. Used as the
    /// degraded output when a data source is unreachable.
    pub fn constant(len: usize, price: f64, end_timestamp: i64, step_secs: i64) -> Self {
        let points = (0..len)
            .map(|i| {
                let offset = (len as i64 - 1 - i as i64) * step_secs;
                PricePoint::new(end_timestamp - offset, price)
            })
            .collect();
        Self { points }
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.points.iter()
    }
}
