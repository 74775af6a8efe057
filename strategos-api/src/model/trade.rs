use super::symbol::Symbol;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TradeDefect {
    #[error("quantity must be a positive finite number, got {0}")]
    Quantity(f64),
    #[error("value must be a positive finite number, got {0}")]
    Value(f64),
}

fn check_positive_finite(n: f64) -> bool {
    n.is_finite() && n > 0.0
}

/// A candidate trade produced by the strategy engine.
///
/// Ephemeral: an intent only becomes a `TradeRecord` once the execution
/// gateway confirms placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    symbol: Symbol,
    side: Side,
    quantity: f64,
    /// Quote-currency amount of the trade.
    value: f64,
}

impl TradeIntent {
    pub fn new(symbol: Symbol, side: Side, quantity: f64, value: f64) -> Self {
        Self {
            symbol,
            side,
            quantity,
            value,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Numeric fields must be finite and positive before an intent may
    /// reach the risk gate or the ledger.
    pub fn validate(&self) -> Result<(), TradeDefect> {
        if !check_positive_finite(self.quantity) {
            return Err(TradeDefect::Quantity(self.quantity));
        }
        if !check_positive_finite(self.value) {
            return Err(TradeDefect::Value(self.value));
        }
        Ok(())
    }
}

/// An executed trade: the intent plus the exchange confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    symbol: Symbol,
    side: Side,
    quantity: f64,
    value: f64,
    order_id: Uuid,
    timestamp: i64,
}

impl TradeRecord {
    pub fn from_fill(intent: TradeIntent, order_id: Uuid, timestamp: i64) -> Self {
        Self {
            symbol: intent.symbol,
            side: intent.side,
            quantity: intent.quantity,
            value: intent.value,
            order_id,
            timestamp,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn validate(&self) -> Result<(), TradeDefect> {
        if !check_positive_finite(self.quantity) {
            return Err(TradeDefect::Quantity(self.quantity));
        }
        if !check_positive_finite(self.value) {
            return Err(TradeDefect::Value(self.value));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btc() -> Symbol {
        Symbol::new("BTC", "USD")
    }

    #[test]
    fn well_formed_intent_passes() {
        let intent = TradeIntent::new(btc(), Side::Buy, 0.00003, 2.0);
        assert!(intent.validate().is_ok());
    }

    #[test]
    fn rejects_non_finite_and_non_positive_fields() {
        let cases = [
            TradeIntent::new(btc(), Side::Buy, f64::NAN, 2.0),
            TradeIntent::new(btc(), Side::Buy, 0.0, 2.0),
            TradeIntent::new(btc(), Side::Buy, -1.0, 2.0),
            TradeIntent::new(btc(), Side::Sell, 1.0, f64::INFINITY),
            TradeIntent::new(btc(), Side::Sell, 1.0, 0.0),
        ];
        for intent in cases {
            assert!(intent.validate().is_err(), "{:?} should be rejected", intent);
        }
    }

    #[test]
    fn record_carries_fill_details() {
        let id = Uuid::new_v4();
        let record = TradeRecord::from_fill(
            TradeIntent::new(btc(), Side::Sell, 0.5, 100.0),
            id,
            1_700_000_000_000,
        );
        assert_eq!(record.order_id(), id);
        assert_eq!(record.side(), Side::Sell);
        assert!(record.validate().is_ok());
    }
}
