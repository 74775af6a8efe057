//! The portfolio ledger: authoritative record of cash and holdings.
//!
//! `record_trade` is the single write path of the whole pipeline. Every
//! other component reads snapshots. Rejections leave state untouched and
//! come back as typed values, never panics.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strategos_api::{Side, Symbol, TradeDefect, TradeRecord};
use thiserror::Error;
use uuid::Uuid;

/// Residual quantity below which a holding is considered closed. Absorbs
/// floating-point error on full liquidations.
pub const POSITION_EPSILON: f64 = 1e-9;

/// A single symbol's holding, carried at weighted-average cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub quantity: f64,
    /// Total quote-currency cost of the position.
    pub cost_basis: f64,
    pub avg_price: f64,
}

/// Read-only snapshot of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub cash: f64,
    pub holdings: HashMap<Symbol, Holding>,
    /// `cash` plus the cost basis of every holding.
    pub total_value: f64,
}

impl PortfolioState {
    pub fn holding(&self, symbol: &Symbol) -> Option<&Holding> {
        self.holdings.get(symbol)
    }

    pub fn has_position(&self, symbol: &Symbol) -> bool {
        self.holdings.contains_key(symbol)
    }

    pub fn open_positions(&self) -> usize {
        self.holdings.len()
    }
}

/// Entry in the append-only trade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTrade {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: f64,
    pub value: f64,
    pub order_id: Uuid,
    /// Zero for buys; `value - avg_price * quantity` for sells.
    pub realized_pnl: f64,
    pub timestamp: i64,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TradeRejection {
    #[error("malformed trade: {0}")]
    Malformed(#[from] TradeDefect),
    #[error("insufficient cash: need {required:.2}, have {available:.2}")]
    InsufficientCash { required: f64, available: f64 },
    #[error("no open position in {0}")]
    UnknownHolding(Symbol),
    #[error("sell of {requested} exceeds held {held} for {symbol}")]
    Oversell {
        symbol: Symbol,
        requested: f64,
        held: f64,
    },
}

/// Authoritative record of cash and asset holdings.
#[derive(Debug, Default)]
pub struct PortfolioLedger {
    cash: f64,
    holdings: HashMap<Symbol, Holding>,
    history: Vec<CompletedTrade>,
}

impl PortfolioLedger {
    pub fn new(starting_cash: f64) -> Self {
        Self {
            cash: starting_cash,
            holdings: HashMap::new(),
            history: Vec::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn state(&self) -> PortfolioState {
        let total_value = self.cash
            + self
                .holdings
                .values()
                .map(|holding| holding.cost_basis)
                .sum::<f64>();
        PortfolioState {
            cash: self.cash,
            holdings: self.holdings.clone(),
            total_value,
        }
    }

    /// Timestamp-ordered record of every trade the ledger accepted.
    pub fn history(&self) -> &[CompletedTrade] {
        &self.history
    }

    /// Applies an executed trade to cash and holdings.
    ///
    /// Preconditions are checked before any mutation; a violated one is a
    /// non-fatal rejection and the state is unchanged.
    pub fn record_trade(&mut self, trade: &TradeRecord) -> Result<(), TradeRejection> {
        let result = match trade.validate() {
            Err(defect) => Err(TradeRejection::from(defect)),
            Ok(()) => match trade.side() {
                Side::Buy => self.record_buy(trade),
                Side::Sell => self.record_sell(trade),
            },
        };

        if let Err(ref rejection) = result {
            warn!(
                "ledger rejected {:?} {} (qty {}, value {:.2}): {}",
                trade.side(),
                trade.symbol(),
                trade.quantity(),
                trade.value(),
                rejection
            );
        }
        result
    }

    fn record_buy(&mut self, trade: &TradeRecord) -> Result<(), TradeRejection> {
        if trade.value() > self.cash {
            return Err(TradeRejection::InsufficientCash {
                required: trade.value(),
                available: self.cash,
            });
        }

        self.cash -= trade.value();
        let holding = self.holdings.entry(trade.symbol().clone()).or_insert(Holding {
            quantity: 0.0,
            cost_basis: 0.0,
            avg_price: 0.0,
        });
        holding.quantity += trade.quantity();
        holding.cost_basis += trade.value();
        holding.avg_price = holding.cost_basis / holding.quantity;

        self.push_history(trade, 0.0);
        Ok(())
    }

    fn record_sell(&mut self, trade: &TradeRecord) -> Result<(), TradeRejection> {
        let holding = match self.holdings.get_mut(trade.symbol()) {
            Some(h) => h,
            None => return Err(TradeRejection::UnknownHolding(trade.symbol().clone())),
        };
        if trade.quantity() > holding.quantity + POSITION_EPSILON {
            return Err(TradeRejection::Oversell {
                symbol: trade.symbol().clone(),
                requested: trade.quantity(),
                held: holding.quantity,
            });
        }

        let realized_pnl = trade.value() - holding.avg_price * trade.quantity();

        self.cash += trade.value();
        holding.quantity -= trade.quantity();
        holding.cost_basis -= holding.avg_price * trade.quantity();
        if holding.quantity <= POSITION_EPSILON {
            self.holdings.remove(trade.symbol());
        }

        self.push_history(trade, realized_pnl);
        Ok(())
    }

    fn push_history(&mut self, trade: &TradeRecord, realized_pnl: f64) {
        self.history.push(CompletedTrade {
            symbol: trade.symbol().clone(),
            side: trade.side(),
            quantity: trade.quantity(),
            value: trade.value(),
            order_id: trade.order_id(),
            realized_pnl,
            timestamp: trade.timestamp(),
        });
    }
}
