//! Defines the `ExecutionGateway` trait, the boundary to a real exchange.
//!
//! The pipeline depends only on this two-method contract; the wire
//! protocol behind it (REST, authentication, rate limits) belongs to the
//! implementing adapter.

use crate::model::execution::PlacementOutcome;
use crate::model::symbol::Symbol;
use crate::model::trade::TradeIntent;
use async_trait::async_trait;

/// Interface for sending approved orders to a market (real or paper).
#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    /// Submits an order. A `Rejected` outcome is a normal business result;
    /// the ledger must never be touched for a rejected placement.
    async fn place_order(&self, intent: &TradeIntent) -> PlacementOutcome;

    /// Current price for the symbol, or `None` when the symbol is
    /// temporarily unpriceable. Callers skip the symbol for the cycle
    /// instead of trading on a stale value.
    async fn ticker(&self, symbol: &Symbol) -> Option<f64>;
}
