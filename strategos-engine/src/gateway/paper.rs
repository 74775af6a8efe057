use async_trait::async_trait;
use log::info;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use strategos_api::{ExecutionGateway, PlacementOutcome, Symbol, TradeIntent};
use uuid::Uuid;

/// In-process stand-in for a real exchange: fills market orders at the
/// posted ticker price. No fees, no slippage, no partial fills.
#[derive(Default)]
pub struct PaperGateway {
    tickers: RwLock<HashMap<Symbol, f64>>,
    rejecting: RwLock<HashSet<Symbol>>,
}

impl PaperGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ticker(&self, symbol: Symbol, price: f64) {
        self.tickers.write().unwrap().insert(symbol, price);
    }

    pub fn clear_ticker(&self, symbol: &Symbol) {
        self.tickers.write().unwrap().remove(symbol);
    }

    /// Forces subsequent orders for `symbol` to be rejected, to exercise
    /// the exchange-failure path.
    pub fn set_rejecting(&self, symbol: Symbol, rejecting: bool) {
        let mut set = self.rejecting.write().unwrap();
        if rejecting {
            set.insert(symbol);
        } else {
            set.remove(&symbol);
        }
    }
}

#[async_trait]
impl ExecutionGateway for PaperGateway {
    async fn place_order(&self, intent: &TradeIntent) -> PlacementOutcome {
        if self.rejecting.read().unwrap().contains(intent.symbol()) {
            return PlacementOutcome::Rejected {
                reason: format!("exchange rejected order for {}", intent.symbol()),
            };
        }
        if !self
            .tickers
            .read()
            .unwrap()
            .contains_key(intent.symbol())
        {
            return PlacementOutcome::Rejected {
                reason: format!("no market for {}", intent.symbol()),
            };
        }

        let order_id = Uuid::new_v4();
        info!(
            "paper fill {}: {:?} {} qty {} value {:.2}",
            order_id,
            intent.side(),
            intent.symbol(),
            intent.quantity(),
            intent.value()
        );
        PlacementOutcome::Placed { order_id }
    }

    async fn ticker(&self, symbol: &Symbol) -> Option<f64> {
        self.tickers.read().unwrap().get(symbol).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strategos_api::Side;

    fn btc() -> Symbol {
        Symbol::new("BTC", "USD")
    }

    #[tokio::test]
    async fn fills_when_a_ticker_is_posted() {
        let gateway = PaperGateway::new();
        gateway.set_ticker(btc(), 66_000.0);

        let intent = TradeIntent::new(btc(), Side::Buy, 0.001, 66.0);
        assert!(gateway.place_order(&intent).await.is_placed());
        assert_eq!(gateway.ticker(&btc()).await, Some(66_000.0));
    }

    #[tokio::test]
    async fn rejects_without_a_market() {
        let gateway = PaperGateway::new();
        let intent = TradeIntent::new(btc(), Side::Buy, 0.001, 66.0);

        match gateway.place_order(&intent).await {
            PlacementOutcome::Rejected { reason } => assert!(reason.contains("no market")),
            PlacementOutcome::Placed { .. } => panic!("no ticker was posted"),
        }
        assert_eq!(gateway.ticker(&btc()).await, None);
    }

    #[tokio::test]
    async fn rejection_injection_is_reversible() {
        let gateway = PaperGateway::new();
        gateway.set_ticker(btc(), 66_000.0);
        gateway.set_rejecting(btc(), true);

        let intent = TradeIntent::new(btc(), Side::Buy, 0.001, 66.0);
        assert!(!gateway.place_order(&intent).await.is_placed());

        gateway.set_rejecting(btc(), false);
        assert!(gateway.place_order(&intent).await.is_placed());
    }
}
