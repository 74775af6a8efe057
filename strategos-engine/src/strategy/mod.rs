//! The per-symbol decision loop.
//!
//! Each cycle evaluates every tracked symbol once: gather research,
//! propose a trade, pass it through the risk gate, execute, record.
//! Symbol evaluations run concurrently; the ledger is the only shared
//! mutable resource and all writes serialize on its mutex.

use crate::config::{RiskPolicy, StrategyConfig};
use crate::ledger::{Holding, PortfolioLedger, PortfolioState};
use crate::risk_gate::{RiskContext, RiskDecision, RiskGate};
use chrono::Utc;
use futures::future::join_all;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strategos_api::{
    ExecutionGateway, MarketDataSource, PlacementOutcome, Side, Symbol, TradeIntent, TradeRecord,
};
use tokio::sync::Mutex;
use tokio::time::timeout;

/// What happened to one symbol (or one externally supplied intent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TradeOutcome {
    /// Order placed and recorded in the ledger.
    Executed { side: Side, value: f64 },
    /// The risk gate or the ledger turned the trade down.
    Rejected { reason: String },
    /// The exchange rejected the order or the call timed out. The ledger
    /// is never touched in this case.
    ExecutionFailed { reason: String },
    /// No signal this cycle.
    NoAction,
    /// Unpriceable symbol or sub-minimum sizing; not an error.
    Skipped { reason: String },
}

/// Outcome of one full pass across the tracked symbol set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub outcomes: Vec<(Symbol, TradeOutcome)>,
}

impl CycleReport {
    pub fn executed(&self) -> usize {
        self.count(|o| matches!(o, TradeOutcome::Executed { .. }))
    }

    pub fn rejected(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                TradeOutcome::Rejected { .. } | TradeOutcome::ExecutionFailed { .. }
            )
        })
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TradeOutcome::Skipped { .. }))
    }

    fn count(&self, predicate: impl Fn(&TradeOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }
}

pub struct StrategyEngine {
    symbols: Vec<Symbol>,
    config: Arc<StrategyConfig>,
    policy: Arc<RiskPolicy>,
    risk_gate: Arc<RiskGate>,
    market: Arc<dyn MarketDataSource>,
    gateway: Arc<dyn ExecutionGateway>,
    ledger: Arc<Mutex<PortfolioLedger>>,
}

impl StrategyEngine {
    pub fn new(
        symbols: Vec<Symbol>,
        config: StrategyConfig,
        policy: RiskPolicy,
        risk_gate: Arc<RiskGate>,
        market: Arc<dyn MarketDataSource>,
        gateway: Arc<dyn ExecutionGateway>,
        ledger: Arc<Mutex<PortfolioLedger>>,
    ) -> Self {
        Self {
            symbols,
            config: Arc::new(config),
            policy: Arc::new(policy),
            risk_gate,
            market,
            gateway,
            ledger,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// One decision cycle across the tracked symbol set.
    ///
    /// Each symbol is evaluated in its own task; a symbol's trade is
    /// atomic from the ledger's perspective, but the cycle as a whole is
    /// not. Callers drive cycles sequentially: this future resolves only
    /// once every symbol's task has finished.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut handles = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            let eval = self.evaluation_for(symbol.clone());
            handles.push(tokio::spawn(async move {
                let outcome = eval.run().await;
                (eval.symbol, outcome)
            }));
        }

        let mut report = CycleReport::default();
        for result in join_all(handles).await {
            match result {
                Ok((symbol, outcome)) => report.outcomes.push((symbol, outcome)),
                // A failed task loses that symbol for the cycle; the rest
                // of the set is unaffected.
                Err(e) => error!("symbol evaluation task failed: {}", e),
            }
        }
        info!(
            "cycle complete: {} executed, {} rejected, {} skipped of {} symbols",
            report.executed(),
            report.rejected(),
            report.skipped(),
            self.symbols.len()
        );
        report
    }

    /// Direct execution path for an externally produced intent: risk
    /// gate, then gateway, then ledger.
    pub async fn execute_intent(&self, intent: TradeIntent) -> TradeOutcome {
        let eval = self.evaluation_for(intent.symbol().clone());
        let state = self.ledger.lock().await.state();
        eval.submit(intent, &state).await
    }

    fn evaluation_for(&self, symbol: Symbol) -> SymbolEvaluation {
        SymbolEvaluation {
            symbol,
            config: self.config.clone(),
            policy: self.policy.clone(),
            risk_gate: self.risk_gate.clone(),
            market: self.market.clone(),
            gateway: self.gateway.clone(),
            ledger: self.ledger.clone(),
        }
    }
}

/// Everything one symbol's task needs, cloned out of the engine so the
/// task is `'static`.
struct SymbolEvaluation {
    symbol: Symbol,
    config: Arc<StrategyConfig>,
    policy: Arc<RiskPolicy>,
    risk_gate: Arc<RiskGate>,
    market: Arc<dyn MarketDataSource>,
    gateway: Arc<dyn ExecutionGateway>,
    ledger: Arc<Mutex<PortfolioLedger>>,
}

impl SymbolEvaluation {
    async fn run(&self) -> TradeOutcome {
        // One-way transition per cycle: the position is read once and the
        // symbol either enters, exits, or does nothing.
        let state = self.ledger.lock().await.state();
        match state.holding(&self.symbol).cloned() {
            Some(holding) => self.evaluate_exit(holding, &state).await,
            None => self.evaluate_entry(&state).await,
        }
    }

    async fn evaluate_entry(&self, state: &PortfolioState) -> TradeOutcome {
        let sentiment = match timeout(
            self.config.call_timeout(),
            self.market.sentiment(&self.symbol),
        )
        .await
        {
            Ok(Ok(sentiment)) => sentiment,
            Ok(Err(e)) => {
                warn!("no sentiment for {}: {}", self.symbol, e);
                return TradeOutcome::Skipped {
                    reason: "sentiment unavailable".to_string(),
                };
            }
            Err(_) => {
                warn!("sentiment fetch for {} timed out", self.symbol);
                return TradeOutcome::Skipped {
                    reason: "sentiment fetch timed out".to_string(),
                };
            }
        };
        if !sentiment.is_positive() {
            return TradeOutcome::NoAction;
        }

        let prices = match timeout(
            self.config.call_timeout(),
            self.market.latest_prices(&self.symbol),
        )
        .await
        {
            Ok(Ok(series)) => series,
            Ok(Err(e)) => {
                warn!("no price history for {}: {}", self.symbol, e);
                return TradeOutcome::Skipped {
                    reason: "price history unavailable".to_string(),
                };
            }
            Err(_) => {
                warn!("price fetch for {} timed out", self.symbol);
                return TradeOutcome::Skipped {
                    reason: "price fetch timed out".to_string(),
                };
            }
        };
        if prices.latest().map(|p| p.price()).unwrap_or(0.0) <= 0.0 {
            return TradeOutcome::Skipped {
                reason: "empty price history".to_string(),
            };
        }

        let Some(ticker) = self.fetch_ticker().await else {
            return TradeOutcome::Skipped {
                reason: "symbol unpriceable this cycle".to_string(),
            };
        };

        let max_trade_value = (state.cash * self.config.allocation_fraction)
            .min(state.cash * self.config.risk_ceiling);
        if max_trade_value < self.policy.min_trade_size {
            return TradeOutcome::Skipped {
                reason: format!(
                    "sized {:.2}, below exchange minimum {:.2}",
                    max_trade_value, self.policy.min_trade_size
                ),
            };
        }

        let quantity = max_trade_value / ticker;
        let intent = TradeIntent::new(self.symbol.clone(), Side::Buy, quantity, max_trade_value);
        self.submit(intent, state).await
    }

    async fn evaluate_exit(&self, holding: Holding, state: &PortfolioState) -> TradeOutcome {
        let Some(ticker) = self.fetch_ticker().await else {
            return TradeOutcome::Skipped {
                reason: "symbol unpriceable this cycle".to_string(),
            };
        };

        let market_value = holding.quantity * ticker;
        if holding.cost_basis <= 0.0 {
            return TradeOutcome::NoAction;
        }
        let gain = (market_value - holding.cost_basis) / holding.cost_basis;
        if gain < self.config.profit_take_threshold {
            return TradeOutcome::NoAction;
        }

        info!(
            "{} up {:.1}%, liquidating full position of {}",
            self.symbol,
            gain * 100.0,
            holding.quantity
        );
        // Full liquidation only; no partial exits.
        let intent = TradeIntent::new(
            self.symbol.clone(),
            Side::Sell,
            holding.quantity,
            market_value,
        );
        self.submit(intent, state).await
    }

    async fn fetch_ticker(&self) -> Option<f64> {
        match timeout(self.config.call_timeout(), self.gateway.ticker(&self.symbol)).await {
            Ok(Some(price)) if price > 0.0 => Some(price),
            Ok(_) => None,
            Err(_) => {
                warn!("ticker fetch for {} timed out", self.symbol);
                None
            }
        }
    }

    /// Risk gate, then gateway, then ledger. The ledger is touched only
    /// after the exchange confirms (write-after-success-only).
    async fn submit(&self, intent: TradeIntent, state: &PortfolioState) -> TradeOutcome {
        let ctx = RiskContext {
            state,
            policy: self.policy.as_ref(),
        };
        if let RiskDecision::Rejected(reason) = self.risk_gate.validate_trade(&intent, &ctx) {
            return TradeOutcome::Rejected { reason };
        }

        let outcome = match timeout(
            self.config.call_timeout(),
            self.gateway.place_order(&intent),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("order placement for {} timed out", self.symbol);
                return TradeOutcome::ExecutionFailed {
                    reason: "order placement timed out".to_string(),
                };
            }
        };

        match outcome {
            PlacementOutcome::Placed { order_id } => {
                let side = intent.side();
                let value = intent.value();
                let record =
                    TradeRecord::from_fill(intent, order_id, Utc::now().timestamp_millis());
                // The gate ran against the cycle snapshot; the ledger
                // re-validates under its own lock, which is the
                // authoritative check when symbols race for the same cash.
                let mut ledger = self.ledger.lock().await;
                match ledger.record_trade(&record) {
                    Ok(()) => {
                        info!(
                            "recorded {:?} {} for {:.2} (order {})",
                            side, self.symbol, value, order_id
                        );
                        TradeOutcome::Executed { side, value }
                    }
                    Err(rejection) => TradeOutcome::Rejected {
                        reason: rejection.to_string(),
                    },
                }
            }
            PlacementOutcome::Rejected { reason } => {
                warn!("exchange rejected {}: {}", self.symbol, reason);
                TradeOutcome::ExecutionFailed { reason }
            }
        }
    }
}

#[cfg(test)]
mod tests;
