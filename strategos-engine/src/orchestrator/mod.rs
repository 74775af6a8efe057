//! Wires the pipeline into a running instance.
//!
//! Boot follows a hard dependency order: ledger, execution gateway,
//! market data source, risk gate, strategy engine, capital allocator,
//! adaptation reviewer. A configuration defect aborts the boot; running
//! a half-wired pipeline risks silent corruption, so this is the one
//! category of failure treated as fatal.

use crate::allocator::{AllocationReport, CapitalAllocator};
use crate::config::{BootConfig, RiskPolicy};
use crate::ledger::{CompletedTrade, PortfolioLedger, PortfolioState};
use crate::market::ResilientFeed;
use crate::reviewer::{AdaptationReview, AdaptationReviewer};
use crate::risk_gate::{RiskContext, RiskDecision, RiskGate};
use crate::strategy::{CycleReport, StrategyEngine, TradeOutcome};
use anyhow::Context;
use log::info;
use std::sync::Arc;
use strategos_api::{ExecutionGateway, MarketDataSource, TradeIntent};
use tokio::sync::Mutex;

pub struct Orchestrator {
    ledger: Arc<Mutex<PortfolioLedger>>,
    risk_gate: Arc<RiskGate>,
    policy: RiskPolicy,
    strategy: StrategyEngine,
    allocator: CapitalAllocator,
    reviewer: AdaptationReviewer,
}

impl Orchestrator {
    pub fn boot(
        config: BootConfig,
        market: Arc<dyn MarketDataSource>,
        gateway: Arc<dyn ExecutionGateway>,
    ) -> anyhow::Result<Self> {
        config
            .validate()
            .context("boot aborted: invalid configuration")?;

        let ledger = Arc::new(Mutex::new(PortfolioLedger::new(config.starting_cash)));
        info!(
            "boot: ledger ready with starting cash {:.2}",
            config.starting_cash
        );

        info!("boot: execution gateway attached");

        // Every supplied feed gains the flat-fallback degradation.
        let market: Arc<dyn MarketDataSource> = Arc::new(ResilientFeed::new(
            market,
            config.strategy.fallback_price,
            config.strategy.call_timeout(),
        ));
        info!(
            "boot: market data source attached (fallback price {:.2})",
            config.strategy.fallback_price
        );

        let risk_gate = Arc::new(RiskGate::standard());
        info!("boot: risk gate armed");

        let strategy = StrategyEngine::new(
            config.symbols.clone(),
            config.strategy.clone(),
            config.risk.clone(),
            risk_gate.clone(),
            market,
            gateway,
            ledger.clone(),
        );
        info!(
            "boot: strategy engine tracking {} symbols",
            config.symbols.len()
        );

        let allocator = CapitalAllocator::new(config.allocations.clone(), ledger.clone());
        info!("boot: capital allocator ready");

        let reviewer = AdaptationReviewer;
        info!("boot: adaptation reviewer ready");

        Ok(Self {
            ledger,
            risk_gate,
            policy: config.risk,
            strategy,
            allocator,
            reviewer,
        })
    }

    /// One decision cycle across the tracked symbol set.
    pub async fn run_cycle(&self) -> CycleReport {
        self.strategy.run_cycle().await
    }

    /// Direct execution path for an externally produced intent.
    pub async fn execute_trade(&self, intent: TradeIntent) -> TradeOutcome {
        self.strategy.execute_intent(intent).await
    }

    /// Risk verdict for an intent against the current portfolio, without
    /// executing anything.
    pub async fn validate_trade(&self, intent: &TradeIntent) -> RiskDecision {
        let state = self.ledger.lock().await.state();
        self.risk_gate.validate_trade(
            intent,
            &RiskContext {
                state: &state,
                policy: &self.policy,
            },
        )
    }

    pub async fn portfolio_state(&self) -> PortfolioState {
        self.ledger.lock().await.state()
    }

    pub async fn trade_history(&self) -> Vec<CompletedTrade> {
        self.ledger.lock().await.history().to_vec()
    }

    pub async fn review_allocations(&self) -> AllocationReport {
        self.allocator.review().await
    }

    pub async fn review_adaptation(&self) -> AdaptationReview {
        let ledger = self.ledger.lock().await;
        self.reviewer.review_performance(ledger.history())
    }
}
