//! Stateless trade validator: a fixed, ordered chain of rules.
//!
//! The first rejection wins and determines the reported reason, so the
//! chain order is part of the contract.

use crate::config::RiskPolicy;
use crate::ledger::PortfolioState;
use log::warn;
use serde::{Deserialize, Serialize};
use strategos_api::TradeIntent;

pub mod cash_sufficiency;
pub mod emergency_stop;
pub mod min_trade_size;
pub mod position_cap;
pub mod risk_fraction;

pub use cash_sufficiency::CashSufficiency;
pub use emergency_stop::EmergencyStop;
pub use min_trade_size::MinTradeSize;
pub use position_cap::PositionCap;
pub use risk_fraction::RiskFraction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RiskDecision {
    Approved,
    Rejected(String),
}

impl RiskDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, RiskDecision::Approved)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            RiskDecision::Approved => None,
            RiskDecision::Rejected(reason) => Some(reason),
        }
    }
}

/// Context passed to rules to make decisions.
pub struct RiskContext<'a> {
    pub state: &'a PortfolioState,
    pub policy: &'a RiskPolicy,
}

pub trait Rule: Send + Sync {
    fn name(&self) -> &str;
    fn evaluate(&self, intent: &TradeIntent, ctx: &RiskContext) -> RiskDecision;
}

pub struct RiskGate {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for RiskGate {
    fn default() -> Self {
        Self::standard()
    }
}

impl RiskGate {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: Box<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// The standard chain, in check order: emergency stop, minimum trade
    /// size, risk fraction, position-count cap, cash sufficiency.
    pub fn standard() -> Self {
        Self::new()
            .with_rule(Box::new(EmergencyStop))
            .with_rule(Box::new(MinTradeSize))
            .with_rule(Box::new(RiskFraction))
            .with_rule(Box::new(PositionCap))
            .with_rule(Box::new(CashSufficiency))
    }

    /// Deterministic, pure function of the intent, the portfolio snapshot
    /// and the fixed policy. Malformed intents are rejected before any
    /// rule runs.
    pub fn validate_trade(&self, intent: &TradeIntent, ctx: &RiskContext) -> RiskDecision {
        if let Err(defect) = intent.validate() {
            let reason = format!("malformed intent: {}", defect);
            warn!("trade for {} rejected: {}", intent.symbol(), reason);
            return RiskDecision::Rejected(reason);
        }

        for rule in &self.rules {
            if let RiskDecision::Rejected(reason) = rule.evaluate(intent, ctx) {
                warn!(
                    "trade for {} rejected by rule {}: {}",
                    intent.symbol(),
                    rule.name(),
                    reason
                );
                return RiskDecision::Rejected(format!("{}: {}", rule.name(), reason));
            }
        }
        RiskDecision::Approved
    }
}
