use super::{RiskContext, RiskDecision, Rule};
use strategos_api::{Side, TradeIntent};

/// A buy must be covered by available cash.
pub struct CashSufficiency;

impl Rule for CashSufficiency {
    fn name(&self) -> &str {
        "CashSufficiency"
    }

    fn evaluate(&self, intent: &TradeIntent, ctx: &RiskContext) -> RiskDecision {
        if intent.side() == Side::Buy && intent.value() > ctx.state.cash {
            return RiskDecision::Rejected(format!(
                "buy of {:.2} exceeds available cash {:.2}",
                intent.value(),
                ctx.state.cash
            ));
        }
        RiskDecision::Approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RiskPolicy;
    use crate::ledger::PortfolioLedger;
    use strategos_api::Symbol;

    #[test]
    fn rejects_buy_beyond_cash() {
        let policy = RiskPolicy::default();
        let state = PortfolioLedger::new(5.0).state();
        let intent = TradeIntent::new(Symbol::new("BTC", "USD"), Side::Buy, 0.001, 6.0);

        let decision = CashSufficiency.evaluate(&intent, &RiskContext { state: &state, policy: &policy });
        match decision {
            RiskDecision::Rejected(reason) => assert!(reason.contains("exceeds available cash")),
            RiskDecision::Approved => panic!("buy larger than cash must be rejected"),
        }
    }

    #[test]
    fn sells_are_not_cash_constrained() {
        let policy = RiskPolicy::default();
        let state = PortfolioLedger::new(5.0).state();
        let intent = TradeIntent::new(Symbol::new("BTC", "USD"), Side::Sell, 0.001, 6.0);

        let decision = CashSufficiency.evaluate(&intent, &RiskContext { state: &state, policy: &policy });
        assert_eq!(decision, RiskDecision::Approved);
    }
}
