use super::{RiskContext, RiskDecision, Rule};
use strategos_api::TradeIntent;

/// Enforces the exchange-imposed currency floor on trade value.
pub struct MinTradeSize;

impl Rule for MinTradeSize {
    fn name(&self) -> &str {
        "MinTradeSize"
    }

    fn evaluate(&self, intent: &TradeIntent, ctx: &RiskContext) -> RiskDecision {
        if intent.value() < ctx.policy.min_trade_size {
            return RiskDecision::Rejected(format!(
                "value {:.2} below minimum trade size {:.2}",
                intent.value(),
                ctx.policy.min_trade_size
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
    use strategos_api::{Side, Symbol};

    #[test]
    fn rejects_sub_minimum_value() {
        let policy = RiskPolicy::default(); // minimum 0.50
        let state = PortfolioLedger::new(8.89).state();
        let intent = TradeIntent::new(Symbol::new("BTC", "USD"), Side::Buy, 0.001, 0.10);

        let decision = MinTradeSize.evaluate(&intent, &RiskContext { state: &state, policy: &policy });
        match decision {
            RiskDecision::Rejected(reason) => assert!(reason.contains("minimum trade size")),
            RiskDecision::Approved => panic!("0.10 is below the 0.50 floor"),
        }
    }

    #[test]
    fn passes_at_the_floor() {
        let policy = RiskPolicy::default();
        let state = PortfolioLedger::new(8.89).state();
        let intent = TradeIntent::new(Symbol::new("BTC", "USD"), Side::Buy, 0.001, 0.50);

        let decision = MinTradeSize.evaluate(&intent, &RiskContext { state: &state, policy: &policy });
        assert_eq!(decision, RiskDecision::Approved);
    }
}
