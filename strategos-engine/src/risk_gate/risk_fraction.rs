use super::{RiskContext, RiskDecision, Rule};
use strategos_api::TradeIntent;

/// Caps a single trade at a fraction of total portfolio value.
pub struct RiskFraction;

impl Rule for RiskFraction {
    fn name(&self) -> &str {
        "RiskFraction"
    }

    fn evaluate(&self, intent: &TradeIntent, ctx: &RiskContext) -> RiskDecision {
        let total = ctx.state.total_value;
        if total <= 0.0 {
            return RiskDecision::Rejected("portfolio has no value to risk".to_string());
        }
        let fraction = intent.value() / total;
        if fraction > ctx.policy.max_risk_per_trade {
            return RiskDecision::Rejected(format!(
                "trade is {:.1}% of portfolio value, cap is {:.1}%",
                fraction * 100.0,
                ctx.policy.max_risk_per_trade * 100.0
            ));
        }
        RiskDecision::Approved
    }
}
