use super::{RiskContext, RiskDecision, Rule};
use strategos_api::TradeIntent;

/// Halts all new trading once cash falls below the configured floor,
/// regardless of the trade under review.
pub struct EmergencyStop;

impl Rule for EmergencyStop {
    fn name(&self) -> &str {
        "EmergencyStop"
    }

    fn evaluate(&self, _intent: &TradeIntent, ctx: &RiskContext) -> RiskDecision {
        if ctx.state.cash < ctx.policy.emergency_stop_threshold {
            return RiskDecision::Rejected(format!(
                "cash {:.2} below emergency stop threshold {:.2}",
                ctx.state.cash, ctx.policy.emergency_stop_threshold
            ));
        }
        RiskDecision::Approved
    }
}
