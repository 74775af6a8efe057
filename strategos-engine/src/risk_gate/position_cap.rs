use super::{RiskContext, RiskDecision, Rule};
use strategos_api::{Side, TradeIntent};

/// Caps the number of distinct open positions.
///
/// Only trades that would open a *new* position are gated; adding to an
/// existing holding and selling always pass.
pub struct PositionCap;

impl Rule for PositionCap {
    fn name(&self) -> &str {
        "PositionCap"
    }

    fn evaluate(&self, intent: &TradeIntent, ctx: &RiskContext) -> RiskDecision {
        let opens_new_position =
            intent.side() == Side::Buy && !ctx.state.has_position(intent.symbol());
        if opens_new_position && ctx.state.open_positions() >= ctx.policy.max_open_positions {
            return RiskDecision::Rejected(format!(
                "already holding {} positions, cap is {}",
                ctx.state.open_positions(),
                ctx.policy.max_open_positions
            ));
        }
        RiskDecision::Approved
    }
}
