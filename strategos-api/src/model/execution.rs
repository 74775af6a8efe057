use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of submitting an order to an exchange.
///
/// A rejection is a structured value, not an error: callers branch on it
/// and continue with the rest of the cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlacementOutcome {
    Placed { order_id: Uuid },
    Rejected { reason: String },
}

impl PlacementOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, PlacementOutcome::Placed { .. })
    }

    pub fn order_id(&self) -> Option<Uuid> {
        match self {
            PlacementOutcome::Placed { order_id } => Some(*order_id),
            PlacementOutcome::Rejected { .. } => None,
        }
    }
}
