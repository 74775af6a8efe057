use crate::ledger::CompletedTrade;
use log::info;
use serde::{Deserialize, Serialize};

/// Qualitative recommendation on a strategy's risk budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdaptationAdvice {
    IncreaseAllocation,
    DecreaseOrHalt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationReview {
    pub net_pnl: f64,
    pub trades_reviewed: usize,
    pub advice: AdaptationAdvice,
}

/// Reviews realized trade performance and recommends scaling risk up or
/// down. Pure function of the supplied history: holds no state and does
/// not act on its own advice.
pub struct AdaptationReviewer;

impl AdaptationReviewer {
    pub fn review_performance(&self, history: &[CompletedTrade]) -> AdaptationReview {
        let net_pnl: f64 = history.iter().map(|trade| trade.realized_pnl).sum();
        let advice = if net_pnl > 0.0 {
            AdaptationAdvice::IncreaseAllocation
        } else {
            AdaptationAdvice::DecreaseOrHalt
        };

        info!(
            "adaptation review: {} trades, net realized pnl {:.2} -> {:?}",
            history.len(),
            net_pnl,
            advice
        );
        AdaptationReview {
            net_pnl,
            trades_reviewed: history.len(),
            advice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strategos_api::{Side, Symbol};
    use uuid::Uuid;

    fn trade(realized_pnl: f64) -> CompletedTrade {
        CompletedTrade {
            symbol: Symbol::new("BTC", "USD"),
            side: Side::Sell,
            quantity: 1.0,
            value: 100.0,
            order_id: Uuid::new_v4(),
            realized_pnl,
            timestamp: 0,
        }
    }

    #[test]
    fn profitable_history_recommends_increase() {
        let review = AdaptationReviewer.review_performance(&[trade(5.0), trade(-2.0)]);
        assert_eq!(review.advice, AdaptationAdvice::IncreaseAllocation);
        assert!((review.net_pnl - 3.0).abs() < 1e-9);
        assert_eq!(review.trades_reviewed, 2);
    }

    #[test]
    fn losing_history_recommends_decrease() {
        let review = AdaptationReviewer.review_performance(&[trade(1.0), trade(-4.0)]);
        assert_eq!(review.advice, AdaptationAdvice::DecreaseOrHalt);
    }

    #[test]
    fn flat_or_empty_history_recommends_decrease() {
        assert_eq!(
            AdaptationReviewer.review_performance(&[]).advice,
            AdaptationAdvice::DecreaseOrHalt
        );
        assert_eq!(
            AdaptationReviewer.review_performance(&[trade(0.0)]).advice,
            AdaptationAdvice::DecreaseOrHalt
        );
    }
}
