use crate::config::AllocationTable;
use crate::ledger::PortfolioLedger;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Dollar allocation recommended for one named strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAllocation {
    pub strategy: String,
    pub fraction: f64,
    pub amount: f64,
}

/// Snapshot of the recommended capital split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    pub total_value: f64,
    pub entries: Vec<StrategyAllocation>,
    /// Whatever the configured fractions leave unassigned.
    pub reserve: StrategyAllocation,
}

/// Periodically reviews total portfolio value against the configured
/// allocation fractions. Reporting only: no capital is moved between
/// strategies in the current scope.
pub struct CapitalAllocator {
    table: AllocationTable,
    ledger: Arc<Mutex<PortfolioLedger>>,
}

impl CapitalAllocator {
    pub fn new(table: AllocationTable, ledger: Arc<Mutex<PortfolioLedger>>) -> Self {
        Self { table, ledger }
    }

    pub async fn review(&self) -> AllocationReport {
        let total_value = self.ledger.lock().await.state().total_value;

        let entries: Vec<StrategyAllocation> = self
            .table
            .entries()
            .iter()
            .map(|(strategy, fraction)| StrategyAllocation {
                strategy: strategy.clone(),
                fraction: *fraction,
                amount: total_value * fraction,
            })
            .collect();

        let reserve_fraction = (1.0 - self.table.allocated_fraction()).max(0.0);
        let reserve = StrategyAllocation {
            strategy: "Reserve".to_string(),
            fraction: reserve_fraction,
            amount: total_value * reserve_fraction,
        };

        for entry in &entries {
            info!(
                "allocation review: {} -> {:.1}% ({:.2})",
                entry.strategy,
                entry.fraction * 100.0,
                entry.amount
            );
        }
        info!(
            "allocation review: Reserve -> {:.1}% ({:.2}) of total {:.2}",
            reserve.fraction * 100.0,
            reserve.amount,
            total_value
        );

        AllocationReport {
            total_value,
            entries,
            reserve,
        }
    }
}
