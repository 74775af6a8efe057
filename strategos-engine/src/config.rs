use serde::{Deserialize, Serialize};
use std::time::Duration;
use strategos_api::Symbol;
use thiserror::Error;

fn default_profit_take() -> f64 {
    0.05
}

fn default_call_timeout_ms() -> u64 {
    5_000
}

fn default_fallback_price() -> f64 {
    1.0
}

/// Hard limits applied to every candidate trade. Immutable for the
/// lifetime of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskPolicy {
    /// Fraction of total portfolio value a single trade may represent.
    pub max_risk_per_trade: f64,
    /// Maximum number of distinct open positions.
    pub max_open_positions: usize,
    /// Currency floor imposed by the exchange.
    pub min_trade_size: f64,
    /// Cash floor below which no new trades are approved.
    pub emergency_stop_threshold: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            max_risk_per_trade: 0.30,
            max_open_positions: 5,
            min_trade_size: 0.50,
            emergency_stop_threshold: 0.50,
        }
    }
}

/// Tuning for the per-symbol decision loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Share of free cash a single symbol may claim when entering.
    pub allocation_fraction: f64,
    /// Per-trade ceiling as a fraction of free cash.
    pub risk_ceiling: f64,
    /// Unrealized gain that triggers a full liquidation.
    #[serde(default = "default_profit_take")]
    pub profit_take_threshold: f64,
    /// Bound on feed and gateway calls, in milliseconds.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    /// Placeholder price used for the flat fallback series when the data
    /// source is unreachable.
    #[serde(default = "default_fallback_price")]
    pub fallback_price: f64,
}

impl StrategyConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            allocation_fraction: 0.25,
            risk_ceiling: 0.30,
            profit_take_threshold: default_profit_take(),
            call_timeout_ms: default_call_timeout_ms(),
            fallback_price: default_fallback_price(),
        }
    }
}

/// Recommended capital split across named strategies. Fractions need not
/// sum to one; the remainder is reported as the Reserve bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocationTable {
    entries: Vec<(String, f64)>,
}

impl AllocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, strategy: impl Into<String>, fraction: f64) -> Self {
        self.entries.push((strategy.into(), fraction));
        self
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn allocated_fraction(&self) -> f64 {
        self.entries.iter().map(|(_, f)| f).sum()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("starting cash must be positive, got {0}")]
    NonPositiveCash(f64),
    #[error("no tracked symbols configured")]
    NoSymbols,
    #[error("{name} must be a fraction in (0, 1], got {value}")]
    Fraction { name: &'static str, value: f64 },
    #[error("{name} must be non-negative and finite, got {value}")]
    Limit { name: &'static str, value: f64 },
    #[error("allocation table assigns {0} of capital, more than the whole")]
    OverAllocated(f64),
}

/// Everything the orchestrator needs to wire a running instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootConfig {
    pub starting_cash: f64,
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub risk: RiskPolicy,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub allocations: AllocationTable,
}

impl BootConfig {
    pub fn new(starting_cash: f64, symbols: Vec<Symbol>) -> Self {
        Self {
            starting_cash,
            symbols,
            risk: RiskPolicy::default(),
            strategy: StrategyConfig::default(),
            allocations: AllocationTable::default(),
        }
    }

    /// Boot-time sanity check. A failure here is fatal: a half-wired
    /// pipeline must not start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.starting_cash.is_finite() || self.starting_cash <= 0.0 {
            return Err(ConfigError::NonPositiveCash(self.starting_cash));
        }
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }

        let fractions = [
            ("max_risk_per_trade", self.risk.max_risk_per_trade),
            ("allocation_fraction", self.strategy.allocation_fraction),
            ("risk_ceiling", self.strategy.risk_ceiling),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(ConfigError::Fraction { name, value });
            }
        }

        let limits = [
            ("min_trade_size", self.risk.min_trade_size),
            (
                "emergency_stop_threshold",
                self.risk.emergency_stop_threshold,
            ),
            ("profit_take_threshold", self.strategy.profit_take_threshold),
            ("fallback_price", self.strategy.fallback_price),
        ];
        for (name, value) in limits {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Limit { name, value });
            }
        }

        for (strategy, fraction) in self.allocations.entries() {
            if !fraction.is_finite() || *fraction < 0.0 || *fraction > 1.0 {
                return Err(ConfigError::Fraction {
                    name: "allocation table entry",
                    value: *fraction,
                });
            }
            // Entry names are free-form, but an empty one is a config typo.
            if strategy.is_empty() {
                return Err(ConfigError::Fraction {
                    name: "allocation table entry",
                    value: *fraction,
                });
            }
        }
        let allocated = self.allocations.allocated_fraction();
        if allocated > 1.0 + 1e-9 {
            return Err(ConfigError::OverAllocated(allocated));
        }

        Ok(())
    }
}
