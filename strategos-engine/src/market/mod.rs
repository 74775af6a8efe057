pub mod replay;
pub mod resilient;

pub use replay::ReplayFeed;
pub use resilient::ResilientFeed;

/// Bounded lookback window for price history: hourly points for 24h.
pub const LOOKBACK_POINTS: usize = 24;

/// Seconds between points in the lookback window.
pub const LOOKBACK_STEP_SECS: i64 = 3_600;
