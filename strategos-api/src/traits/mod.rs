pub mod gateway;
pub mod market_data;

pub use gateway::ExecutionGateway;
pub use market_data::{MarketDataError, MarketDataSource};
