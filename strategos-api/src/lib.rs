pub mod model;
pub mod traits;

pub use model::execution::PlacementOutcome;
pub use model::market::{PricePoint, PriceSeries, Sentiment};
pub use model::symbol::{Symbol, SymbolError};
pub use model::trade::{Side, TradeDefect, TradeIntent, TradeRecord};
pub use traits::gateway::ExecutionGateway;
pub use traits::market_data::{MarketDataError, MarketDataSource};
