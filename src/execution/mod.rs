// Decision stack and order plumbing
pub mod engine;
pub mod order_sink;
pub mod price_history;
pub mod rebalancer;

pub use engine::{StrategyState, TradingEngine};
pub use order_sink::{OrderSink, RecordingSink};
pub use price_history::PriceHistory;
pub use rebalancer::OrderRebalancer;
