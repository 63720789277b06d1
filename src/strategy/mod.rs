// Trading strategy module
pub mod signals;
pub mod sizing;

pub use signals::{choose_target, PairSignal, StrategyConfig};
pub use sizing::{target_positions, target_quantity, TRADING_DAYS_PER_YEAR};
