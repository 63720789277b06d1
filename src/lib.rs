// Core modules
pub mod api;
pub mod backtest;
pub mod execution;
pub mod indicators;
pub mod models;
pub mod risk;
pub mod strategy;

// Re-export commonly used types
pub use execution::{OrderSink, RecordingSink, TradingEngine};
pub use models::*;
pub use strategy::StrategyConfig;

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
