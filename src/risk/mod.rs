// Risk management module
pub mod drawdown;

pub use drawdown::{DrawdownGuard, RiskStatus};
