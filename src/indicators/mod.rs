// Indicator module
// Momentum and rolling volatility over close-price histories

pub mod momentum;
pub mod volatility;

pub use momentum::momentum;
pub use volatility::{rolling_volatility, VOLATILITY_FLOOR};
