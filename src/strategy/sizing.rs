use super::{PairSignal, StrategyConfig};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Volatility-targeted share quantity for one instrument.
///
/// The notional is scaled so the position's expected daily volatility
/// matches the annual target, then capped at the gross exposure ceiling.
/// Riskier instruments get smaller size for the same risk budget.
pub fn target_quantity(
    direction: i64,
    volatility: f64,
    price: f64,
    valuation: f64,
    config: &StrategyConfig,
) -> i64 {
    let target_daily_vol = config.annual_vol_target / TRADING_DAYS_PER_YEAR.sqrt();
    let gross_cap = config.max_gross_fraction * valuation;
    let notional = ((target_daily_vol / volatility) * valuation).min(gross_cap);
    (notional / price).floor() as i64 * direction
}

/// Target quantities for the whole pair. The non-selected leg is always
/// flat; a flat signal targets zero on both.
pub fn target_positions(
    signal: PairSignal,
    volatilities: [f64; 2],
    closes: [f64; 2],
    valuation: f64,
    config: &StrategyConfig,
) -> [i64; 2] {
    let mut targets = [0i64; 2];
    let (index, direction) = match signal {
        PairSignal::Long(i) => (i, 1),
        PairSignal::Short(i) => (i, -1),
        PairSignal::Flat => return targets,
    };
    targets[index] = target_quantity(
        direction,
        volatilities[index],
        closes[index],
        valuation,
        config,
    );
    targets
}
