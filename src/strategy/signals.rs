use serde::{Deserialize, Serialize};

/// Extra history kept beyond the longest indicator window.
const HISTORY_MARGIN: usize = 5;

/// Tunable parameters for the paired momentum strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub momentum_window: usize,
    pub volatility_window: usize,
    pub threshold: f64,          // risk-adjusted score required to take a position
    pub max_gross_fraction: f64, // gross exposure cap as a fraction of valuation
    pub annual_vol_target: f64,
    pub drawdown_stop: f64, // fractional drawdown from peak that trips risk-off
    pub min_trade_quantity: u64,
    pub allow_short: bool,
    pub rebalance_band: f64, // fraction of target the delta must reach to re-trade
    pub cooldown_ticks: u64, // ticks to wait after a placed order
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            momentum_window: 20,
            volatility_window: 20,
            threshold: 2.0,
            max_gross_fraction: 0.6,
            annual_vol_target: 0.12,
            drawdown_stop: 0.04,
            min_trade_quantity: 10,
            allow_short: false,
            rebalance_band: 0.25,
            cooldown_ticks: 3,
        }
    }
}

impl StrategyConfig {
    /// History depth at which every indicator becomes defined.
    pub fn warmup_len(&self) -> usize {
        self.momentum_window.max(self.volatility_window) + 1
    }

    /// Rolling-buffer capacity: longest window plus a small margin.
    pub fn history_capacity(&self) -> usize {
        self.momentum_window.max(self.volatility_window) + HISTORY_MARGIN
    }
}

/// Directional target produced by the signal generator. The index points
/// into the instrument pair; the other leg is always flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSignal {
    Long(usize),
    Short(usize),
    Flat,
}

/// Pick the target side of the pair from risk-adjusted scores
/// (momentum / volatility per instrument).
///
/// Ties break toward the first instrument of the pair.
pub fn choose_target(scores: [f64; 2], config: &StrategyConfig) -> PairSignal {
    let best = if scores[0] >= scores[1] { 0 } else { 1 };
    if scores[best] > config.threshold {
        return PairSignal::Long(best);
    }

    if config.allow_short {
        let worst = if scores[0] <= scores[1] { 0 } else { 1 };
        if scores[worst] < -config.threshold {
            return PairSignal::Short(worst);
        }
    }

    PairSignal::Flat
}
