use crate::execution::engine::StrategyState;

/// Outcome of the per-tick drawdown assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskStatus {
    Active,
    Tripped,
}

/// One-shot drawdown kill switch.
///
/// Tracks the running valuation peak and trips once the drawdown from that
/// peak reaches the stop. There is no transition back for the run; a new
/// engine must be constructed to trade again.
#[derive(Debug, Clone)]
pub struct DrawdownGuard {
    drawdown_stop: f64,
}

impl DrawdownGuard {
    pub fn new(drawdown_stop: f64) -> Self {
        Self { drawdown_stop }
    }

    /// Update the peak and decide whether the stop fires. Call once per
    /// tick, before signal generation, while the state is still active.
    pub fn assess(&self, state: &mut StrategyState, valuation: f64) -> RiskStatus {
        if valuation > state.max_valuation_seen {
            state.max_valuation_seen = valuation;
        }
        let drawdown = (state.max_valuation_seen - valuation) / state.max_valuation_seen;
        if drawdown >= self.drawdown_stop {
            state.risk_off = true;
            return RiskStatus::Tripped;
        }
        RiskStatus::Active
    }
}
