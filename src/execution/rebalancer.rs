use super::engine::StrategyState;
use crate::models::OrderRequest;
use crate::strategy::StrategyConfig;

/// Diffs target positions against current ones and decides which deltas are
/// worth trading.
///
/// Anti-churn rules: a delta must clear the minimum trade size, and unless
/// it is a close-out it must also be a meaningful fraction of the target.
/// A single global cooldown gates the outbound order channel as a whole.
#[derive(Debug, Clone)]
pub struct OrderRebalancer {
    min_trade_quantity: u64,
    rebalance_band: f64,
    cooldown_ticks: u64,
}

impl OrderRebalancer {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            min_trade_quantity: config.min_trade_quantity,
            rebalance_band: config.rebalance_band,
            cooldown_ticks: config.cooldown_ticks,
        }
    }

    /// Emit at most one order per instrument for this tick.
    ///
    /// The cooldown is claimed at decision time: emitting any order stamps
    /// `last_order_tick` whether or not downstream transmission succeeds.
    pub fn plan(
        &self,
        pair: &[String; 2],
        current: [i64; 2],
        target: [i64; 2],
        state: &mut StrategyState,
    ) -> Vec<OrderRequest> {
        if let Some(last) = state.last_order_tick {
            if state.tick_count.saturating_sub(last) < self.cooldown_ticks {
                return Vec::new();
            }
        }

        let mut orders = Vec::new();
        for i in 0..2 {
            let delta = target[i] - current[i];
            if delta.unsigned_abs() < self.min_trade_quantity {
                continue;
            }
            // Closing out is always allowed; otherwise the delta must be a
            // meaningful fraction of the target before re-trading.
            if target[i] != 0
                && (delta.abs() as f64) < self.rebalance_band * (target[i].abs() as f64)
            {
                continue;
            }
            if let Some(order) = OrderRequest::from_delta(&pair[i], delta) {
                orders.push(order);
            }
        }

        if !orders.is_empty() {
            state.last_order_tick = Some(state.tick_count);
        }
        orders
    }
}
