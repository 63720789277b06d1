use super::order_sink::OrderSink;
use super::price_history::PriceHistory;
use super::rebalancer::OrderRebalancer;
use crate::indicators::{momentum, rolling_volatility};
use crate::models::{OrderRequest, Tick};
use crate::risk::{DrawdownGuard, RiskStatus};
use crate::strategy::{choose_target, target_positions, StrategyConfig};

/// Mutable per-run strategy state. Never reset; construct a new engine to
/// start a fresh run.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyState {
    pub max_valuation_seen: f64,
    pub risk_off: bool,
    pub tick_count: u64,
    pub last_order_tick: Option<u64>,
}

impl StrategyState {
    pub fn new() -> Self {
        Self {
            max_valuation_seen: 0.0,
            risk_off: false,
            tick_count: 0,
            last_order_tick: None,
        }
    }
}

impl Default for StrategyState {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-threaded decision stack for one instrument pair.
///
/// Processes at most one tick at a time, to completion: history update,
/// drawdown guard, indicators, signal, sizing, rebalancing. Orders go to
/// the injected sink; the engine never blocks on transmission and never
/// learns whether it succeeded.
pub struct TradingEngine {
    pair: [String; 2],
    config: StrategyConfig,
    history: PriceHistory,
    guard: DrawdownGuard,
    rebalancer: OrderRebalancer,
    state: StrategyState,
}

impl TradingEngine {
    pub fn new(pair: [String; 2], config: StrategyConfig) -> Self {
        let history = PriceHistory::new(config.history_capacity());
        let guard = DrawdownGuard::new(config.drawdown_stop);
        let rebalancer = OrderRebalancer::new(&config);
        Self {
            pair,
            config,
            history,
            guard,
            rebalancer,
            state: StrategyState::new(),
        }
    }

    pub fn pair(&self) -> &[String; 2] {
        &self.pair
    }

    pub fn state(&self) -> &StrategyState {
        &self.state
    }

    /// Permanent risk-off flag, surfaced for operators. Not an error state.
    pub fn is_risk_off(&self) -> bool {
        self.state.risk_off
    }

    /// Run one tick through the decision stack.
    ///
    /// Warm-up and malformed market data skip silently: no orders, no
    /// partial history writes. Once risk-off, ticks only bump the counter.
    pub fn process_tick(&mut self, tick: &Tick, sink: &mut dyn OrderSink) {
        self.state.tick_count += 1;

        if self.state.risk_off {
            return;
        }

        let Some(closes) = self.pair_closes(tick) else {
            tracing::debug!(date = %tick.date, "tick missing usable close prices, skipping");
            return;
        };
        for i in 0..2 {
            self.history.push(&self.pair[i], closes[i]);
        }

        if self.guard.assess(&mut self.state, tick.valuation) == RiskStatus::Tripped {
            self.flatten(tick, sink);
            return;
        }

        let mut volatilities = [0.0f64; 2];
        let mut scores = [0.0f64; 2];
        for i in 0..2 {
            let prices = self.history.closes(&self.pair[i]);
            let Some(m) = momentum(&prices, self.config.momentum_window) else {
                return; // warm-up
            };
            let Some(v) = rolling_volatility(&prices, self.config.volatility_window) else {
                return; // warm-up or degenerate volatility
            };
            volatilities[i] = v;
            scores[i] = m / v;
        }

        let signal = choose_target(scores, &self.config);
        let target = target_positions(signal, volatilities, closes, tick.valuation, &self.config);
        let current = [
            tick.portfolio.position(&self.pair[0]),
            tick.portfolio.position(&self.pair[1]),
        ];

        for order in self
            .rebalancer
            .plan(&self.pair, current, target, &mut self.state)
        {
            tracing::info!(
                instrument = %order.instrument,
                side = ?order.side,
                quantity = order.quantity,
                "order decided"
            );
            sink.transmit_order(order);
        }
    }

    /// Close prices for both legs, or `None` when either is missing or
    /// unusable. All-or-nothing so the history never takes a partial push.
    fn pair_closes(&self, tick: &Tick) -> Option<[f64; 2]> {
        let mut closes = [0.0f64; 2];
        for (i, instrument) in self.pair.iter().enumerate() {
            let close = tick.market_data.get(instrument)?.close;
            if !close.is_finite() || close <= 0.0 {
                return None;
            }
            closes[i] = close;
        }
        Some(closes)
    }

    /// Drawdown stop hit: close every open position and go dark.
    fn flatten(&mut self, tick: &Tick, sink: &mut dyn OrderSink) {
        tracing::warn!(
            valuation = tick.valuation,
            peak = self.state.max_valuation_seen,
            "drawdown stop hit, flattening all positions and going risk-off"
        );
        for instrument in &self.pair {
            let position = tick.portfolio.position(instrument);
            if let Some(order) = OrderRequest::from_delta(instrument, -position) {
                sink.transmit_order(order);
            }
        }
        self.state.last_order_tick = Some(self.state.tick_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::RecordingSink;
    use crate::models::{Portfolio, Quote, Side};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn pair() -> [String; 2] {
        ["MERI".to_string(), "TIS".to_string()]
    }

    fn config() -> StrategyConfig {
        StrategyConfig {
            momentum_window: 3,
            volatility_window: 3,
            threshold: 0.5,
            min_trade_quantity: 1,
            cooldown_ticks: 0,
            ..Default::default()
        }
    }

    fn tick(day: u32, closes: [f64; 2], positions: [i64; 2], valuation: f64) -> Tick {
        let mut market_data = HashMap::new();
        market_data.insert("MERI".to_string(), Quote::from_close(closes[0]));
        market_data.insert("TIS".to_string(), Quote::from_close(closes[1]));

        let mut position_map = HashMap::new();
        position_map.insert("MERI".to_string(), positions[0]);
        position_map.insert("TIS".to_string(), positions[1]);

        Tick {
            date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .checked_add_days(chrono::Days::new(day as u64))
                .unwrap(),
            market_data,
            portfolio: Portfolio {
                cash: valuation,
                positions: position_map,
            },
            valuation,
        }
    }

    #[test]
    fn test_warmup_emits_no_orders() {
        let mut engine = TradingEngine::new(pair(), config());
        let mut sink = RecordingSink::default();

        for day in 0..3 {
            let price = 100.0 + day as f64 * 5.0;
            engine.process_tick(&tick(day, [price, 50.0], [0, 0], 100_000.0), &mut sink);
        }

        assert!(sink.take().is_empty());
        assert_eq!(engine.state().tick_count, 3);
    }

    #[test]
    fn test_malformed_tick_skips_without_history_write() {
        let mut engine = TradingEngine::new(pair(), config());
        let mut sink = RecordingSink::default();

        let mut bad = tick(0, [100.0, 50.0], [0, 0], 100_000.0);
        bad.market_data.remove("TIS");
        engine.process_tick(&bad, &mut sink);

        assert!(sink.take().is_empty());
        // Neither leg was pushed, not even the one that was present
        assert_eq!(engine.history.len("MERI"), 0);
        assert_eq!(engine.history.len("TIS"), 0);
    }

    #[test]
    fn test_non_positive_close_is_malformed() {
        let mut engine = TradingEngine::new(pair(), config());
        let mut sink = RecordingSink::default();

        engine.process_tick(&tick(0, [100.0, -1.0], [0, 0], 100_000.0), &mut sink);
        assert_eq!(engine.history.len("MERI"), 0);
    }

    #[test]
    fn test_drawdown_trip_flattens_once_then_freezes() {
        let mut engine = TradingEngine::new(pair(), config());
        let mut sink = RecordingSink::default();

        // Build a peak, then crash past the default 4% stop
        engine.process_tick(&tick(0, [100.0, 50.0], [0, 0], 100_000.0), &mut sink);
        engine.process_tick(&tick(1, [100.0, 50.0], [300, 0], 110_000.0), &mut sink);
        engine.process_tick(&tick(2, [90.0, 50.0], [300, 0], 100_000.0), &mut sink);

        let orders = sink.take();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, Side::Sell);
        assert_eq!(orders[0].quantity, 300);
        assert!(engine.is_risk_off());

        // Every later tick is a no-op apart from the counter
        let frozen = engine.state().clone();
        engine.process_tick(&tick(3, [80.0, 50.0], [300, 0], 90_000.0), &mut sink);
        engine.process_tick(&tick(4, [120.0, 50.0], [300, 0], 130_000.0), &mut sink);

        assert!(sink.take().is_empty());
        assert!(engine.is_risk_off());
        assert_eq!(engine.state().max_valuation_seen, frozen.max_valuation_seen);
        assert_eq!(engine.state().last_order_tick, frozen.last_order_tick);
        assert_eq!(engine.state().tick_count, frozen.tick_count + 2);
    }

    #[test]
    fn test_goes_long_the_trending_leg_after_warmup() {
        let mut engine = TradingEngine::new(pair(), config());
        let mut sink = RecordingSink::default();

        // MERI trends up with wiggle, TIS wiggles around flat
        let meri = [100.0, 103.0, 102.0, 106.0, 105.0, 109.0, 108.0, 112.0];
        let tis = [50.0, 50.2, 49.9, 50.1, 49.8, 50.2, 49.9, 50.1];
        for day in 0..meri.len() {
            engine.process_tick(
                &tick(day as u32, [meri[day], tis[day]], [0, 0], 100_000.0),
                &mut sink,
            );
        }

        let orders = sink.take();
        assert!(!orders.is_empty());
        assert!(orders.iter().all(|o| o.instrument == "MERI"));
        assert!(orders.iter().all(|o| o.side == Side::Buy));
    }
}
