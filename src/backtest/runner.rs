use crate::backtest::metrics::BacktestMetrics;
use crate::execution::{RecordingSink, TradingEngine};
use crate::models::{Portfolio, PriceSeries, Quote, Side, Tick};
use crate::strategy::StrategyConfig;
use std::collections::HashMap;
use thiserror::Error;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

/// Idle cash earns interest at roughly the €STR rate.
pub const DEFAULT_ANNUAL_RISK_FREE_RATE: f64 = 0.0193;

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("empty price series: no valuations can be produced")]
    EmptySeries,
}

/// Deterministic offline replay of the live decision stack.
///
/// Reimplements the venue's execution and valuation semantics so offline
/// and live runs agree: orders fill at the period close, idle cash accrues
/// daily interest, valuations are cash plus marked positions. A pure fold
/// over the series — identical inputs give bit-identical metrics, and
/// independent runs share no state.
pub struct BacktestRunner {
    initial_capital: f64,
    annual_risk_free_rate: f64,
    config: StrategyConfig,
}

impl BacktestRunner {
    pub fn new(initial_capital: f64, config: StrategyConfig) -> Self {
        Self {
            initial_capital,
            annual_risk_free_rate: DEFAULT_ANNUAL_RISK_FREE_RATE,
            config,
        }
    }

    pub fn with_risk_free_rate(mut self, annual_rate: f64) -> Self {
        self.annual_risk_free_rate = annual_rate;
        self
    }

    /// Replay the series and return the performance metrics.
    pub fn run(&self, series: &PriceSeries) -> Result<BacktestMetrics, BacktestError> {
        if series.records.is_empty() {
            return Err(BacktestError::EmptySeries);
        }

        tracing::info!(
            sessions = series.records.len(),
            pair = ?series.pair,
            "starting backtest replay"
        );

        let daily_rate = self.annual_risk_free_rate / 252.0;
        let mut engine = TradingEngine::new(series.pair.clone(), self.config.clone());
        let mut sink = RecordingSink::default();

        let mut cash = self.initial_capital;
        let mut positions = [0i64; 2];
        let mut trades = 0u64;
        let mut valuations = Vec::with_capacity(series.records.len());

        for record in &series.records {
            // Interest on idle cash, then mark the book at today's closes
            cash *= 1.0 + daily_rate;
            let closes = record.closes;
            let valuation = cash
                + positions[0] as f64 * closes[0]
                + positions[1] as f64 * closes[1];

            let tick = self.build_tick(series, record.date, closes, cash, positions, valuation);
            engine.process_tick(&tick, &mut sink);

            // Fill every captured order at this period's close
            for order in sink.take() {
                let Some(i) = series.pair.iter().position(|s| *s == order.instrument) else {
                    continue;
                };
                let notional = order.quantity as f64 * closes[i];
                match order.side {
                    Side::Buy => cash -= notional,
                    Side::Sell => cash += notional,
                }
                positions[i] += order.signed_quantity();
                trades += 1;
            }

            valuations.push(
                cash + positions[0] as f64 * closes[0] + positions[1] as f64 * closes[1],
            );
        }

        let metrics = BacktestMetrics::from_valuations(
            &valuations,
            self.initial_capital,
            trades,
            series.pair.clone(),
            positions,
            series.records[0].date,
            series.records[series.records.len() - 1].date,
        );

        tracing::info!(
            trades = metrics.trades,
            total_return = metrics.total_return,
            max_drawdown = metrics.max_drawdown,
            "backtest complete"
        );

        Ok(metrics)
    }

    fn build_tick(
        &self,
        series: &PriceSeries,
        date: chrono::NaiveDate,
        closes: [f64; 2],
        cash: f64,
        positions: [i64; 2],
        valuation: f64,
    ) -> Tick {
        let mut market_data = HashMap::new();
        let mut position_map = HashMap::new();
        for i in 0..2 {
            market_data.insert(series.pair[i].clone(), Quote::from_close(closes[i]));
            position_map.insert(series.pair[i].clone(), positions[i]);
        }
        Tick {
            date,
            market_data,
            portfolio: Portfolio {
                cash,
                positions: position_map,
            },
            valuation,
        }
    }
}
