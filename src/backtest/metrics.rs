use crate::strategy::TRADING_DAYS_PER_YEAR;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Performance snapshot computed once from a completed valuation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub pair: [String; 2],
    pub initial_capital: f64,
    pub final_valuation: f64,
    pub pnl: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub trades: u64,
    pub downside_deviation: f64,
    pub annualized_volatility: f64,
    pub sharpe: f64,
    pub score: f64,
    pub final_positions: [i64; 2],
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: usize,
}

impl BacktestMetrics {
    /// Derive the full metric set from post-trade valuations.
    ///
    /// The path must be non-empty; the runner guarantees that by failing
    /// on empty input series before any accounting happens.
    pub fn from_valuations(
        valuations: &[f64],
        initial_capital: f64,
        trades: u64,
        pair: [String; 2],
        final_positions: [i64; 2],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let final_valuation = *valuations.last().expect("non-empty valuation path");
        let pnl = final_valuation - initial_capital;
        let total_return = final_valuation / initial_capital - 1.0;

        let returns: Vec<f64> = valuations
            .windows(2)
            .map(|w| w[1] / w[0] - 1.0)
            .filter(|r| r.is_finite())
            .collect();

        // RMS of negative returns only, annualized
        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let downside_deviation = if downside.is_empty() {
            0.0
        } else {
            let mean_sq = downside.iter().map(|r| r * r).sum::<f64>() / downside.len() as f64;
            mean_sq.sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
        };

        let (annualized_volatility, sharpe) = if returns.len() > 2 {
            let mean = returns.iter().sum::<f64>() / returns.len() as f64;
            let variance = returns
                .iter()
                .map(|r| {
                    let diff = r - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (returns.len() - 1) as f64;
            let stdev = variance.sqrt();
            let vol = stdev * TRADING_DAYS_PER_YEAR.sqrt();
            let sharpe = if stdev > 1e-12 {
                mean / stdev * TRADING_DAYS_PER_YEAR.sqrt()
            } else {
                0.0
            };
            (vol, sharpe)
        } else {
            (0.0, 0.0)
        };

        let score = total_return - 0.5 * downside_deviation;
        let max_drawdown = Self::max_drawdown(valuations);

        Self {
            pair,
            initial_capital,
            final_valuation,
            pnl,
            total_return,
            max_drawdown,
            trades,
            downside_deviation,
            annualized_volatility,
            sharpe,
            score,
            final_positions,
            start_date,
            end_date,
            days: valuations.len(),
        }
    }

    /// Largest peak-to-trough fractional decline over the path.
    fn max_drawdown(valuations: &[f64]) -> f64 {
        let mut peak = valuations[0];
        let mut max_dd = 0.0;
        for &v in valuations {
            if v > peak {
                peak = v;
            }
            let dd = (peak - v) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
        max_dd
    }

    /// Print a formatted report to stdout.
    pub fn print_report(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║               BACKTEST PERFORMANCE REPORT             ║");
        println!("╚═══════════════════════════════════════════════════════╝\n");

        println!("📊 P&L SUMMARY");
        println!(
            "  Period:                {} -> {} ({} sessions)",
            self.start_date, self.end_date, self.days
        );
        println!("  Initial Capital:       {:.2}", self.initial_capital);
        println!("  Final Valuation:       {:.2}", self.final_valuation);
        println!("  PnL:                   {:+.2}", self.pnl);
        println!("  Total Return:          {:+.2}%", self.total_return * 100.0);
        println!("  Trades:                {}", self.trades);
        println!(
            "  Final Positions:       {}={}  {}={}",
            self.pair[0], self.final_positions[0], self.pair[1], self.final_positions[1]
        );

        println!("\n⚠️  RISK METRICS");
        println!("  Max Drawdown:          {:.2}%", self.max_drawdown * 100.0);
        println!(
            "  Downside Dev (ann.):   {:.2}%",
            self.downside_deviation * 100.0
        );
        println!(
            "  Volatility (ann.):     {:.2}%",
            self.annualized_volatility * 100.0
        );
        println!("  Sharpe (approx):       {:.2}", self.sharpe);
        println!("  Score:                 {:+.2}%", self.score * 100.0);

        println!("\n═══════════════════════════════════════════════════════\n");
    }
}
