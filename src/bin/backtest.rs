use clap::Parser;
use pairbot::backtest::data::load_aligned_csv;
use pairbot::backtest::{BacktestRunner, PairScenario, SyntheticPairGenerator};
use pairbot::models::default_pair;
use pairbot::strategy::StrategyConfig;
use std::path::PathBuf;

/// Offline backtest over aligned CSV data or a synthetic scenario.
#[derive(Parser)]
#[command(name = "backtest")]
struct Args {
    /// CSV with date,close columns for the first instrument
    #[arg(long, requires = "csv_b")]
    csv_a: Option<PathBuf>,

    /// CSV with date,close columns for the second instrument
    #[arg(long, requires = "csv_a")]
    csv_b: Option<PathBuf>,

    /// Synthetic scenario used when no CSV data is given
    #[arg(long, value_enum, default_value = "trending-first")]
    scenario: PairScenario,

    /// Number of synthetic sessions to generate
    #[arg(long, default_value_t = 300)]
    sessions: usize,

    /// Seed for the synthetic generator
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 100_000.0)]
    initial_capital: f64,

    #[arg(long)]
    momentum_window: Option<usize>,

    #[arg(long)]
    volatility_window: Option<usize>,

    #[arg(long)]
    threshold: Option<f64>,

    #[arg(long)]
    drawdown_stop: Option<f64>,

    #[arg(long)]
    allow_short: bool,
}

fn main() -> pairbot::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("pairbot=info")
        .init();

    let args = Args::parse();

    let mut config = StrategyConfig::default();
    if let Some(window) = args.momentum_window {
        config.momentum_window = window;
    }
    if let Some(window) = args.volatility_window {
        config.volatility_window = window;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(stop) = args.drawdown_stop {
        config.drawdown_stop = stop;
    }
    if args.allow_short {
        config.allow_short = true;
    }

    let series = match (&args.csv_a, &args.csv_b) {
        (Some(first), Some(second)) => load_aligned_csv(default_pair(), first, second)?,
        _ => {
            let mut generator = SyntheticPairGenerator::new(args.seed);
            generator.generate(args.scenario, args.sessions)
        }
    };

    let runner = BacktestRunner::new(args.initial_capital, config);
    let metrics = runner.run(&series)?;
    metrics.print_report();

    Ok(())
}
