use crate::models::{default_pair, PriceRecord, PriceSeries};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Paired-market scenarios for offline experiments and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum PairScenario {
    /// First instrument trends up ~5% per 20 sessions, second drifts
    /// sideways with small noise.
    TrendingFirst,
    /// Both instruments drift sideways with small noise.
    Sideways,
    /// First instrument rallies, then crashes hard enough to trip the
    /// drawdown stop.
    RallyThenCrash,
}

/// Generates reproducible paired price series. Same seed, same series —
/// there is no wall-clock input anywhere.
pub struct SyntheticPairGenerator {
    rng: StdRng,
    base_prices: [f64; 2],
}

impl SyntheticPairGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_prices: [100.0, 80.0],
        }
    }

    /// Generate `sessions` daily records for the given scenario.
    pub fn generate(&mut self, scenario: PairScenario, sessions: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut prices = self.base_prices;
        let mut records = Vec::with_capacity(sessions);

        for i in 0..sessions {
            let drifts = self.session_drifts(scenario, i, sessions);
            for leg in 0..2 {
                let noise = self.rng.gen_range(-0.001..0.001);
                prices[leg] *= 1.0 + drifts[leg] + noise;
            }
            records.push(PriceRecord {
                date: start + chrono::Days::new(i as u64),
                closes: prices,
            });
        }

        PriceSeries {
            pair: default_pair(),
            records,
        }
    }

    fn session_drifts(&self, scenario: PairScenario, session: usize, total: usize) -> [f64; 2] {
        match scenario {
            // 5% per 20 sessions, compounding
            PairScenario::TrendingFirst => [0.0025, 0.0],
            PairScenario::Sideways => [0.0, 0.0],
            PairScenario::RallyThenCrash => {
                if session < total * 3 / 5 {
                    [0.004, 0.0]
                } else {
                    [-0.02, 0.0]
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_series() {
        let a = SyntheticPairGenerator::new(42).generate(PairScenario::TrendingFirst, 100);
        let b = SyntheticPairGenerator::new(42).generate(PairScenario::TrendingFirst, 100);
        assert_eq!(a.records, b.records);
    }

    #[test]
    fn test_different_seed_different_series() {
        let a = SyntheticPairGenerator::new(42).generate(PairScenario::Sideways, 100);
        let b = SyntheticPairGenerator::new(43).generate(PairScenario::Sideways, 100);
        assert_ne!(a.records, b.records);
    }

    #[test]
    fn test_trending_first_rises_about_five_percent_per_twenty() {
        let series = SyntheticPairGenerator::new(7).generate(PairScenario::TrendingFirst, 200);
        let first = series.records[0].closes[0];
        let last = series.records[199].closes[0];
        let growth = last / first;
        // ~0.25% drift per session over 199 sessions, noise roughly cancels
        assert!(growth > 1.4 && growth < 1.8, "growth {}", growth);
    }

    #[test]
    fn test_rally_then_crash_ends_below_peak() {
        let series = SyntheticPairGenerator::new(7).generate(PairScenario::RallyThenCrash, 100);
        let peak = series
            .records
            .iter()
            .map(|r| r.closes[0])
            .fold(f64::MIN, f64::max);
        let last = series.records[99].closes[0];
        assert!(last < peak * 0.7);
    }

    #[test]
    fn test_dates_are_strictly_increasing() {
        let series = SyntheticPairGenerator::new(1).generate(PairScenario::Sideways, 50);
        for pair in series.records.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }
}
