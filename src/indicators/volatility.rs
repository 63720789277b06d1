/// Deviations below this floor are treated as undefined. Guards the
/// score division downstream against degenerate, zero-liquidity series.
pub const VOLATILITY_FLOOR: f64 = 1e-8;

/// Sample standard deviation (Bessel-corrected) of the `window` most recent
/// simple returns.
///
/// Returns `None` while the history is shorter than `window + 1` samples, or
/// when the deviation is non-finite or below [`VOLATILITY_FLOOR`].
pub fn rolling_volatility(prices: &[f64], window: usize) -> Option<f64> {
    if window < 2 || prices.len() < window + 1 {
        return None;
    }

    let tail = &prices[prices.len() - window - 1..];
    let returns: Vec<f64> = tail.windows(2).map(|w| w[1] / w[0] - 1.0).collect();

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns
        .iter()
        .map(|r| {
            let diff = r - mean;
            diff * diff
        })
        .sum::<f64>()
        / (returns.len() - 1) as f64;
    let deviation = variance.sqrt();

    if !deviation.is_finite() || deviation < VOLATILITY_FLOOR {
        return None;
    }
    Some(deviation)
}
