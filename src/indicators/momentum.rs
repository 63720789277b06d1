/// Relative price change over the lookback `window`.
///
/// Returns `None` until the history holds `window + 1` samples. That is the
/// warm-up signal, not an error: callers skip the tick and wait for data.
pub fn momentum(prices: &[f64], window: usize) -> Option<f64> {
    if window == 0 || prices.len() < window + 1 {
        return None;
    }
    let last = prices[prices.len() - 1];
    let base = prices[prices.len() - 1 - window];
    Some(last / base - 1.0)
}
