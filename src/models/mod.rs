use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The instrument pair traded by the simulation venue.
pub const DEFAULT_PAIR: [&str; 2] = ["MERI", "TIS"];

pub fn default_pair() -> [String; 2] {
    [DEFAULT_PAIR[0].to_string(), DEFAULT_PAIR[1].to_string()]
}

/// Market data for one instrument within a tick. Only the close is
/// guaranteed by the feed; the rest is best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub close: f64,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl Quote {
    pub fn from_close(close: f64) -> Self {
        Self {
            close,
            open: None,
            high: None,
            low: None,
            volume: None,
        }
    }
}

/// Portfolio snapshot carried by a tick. Positions are net signed share
/// counts: positive long, negative short.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub cash: f64,
    pub positions: HashMap<String, i64>,
}

impl Portfolio {
    pub fn position(&self, instrument: &str) -> i64 {
        self.positions.get(instrument).copied().unwrap_or(0)
    }
}

/// Canonical market tick, one per trading period. Built exactly once at the
/// system boundary; immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tick {
    pub date: NaiveDate,
    pub market_data: HashMap<String, Quote>,
    pub portfolio: Portfolio,
    pub valuation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

/// Order handed to the execution sink. Quantity is always positive; the
/// direction lives in `side`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub instrument: String,
    pub side: Side,
    pub quantity: u64,
}

impl OrderRequest {
    /// Build an order from a signed position delta. `None` when there is
    /// nothing to trade.
    pub fn from_delta(instrument: &str, delta: i64) -> Option<Self> {
        if delta == 0 {
            return None;
        }
        let side = if delta > 0 { Side::Buy } else { Side::Sell };
        Some(Self {
            instrument: instrument.to_string(),
            side,
            quantity: delta.unsigned_abs(),
        })
    }

    /// Signed position impact of this order.
    pub fn signed_quantity(&self) -> i64 {
        match self.side {
            Side::Buy => self.quantity as i64,
            Side::Sell => -(self.quantity as i64),
        }
    }
}

/// One session's closes for the pair, aligned on date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub closes: [f64; 2],
}

/// Chronologically ordered, date-aligned close series for exactly two
/// instruments. Input to the accounting engine.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub pair: [String; 2],
    pub records: Vec<PriceRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_from_positive_delta_is_buy() {
        let order = OrderRequest::from_delta("MERI", 25).unwrap();
        assert_eq!(order.side, Side::Buy);
        assert_eq!(order.quantity, 25);
        assert_eq!(order.signed_quantity(), 25);
    }

    #[test]
    fn test_order_from_negative_delta_is_sell() {
        let order = OrderRequest::from_delta("TIS", -40).unwrap();
        assert_eq!(order.side, Side::Sell);
        assert_eq!(order.quantity, 40);
        assert_eq!(order.signed_quantity(), -40);
    }

    #[test]
    fn test_zero_delta_yields_no_order() {
        assert!(OrderRequest::from_delta("MERI", 0).is_none());
    }

    #[test]
    fn test_side_wire_format() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Side::Sell).unwrap(), "\"SELL\"");
    }

    #[test]
    fn test_portfolio_missing_instrument_is_flat() {
        let portfolio = Portfolio {
            cash: 1000.0,
            positions: HashMap::new(),
        };
        assert_eq!(portfolio.position("MERI"), 0);
    }
}
