use crate::models::{Portfolio, Quote, Tick};
use chrono::NaiveDate;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// A feed frame after boundary normalization. Only `Tick` ever reaches the
/// engine; everything else is dropped here.
#[derive(Debug)]
pub enum FeedMessage {
    Tick(Tick),
    Control,
}

/// Raw wire shape of a simulation frame. The feed is loose about shapes:
/// `marketData` is sometimes a symbol-keyed mapping and sometimes a list of
/// records, and short positions may arrive in a separate map. Everything is
/// folded into the canonical [`Tick`] exactly once, right here.
#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: String,
    date: Option<String>,
    #[serde(rename = "marketData")]
    market_data: Option<RawMarketData>,
    portfolio: Option<RawPortfolio>,
    valuation: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMarketData {
    Keyed(HashMap<String, Quote>),
    Records(Vec<RawQuoteRecord>),
}

#[derive(Debug, Deserialize)]
struct RawQuoteRecord {
    symbol: String,
    close: f64,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawPortfolio {
    cash: f64,
    #[serde(default)]
    positions: HashMap<String, i64>,
    #[serde(rename = "shortPositions", default)]
    short_positions: HashMap<String, u64>,
}

impl RawPortfolio {
    /// Net signed positions: long lots minus separately tracked short lots.
    fn into_portfolio(self) -> Portfolio {
        let mut positions = self.positions;
        for (instrument, short) in self.short_positions {
            *positions.entry(instrument).or_insert(0) -= short as i64;
        }
        Portfolio {
            cash: self.cash,
            positions,
        }
    }
}

impl RawMarketData {
    fn into_quotes(self) -> HashMap<String, Quote> {
        match self {
            RawMarketData::Keyed(map) => map,
            RawMarketData::Records(records) => records
                .into_iter()
                .map(|r| {
                    (
                        r.symbol,
                        Quote {
                            close: r.close,
                            open: r.open,
                            high: r.high,
                            low: r.low,
                            volume: r.volume,
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Parse one text frame into a normalized feed message.
pub fn parse_message(text: &str) -> crate::Result<FeedMessage> {
    let raw: RawMessage = serde_json::from_str(text)?;
    if raw.kind != "TICK" {
        return Ok(FeedMessage::Control);
    }

    let date_str = raw.date.ok_or("tick missing date")?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")?;
    let market_data = raw
        .market_data
        .ok_or("tick missing marketData")?
        .into_quotes();
    let portfolio = raw.portfolio.ok_or("tick missing portfolio")?.into_portfolio();
    let valuation = raw.valuation.ok_or("tick missing valuation")?;

    Ok(FeedMessage::Tick(Tick {
        date,
        market_data,
        portfolio,
        valuation,
    }))
}

/// Own the websocket for the run: answer heartbeats, normalize frames, and
/// forward ticks to the single-consumer engine channel. Returns when the
/// socket closes or the consumer goes away.
pub async fn run_feed(url: &str, tx: mpsc::UnboundedSender<Tick>) -> crate::Result<()> {
    let (socket, _) = connect_async(url).await?;
    tracing::info!(url, "feed connected");
    let (mut write, mut read) = socket.split();

    while let Some(frame) = read.next().await {
        match frame? {
            Message::Text(text) => {
                // Transport-level heartbeat, below the message protocol
                if text == "PING" {
                    write.send(Message::Text("PONG".to_string())).await?;
                    continue;
                }
                match parse_message(&text) {
                    Ok(FeedMessage::Tick(tick)) => {
                        if tx.send(tick).is_err() {
                            tracing::info!("tick consumer gone, closing feed");
                            break;
                        }
                    }
                    Ok(FeedMessage::Control) => {}
                    Err(e) => tracing::warn!("unparseable feed frame: {}", e),
                }
            }
            Message::Ping(payload) => write.send(Message::Pong(payload)).await?,
            Message::Close(_) => {
                tracing::info!("feed closed by venue");
                break;
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyed_market_data() {
        let frame = r#"{
            "type": "TICK",
            "date": "2024-03-08",
            "marketData": {
                "MERI": {"close": 101.5, "volume": 12000},
                "TIS": {"close": 49.75}
            },
            "portfolio": {"cash": 95000.0, "positions": {"MERI": 30, "TIS": 0}},
            "valuation": 98045.0
        }"#;

        let FeedMessage::Tick(tick) = parse_message(frame).unwrap() else {
            panic!("expected a tick");
        };
        assert_eq!(tick.date, NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
        assert_eq!(tick.market_data["MERI"].close, 101.5);
        assert_eq!(tick.market_data["MERI"].volume, Some(12000.0));
        assert_eq!(tick.portfolio.position("MERI"), 30);
        assert_eq!(tick.valuation, 98045.0);
    }

    #[test]
    fn test_parse_record_list_market_data() {
        let frame = r#"{
            "type": "TICK",
            "date": "2024-03-08",
            "marketData": [
                {"symbol": "MERI", "close": 101.5, "open": 100.0},
                {"symbol": "TIS", "close": 49.75}
            ],
            "portfolio": {"cash": 100000.0, "positions": {}},
            "valuation": 100000.0
        }"#;

        let FeedMessage::Tick(tick) = parse_message(frame).unwrap() else {
            panic!("expected a tick");
        };
        assert_eq!(tick.market_data.len(), 2);
        assert_eq!(tick.market_data["MERI"].open, Some(100.0));
        assert_eq!(tick.market_data["TIS"].close, 49.75);
    }

    #[test]
    fn test_short_positions_fold_into_net() {
        let frame = r#"{
            "type": "TICK",
            "date": "2024-03-08",
            "marketData": {"MERI": {"close": 101.5}, "TIS": {"close": 49.75}},
            "portfolio": {
                "cash": 100000.0,
                "positions": {"MERI": 20},
                "shortPositions": {"MERI": 5, "TIS": 40}
            },
            "valuation": 100000.0
        }"#;

        let FeedMessage::Tick(tick) = parse_message(frame).unwrap() else {
            panic!("expected a tick");
        };
        assert_eq!(tick.portfolio.position("MERI"), 15);
        assert_eq!(tick.portfolio.position("TIS"), -40);
    }

    #[test]
    fn test_non_tick_frames_are_control() {
        let frame = r#"{"type": "ORDER_ACK", "orderId": 7}"#;
        assert!(matches!(parse_message(frame).unwrap(), FeedMessage::Control));
    }

    #[test]
    fn test_garbage_is_an_error_not_a_panic() {
        assert!(parse_message("not json").is_err());
        assert!(parse_message(r#"{"type": "TICK"}"#).is_err());
    }
}
