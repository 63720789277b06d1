use pairbot::api::{feed, VenueClient};
use pairbot::execution::OrderSink;
use pairbot::models::{default_pair, OrderRequest};
use pairbot::strategy::StrategyConfig;
use pairbot::TradingEngine;
use tokio::sync::mpsc;

const DEFAULT_WS_URL: &str = "wss://hkt25.codeontime.fr/ws/simulation";
const DEFAULT_API_URL: &str = "https://hkt25.codeontime.fr/api";

/// Hands decided orders to the dispatch channel. Transmission happens on
/// the order task, so the engine never blocks on the venue and never sees
/// transmission failures.
struct ChannelSink {
    tx: mpsc::UnboundedSender<OrderRequest>,
}

impl OrderSink for ChannelSink {
    fn transmit_order(&mut self, order: OrderRequest) {
        if self.tx.send(order).is_err() {
            tracing::error!("order channel closed, dropping order");
        }
    }
}

#[tokio::main]
async fn main() -> pairbot::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let team_code = std::env::var("TEAM_CODE").expect("TEAM_CODE not found in environment");
    let api_url = std::env::var("VENUE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let ws_url = std::env::var("VENUE_WS_URL")
        .unwrap_or_else(|_| format!("{}?code={}", DEFAULT_WS_URL, team_code));
    let pair = pair_from_env();
    let config = StrategyConfig::default();

    tracing::info!("🚀 pairbot starting");
    tracing::info!("  Pair: {} / {}", pair[0], pair[1]);
    tracing::info!("  Momentum window: {}", config.momentum_window);
    tracing::info!("  Volatility window: {}", config.volatility_window);
    tracing::info!("  Drawdown stop: {}%", config.drawdown_stop * 100.0);

    let venue = VenueClient::new(api_url, team_code);
    venue.start_simulation().await?;

    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
    let (order_tx, mut order_rx) = mpsc::unbounded_channel::<OrderRequest>();

    // Boundary task: websocket in, canonical ticks out
    let feed_task = tokio::spawn(async move {
        if let Err(e) = feed::run_feed(&ws_url, tick_tx).await {
            tracing::error!("feed terminated: {}", e);
        }
    });

    // Outbound order channel: fire-and-forget from the engine's view
    let order_task = {
        let venue = venue.clone();
        tokio::spawn(async move {
            while let Some(order) = order_rx.recv().await {
                match venue.post_order(&order).await {
                    Ok(()) => tracing::info!(
                        instrument = %order.instrument,
                        side = ?order.side,
                        quantity = order.quantity,
                        "order placed"
                    ),
                    Err(e) => tracing::warn!("order rejected by venue: {}", e),
                }
            }
        })
    };

    // Single consumer: one tick at a time, processed to completion
    let engine_task = tokio::spawn(async move {
        let mut engine = TradingEngine::new(pair, config);
        let mut sink = ChannelSink { tx: order_tx };
        while let Some(tick) = tick_rx.recv().await {
            engine.process_tick(&tick, &mut sink);
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received Ctrl+C, shutting down");
        }
        result = feed_task => {
            tracing::error!("feed task exited: {:?}", result);
        }
        result = engine_task => {
            tracing::error!("engine task exited: {:?}", result);
        }
        result = order_task => {
            tracing::error!("order task exited: {:?}", result);
        }
    }

    venue.stop_simulation().await?;
    tracing::info!("👋 pairbot stopped");
    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("pairbot=info")
        .init();
}

fn pair_from_env() -> [String; 2] {
    let default = default_pair();
    [
        std::env::var("INSTRUMENT_A").unwrap_or(default[0].clone()),
        std::env::var("INSTRUMENT_B").unwrap_or(default[1].clone()),
    ]
}
