use crate::models::{OrderRequest, Side};
use reqwest::Client;
use serde::Serialize;

/// REST client for the simulation venue.
///
/// Orders are fire-and-forget from the engine's point of view: the caller
/// logs the outcome, but a rejection never re-enters the decision stack —
/// the cooldown was already claimed when the order was decided.
#[derive(Clone)]
pub struct VenueClient {
    client: Client,
    base_url: String,
    team_code: String,
}

#[derive(Debug, Serialize)]
struct OrderPayload<'a> {
    symbol: &'a str,
    action: Side,
    quantity: u64,
}

impl VenueClient {
    pub fn new(base_url: impl Into<String>, team_code: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            team_code: team_code.into(),
        }
    }

    /// Transmit one order. No retry; the venue either takes it or it is
    /// gone.
    pub async fn post_order(&self, order: &OrderRequest) -> crate::Result<()> {
        let payload = OrderPayload {
            symbol: &order.instrument,
            action: order.side,
            quantity: order.quantity,
        };
        let response = self
            .client
            .post(format!("{}/order", self.base_url))
            .header("X-Team-Code", &self.team_code)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("order rejected with status {}", response.status()).into());
        }
        Ok(())
    }

    pub async fn start_simulation(&self) -> crate::Result<()> {
        self.control("start").await
    }

    pub async fn stop_simulation(&self) -> crate::Result<()> {
        self.control("stop").await
    }

    pub async fn pause_simulation(&self) -> crate::Result<()> {
        self.control("pause").await
    }

    async fn control(&self, action: &str) -> crate::Result<()> {
        let response = self
            .client
            .post(format!("{}/simulation/{}", self.base_url, action))
            .header("X-Team-Code", &self.team_code)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!(
                "simulation {} failed with status {}",
                action,
                response.status()
            )
            .into());
        }
        tracing::info!(action, "simulation control accepted");
        Ok(())
    }
}
