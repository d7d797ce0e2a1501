//! Market data clients.
//!
//! [`TrackerClient`] talks to the Solana Tracker style token and chart
//! endpoints; [`CoinGeckoClient`] reads the SOL spot price. Neither retries:
//! every submission re-fetches and every failure is reported once.
//!
//! Failures are split in two: anything that never produced an HTTP response
//! is [`BlyvError::Network`], anything the server answered without usable
//! data (non-2xx, malformed body, missing token or chart) is
//! [`BlyvError::NotFound`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::models::candle::{Candle, ChartResponse};
use crate::models::price::SimplePriceResponse;
use crate::models::token::{TokenResponse, TokenSnapshot};
use crate::{BlyvError, Result};

/// Source of token snapshots and chart candles.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Looks up token metadata and first-pool market data.
    async fn fetch_token(&self, address: &str) -> Result<TokenSnapshot>;

    /// Looks up chronologically ordered OHLC candles.
    async fn fetch_candles(&self, address: &str) -> Result<Vec<Candle>>;
}

/// Source of the network's native asset price in USD.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_native_price(&self) -> Result<Decimal>;
}

/// Builds the shared HTTP client with a bounded per-request timeout.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BlyvError::Config(format!("failed to build HTTP client: {e}")))
}

/// Token and chart API client.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TrackerClient {
    pub fn new(client: Client, config: &TrackerConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// URL of the token lookup for `address`.
    pub fn token_url(&self, address: &str) -> String {
        format!("{}/tokens/{}", self.base_url, address.trim())
    }

    /// URL of the chart lookup for `address`.
    pub fn chart_url(&self, address: &str) -> String {
        format!("{}/chart/{}", self.base_url, address.trim())
    }

    /// Issues an authenticated GET and decodes the body as `T`.
    async fn get_json<T: DeserializeOwned>(&self, context: &str, url: &str) -> Result<T> {
        debug!(%url, "GET {context}");
        let response = self
            .client
            .get(url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| BlyvError::from_transport(context, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, context, "upstream returned error status");
            return Err(BlyvError::NotFound(format!("{context}: HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BlyvError::from_transport(context, e))?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, context, "upstream body did not parse");
            BlyvError::NotFound(format!("{context}: unreadable body: {e}"))
        })
    }
}

#[async_trait]
impl MarketData for TrackerClient {
    async fn fetch_token(&self, address: &str) -> Result<TokenSnapshot> {
        let response: TokenResponse = self.get_json("token", &self.token_url(address)).await?;
        TokenSnapshot::from_response(address, response)
            .ok_or_else(|| BlyvError::NotFound(format!("no token metadata for {address}")))
    }

    async fn fetch_candles(&self, address: &str) -> Result<Vec<Candle>> {
        let response: ChartResponse = self.get_json("chart", &self.chart_url(address)).await?;
        let candles = response
            .into_candles()
            .ok_or_else(|| BlyvError::NotFound(format!("no chart data for {address}")))?;
        debug!(address, count = candles.len(), "chart loaded");
        Ok(candles)
    }
}

/// SOL/USD spot price client.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: Client,
    url: String,
}

impl CoinGeckoClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoClient {
    async fn fetch_native_price(&self) -> Result<Decimal> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| BlyvError::from_transport("price", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BlyvError::Network(format!("price: HTTP {status}")));
        }

        let body: SimplePriceResponse = response
            .json()
            .await
            .map_err(|e| BlyvError::MalformedResponse(format!("price: {e}")))?;
        body.quote("solana", "usd")
            .ok_or_else(|| BlyvError::MalformedResponse("price: missing solana.usd".into()))
    }
}
