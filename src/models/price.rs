//! Spot price feed models (CoinGecko `simple/price`).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::decimal_from_value;

/// `{"solana": {"usd": 172.31}}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SimplePriceResponse(pub BTreeMap<String, BTreeMap<String, serde_json::Value>>);

impl SimplePriceResponse {
    /// Looks up the quote of `asset` in `currency`.
    pub fn quote(&self, asset: &str, currency: &str) -> Option<Decimal> {
        self.0
            .get(asset)
            .and_then(|quotes| quotes.get(currency))
            .and_then(decimal_from_value)
    }
}
