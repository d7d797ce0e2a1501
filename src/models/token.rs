//! Token lookup models (`GET /tokens/{mint}`).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{lenient_count, lenient_decimal, null_as_default};

/// Name shown when the provider has no metadata name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Placeholder for any absent text field.
pub const NOT_AVAILABLE: &str = "N/A";

/// Raw response of the token lookup endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<TokenMetadata>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pools: Vec<PoolData>,
    /// Price events keyed by window (`1h`, `24h`, ...); a window may be `null`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: BTreeMap<String, Option<PriceEvent>>,
    #[serde(default)]
    pub risk: Option<RiskData>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub holders: Option<u64>,
}

/// Token metadata block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub mint: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub decimals: Option<u64>,
    pub image: Option<String>,
    #[serde(default)]
    pub creation: Option<CreationData>,
    /// Free-form social links (`twitter`, `telegram`, `website`, ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub extensions: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "strictSocials", deserialize_with = "null_as_default")]
    pub strict_socials: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreationData {
    pub creator: Option<String>,
}

/// A USD-denominated quote inside a pool record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsdQuote {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub usd: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolTransactions {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub volume: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub buys: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub sells: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total: Option<u64>,
}

/// One liquidity pool; only the first one is displayed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolData {
    #[serde(default)]
    pub price: Option<UsdQuote>,
    #[serde(default)]
    pub market_cap: Option<UsdQuote>,
    #[serde(default)]
    pub liquidity: Option<UsdQuote>,
    #[serde(default)]
    pub txns: Option<PoolTransactions>,
    pub deployer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEvent {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price_change_percentage: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskData {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub score: Option<Decimal>,
    #[serde(default)]
    pub snipers: Option<HolderGroup>,
    #[serde(default)]
    pub insiders: Option<HolderGroup>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risks: Vec<RiskItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HolderGroup {
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskItem {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl RiskItem {
    /// Human-readable description, falling back to the short name.
    fn text(&self) -> Option<String> {
        self.description
            .as_deref()
            .or(self.name.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }
}

/// Security findings attached to a token.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskReport {
    pub score: Option<Decimal>,
    pub snipers: Option<u64>,
    pub insiders: Option<u64>,
    pub risks: Vec<String>,
}

/// Immutable token data displayed after a successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenSnapshot {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub image_url: Option<String>,
    pub price_usd: Option<Decimal>,
    pub market_cap_usd: Option<Decimal>,
    pub volume_24h_usd: Option<Decimal>,
    pub liquidity_usd: Option<Decimal>,
    pub price_change_24h_pct: Option<Decimal>,
    pub transactions: Option<u64>,
    pub creator_address: Option<String>,
    pub risk: RiskReport,
    pub holder_count: Option<u64>,
    pub social_links: BTreeMap<String, String>,
}

impl TokenSnapshot {
    /// Builds a snapshot from a lookup response.
    ///
    /// Returns `None` when the response carries no token metadata, which the
    /// provider does for unknown mints. `requested` is used as the address
    /// when the metadata omits the mint.
    pub fn from_response(requested: &str, response: TokenResponse) -> Option<Self> {
        let token = response.token?;
        let pool = response.pools.into_iter().next().unwrap_or_default();
        let change = response
            .events
            .get("24h")
            .and_then(|e| e.as_ref())
            .and_then(|e| e.price_change_percentage);

        let risk = response
            .risk
            .map(|r| RiskReport {
                score: r.score,
                snipers: r.snipers.and_then(|g| g.count),
                insiders: r.insiders.and_then(|g| g.count),
                risks: r.risks.iter().filter_map(RiskItem::text).collect(),
            })
            .unwrap_or_default();

        let social_links = token
            .extensions
            .iter()
            .chain(token.strict_socials.iter())
            .filter_map(|(platform, v)| {
                v.as_str()
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(|url| (platform.clone(), url.to_string()))
            })
            .collect();

        let txns = pool.txns.unwrap_or_default();

        Some(Self {
            address: non_blank(token.mint).unwrap_or_else(|| requested.trim().to_string()),
            name: non_blank(token.name).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            symbol: non_blank(token.symbol).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            decimals: token
                .decimals
                .and_then(|d| u8::try_from(d).ok())
                .unwrap_or_default(),
            image_url: non_blank(token.image),
            price_usd: pool.price.and_then(|p| p.usd),
            market_cap_usd: pool.market_cap.and_then(|p| p.usd),
            volume_24h_usd: txns.volume,
            liquidity_usd: pool.liquidity.and_then(|p| p.usd),
            price_change_24h_pct: change,
            transactions: txns.total,
            creator_address: non_blank(token.creation.and_then(|c| c.creator))
                .or_else(|| non_blank(pool.deployer)),
            risk,
            holder_count: response.holders,
            social_links,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
