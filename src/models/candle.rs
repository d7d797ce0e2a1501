//! OHLC chart models (`GET /chart/{mint}`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{lenient_count, lenient_decimal};

/// Raw response of the chart endpoint.
///
/// The provider spells the list `oclhv`; a missing list means the mint
/// has no chart.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartResponse {
    #[serde(default)]
    pub oclhv: Option<Vec<RawCandle>>,
}

/// One bar as sent by the provider; every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCandle {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub open: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub high: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub low: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub close: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub volume: Option<Decimal>,
    /// Bar open time in whole seconds since the epoch.
    #[serde(default, deserialize_with = "lenient_count")]
    pub time: Option<u64>,
}

/// A single OHLC candlestick bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub timestamp_secs: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Option<Decimal>,
}

impl Candle {
    /// Whether the bar closed at or above its open.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

impl TryFrom<RawCandle> for Candle {
    type Error = ();

    fn try_from(raw: RawCandle) -> Result<Self, Self::Error> {
        Ok(Candle {
            timestamp_secs: raw.time.and_then(|t| i64::try_from(t).ok()).ok_or(())?,
            open: raw.open.ok_or(())?,
            high: raw.high.ok_or(())?,
            low: raw.low.ok_or(())?,
            close: raw.close.ok_or(())?,
            volume: raw.volume,
        })
    }
}

impl ChartResponse {
    /// Converts the response into chronologically ordered candles.
    ///
    /// Returns `None` when the chart list is absent. Bars missing any OHLC
    /// field or their timestamp are dropped.
    pub fn into_candles(self) -> Option<Vec<Candle>> {
        let mut candles: Vec<Candle> = self
            .oclhv?
            .into_iter()
            .filter_map(|raw| Candle::try_from(raw).ok())
            .collect();
        candles.sort_by_key(|c| c.timestamp_secs);
        Some(candles)
    }
}
