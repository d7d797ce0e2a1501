//! Display formatting for prices, percentages, chart points and narration.
//!
//! Everything here is pure and total: absent values render as
//! [`PLACEHOLDER`] instead of failing.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::address;
use crate::models::candle::Candle;

/// Rendered for values the provider did not send.
pub const PLACEHOLDER: &str = "-";

const THOUSAND: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);
const MILLION: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats a USD amount.
///
/// `>= 1M` renders as `$X.XXM`, `>= 1K` as `$X.XXK`, anything smaller as a
/// full decimal with `precision` fractional digits.
pub fn format_currency(value: Option<Decimal>, precision: u32) -> String {
    let Some(value) = value else {
        return PLACEHOLDER.to_string();
    };
    if value >= MILLION {
        format!("${:.2}M", round(value / MILLION, 2))
    } else if value >= THOUSAND {
        format!("${:.2}K", round(value / THOUSAND, 2))
    } else {
        let digits = precision as usize;
        format!("${:.digits$}", round(value, precision))
    }
}

/// Direction of a percentage change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
        }
    }
}

/// A formatted percentage: unsigned two-decimal magnitude plus direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Percent {
    /// `None` when the value was absent.
    pub direction: Option<Direction>,
    pub magnitude: String,
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Some(d) => write!(f, "{} {}", d.arrow(), self.magnitude),
            None => f.write_str(&self.magnitude),
        }
    }
}

/// Formats a percentage change; zero counts as up.
pub fn format_percent(value: Option<Decimal>) -> Percent {
    match value {
        None => Percent {
            direction: None,
            magnitude: PLACEHOLDER.to_string(),
        },
        Some(v) => Percent {
            direction: Some(if v >= Decimal::ZERO {
                Direction::Up
            } else {
                Direction::Down
            }),
            magnitude: format!("{:.2}%", round(v.abs(), 2)),
        },
    }
}

/// Formats a timestamp for axis labels and tooltips.
pub fn format_datetime(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Short time-of-day label for the chart axis.
pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%H:%M").to_string()
}

/// One candlestick ready for the chart widget.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub x: DateTime<Utc>,
    /// `[open, high, low, close]`
    pub y: [Decimal; 4],
}

/// Lazy, restartable view of candles as chart points.
///
/// Cloning the iterator restarts from the same position; the input order is
/// preserved one-to-one.
#[derive(Debug, Clone)]
pub struct ChartPoints<'a> {
    inner: std::slice::Iter<'a, Candle>,
}

impl Iterator for ChartPoints<'_> {
    type Item = ChartPoint;

    fn next(&mut self) -> Option<ChartPoint> {
        self.inner.next().map(to_point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ChartPoints<'_> {}

impl DoubleEndedIterator for ChartPoints<'_> {
    fn next_back(&mut self) -> Option<ChartPoint> {
        self.inner.next_back().map(to_point)
    }
}

fn to_point(candle: &Candle) -> ChartPoint {
    ChartPoint {
        x: DateTime::from_timestamp(candle.timestamp_secs, 0).unwrap_or(DateTime::UNIX_EPOCH),
        y: [candle.open, candle.high, candle.low, candle.close],
    }
}

/// Maps candles to chart points without copying them up front.
pub fn chart_points(candles: &[Candle]) -> ChartPoints<'_> {
    ChartPoints {
        inner: candles.iter(),
    }
}

/// A piece of narrated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    /// Dollar amount, percentage, or on-chain address.
    Highlight(String),
}

static HIGHLIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \$[0-9]+(?:,[0-9]{3})*(?:\.[0-9]+)?[KMB]?   # $1,234.56 / $2.50M
        | [-+]?[0-9]+(?:\.[0-9]+)?%                 # -3.46%
        | [1-9A-HJ-NP-Za-km-z]{32,44}               # base58 address candidate
        ",
    )
    .expect("highlight pattern is valid")
});

/// Splits narration into plain and highlighted segments.
///
/// Address candidates are only highlighted when they classify as real
/// addresses. The text is never interpreted as markup.
pub fn highlight(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut last = 0;

    for m in HIGHLIGHT_RE.find_iter(text) {
        let token = m.as_str();
        let is_address_like = token.chars().all(|c| c.is_ascii_alphanumeric());
        if is_address_like && !address::is_address(token) {
            continue;
        }
        plain.push_str(&text[last..m.start()]);
        if !plain.is_empty() {
            segments.push(Segment::Plain(std::mem::take(&mut plain)));
        }
        segments.push(Segment::Highlight(token.to_string()));
        last = m.end();
    }

    plain.push_str(&text[last..]);
    if !plain.is_empty() {
        segments.push(Segment::Plain(plain));
    }
    segments
}
