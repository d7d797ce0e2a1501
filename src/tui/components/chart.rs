//! ASCII candlestick chart with a price axis and time labels.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use rust_decimal::Decimal;

use crate::format::{ChartPoint, chart_points, format_currency, format_datetime, format_time};
use crate::models::candle::Candle;

/// Width of a price label; fits `$999.999999`.
const LABEL_WIDTH: usize = 11;

/// Columns taken by the price axis (label plus ` │`).
const AXIS_WIDTH: usize = LABEL_WIDTH + 2;

fn axis_label(price: Decimal) -> String {
    format!("{:>LABEL_WIDTH$}", format_currency(Some(price), 6))
}

/// Lowest low and highest high, padded when every price is equal.
fn price_bounds(points: &[ChartPoint]) -> Option<(Decimal, Decimal)> {
    let (mut min, mut max) = points.iter().fold(None, |acc, p| {
        let (lo, hi) = (p.y[2], p.y[1]);
        Some(match acc {
            None => (lo, hi),
            Some((min, max)) => (lo.min(min), hi.max(max)),
        })
    })?;
    if max <= min {
        let pad = if max.is_zero() {
            Decimal::ONE
        } else {
            max.abs() / Decimal::ONE_HUNDRED
        };
        max += pad;
        min -= pad;
    }
    Some((min, max))
}

/// Builds chart rows for the newest candles that fit into `width` x `height`.
///
/// The last row holds time labels; all rows above are price bands from the
/// highest high (top) to the lowest low (bottom), oldest candle leftmost.
pub fn chart_lines(candles: &[Candle], width: u16, height: u16) -> Vec<Line<'static>> {
    let columns = (width as usize).saturating_sub(AXIS_WIDTH);
    let rows = (height as usize).saturating_sub(1);
    if columns == 0 || rows == 0 || candles.is_empty() {
        return Vec::new();
    }

    let skip = candles.len().saturating_sub(columns);
    let points: Vec<ChartPoint> = chart_points(candles).skip(skip).collect();
    let Some((min_price, max_price)) = price_bounds(&points) else {
        return Vec::new();
    };

    let band = (max_price - min_price) / Decimal::from(rows as u64);
    let mut lines = Vec::with_capacity(rows + 1);

    for row in 0..rows {
        let band_top = max_price - band * Decimal::from(row as u64);
        let band_bottom = band_top - band;

        let mut spans = Vec::with_capacity(points.len() + 1);
        spans.push(Span::raw(format!("{} │", axis_label(band_top))));

        for point in &points {
            let [open, high, low, close] = point.y;
            let color = if close >= open { Color::Green } else { Color::Red };
            let body_top = open.max(close);
            let body_bottom = open.min(close);

            let glyph = if band_bottom < body_top && band_top > body_bottom {
                "█"
            } else if band_bottom <= high && band_top >= low {
                "│"
            } else {
                " "
            };
            spans.push(Span::styled(glyph, Style::default().fg(color)));
        }

        lines.push(Line::from(spans));
    }

    lines.push(time_axis(&points, columns));
    lines
}

fn time_axis(points: &[ChartPoint], columns: usize) -> Line<'static> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Line::default();
    };
    let start = format_time(first.x);
    let end = format_time(last.x);
    let gap = points.len().min(columns).saturating_sub(start.len() + end.len());
    let axis = if gap > 0 {
        format!("{start}{}{end}", " ".repeat(gap))
    } else {
        start
    };
    Line::from(Span::styled(
        format!("{:>LABEL_WIDTH$} └{axis}", ""),
        Style::default().fg(Color::DarkGray),
    ))
}

/// Renders the chart panel.
pub fn render(frame: &mut Frame, area: Rect, candles: &[Candle]) {
    let points = chart_points(candles);
    let title = match (points.clone().next(), points.last()) {
        (Some(from), Some(to)) => format!(
            " Chart {} → {} ",
            format_datetime(from.x),
            format_datetime(to.x)
        ),
        _ => " Chart ".to_string(),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = chart_lines(candles, inner.width, inner.height);
    if lines.is_empty() {
        let para = Paragraph::new("No chart data").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(para, inner);
    } else {
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
