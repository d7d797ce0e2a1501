//! Token dashboard: header, candlestick chart and stat tiles.

use ratatui::{
    Frame,
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::format::{Direction, PLACEHOLDER, format_currency, format_percent};
use crate::models::token::TokenSnapshot;
use crate::session::TokenView;

use super::chart;

/// Network shown on the dashboard.
pub const NETWORK: &str = "Solana";

/// Shortens an address to `ABCD…WXYZ`.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

/// The four stat tiles as `(label, value)`.
pub fn stat_tiles(snapshot: &TokenSnapshot) -> [(&'static str, String); 4] {
    [
        ("Market Cap", format_currency(snapshot.market_cap_usd, 2)),
        ("24h Volume", format_currency(snapshot.volume_24h_usd, 2)),
        (
            "Creator",
            snapshot
                .creator_address
                .as_deref()
                .map_or_else(|| PLACEHOLDER.to_string(), short_address),
        ),
        ("Network", NETWORK.to_string()),
    ]
}

/// Renders the dashboard for the token on screen.
pub fn render(frame: &mut Frame, area: Rect, view: &TokenView) {
    let snapshot = &view.snapshot;
    let block = Block::default()
        .title(format!(" {} ({}) ", snapshot.name, snapshot.symbol))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(2), // Price, change, mint
            Constraint::Min(6),    // Chart
            Constraint::Length(3), // Stat tiles
        ])
        .split(inner);

    render_header(frame, layout[0], snapshot);
    chart::render(frame, layout[1], &view.candles);
    render_tiles(frame, layout[2], snapshot);
}

fn render_header(frame: &mut Frame, area: Rect, snapshot: &TokenSnapshot) {
    let change = format_percent(snapshot.price_change_24h_pct);
    let change_color = match change.direction {
        Some(Direction::Up) => Color::Green,
        Some(Direction::Down) => Color::Red,
        None => Color::DarkGray,
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format_currency(snapshot.price_usd, 6),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(format!("{change} (24h)"), Style::default().fg(change_color)),
        ]),
        Line::from(Span::styled(
            snapshot.address.clone(),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_tiles(frame: &mut Frame, area: Rect, snapshot: &TokenSnapshot) {
    let columns = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((label, value), col) in stat_tiles(snapshot).into_iter().zip(columns.iter()) {
        let block = Block::default()
            .title(format!(" {label} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let para = Paragraph::new(value).block(block);
        frame.render_widget(para, *col);
    }
}
