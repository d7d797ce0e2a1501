//! Header bar: SOL price, title and submission state.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::format::format_currency;
use crate::session::SubmissionState;
use crate::tui::app::App;

pub const TITLE: &str = "BLYV Terminal";

/// Renders the status bar.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let price = Span::styled(
        format!(" SOL: {} ", format_currency(app.native_price, 2)),
        Style::default().fg(Color::Cyan),
    );

    let title = Span::styled(
        format!(" {TITLE} "),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    );

    let conversation = &app.conversation;
    let ready = SubmissionState::Idle.label();
    let (state_text, state_color) = match (app.spinner_frame(), conversation.last_exit()) {
        (Some(frame), _) => (
            format!(" {frame} {} ", conversation.state().label()),
            Color::Yellow,
        ),
        (None, Some(SubmissionState::Failed)) => {
            (format!(" {ready} (last request failed) "), Color::Red)
        }
        (None, _) => (format!(" {ready} "), Color::Green),
    };

    let line = Line::from(vec![
        price,
        Span::raw("│"),
        title,
        Span::raw("│"),
        Span::styled(state_text, Style::default().fg(state_color)),
    ]);

    let para = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}
