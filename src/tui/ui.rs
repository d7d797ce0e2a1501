//! Main UI rendering coordinator.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use super::app::{App, Mode};
use super::components::{dashboard, message_log, status_bar};

const PROMPT: &str = "> ";

/// Renders the entire application UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status bar
            Constraint::Min(8),    // Log and dashboard
            Constraint::Length(3), // Input
            Constraint::Length(1), // Keybindings help
        ])
        .split(area);

    status_bar::render(frame, main_layout[0], app);

    match app.conversation.view() {
        Some(view) => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(main_layout[1]);
            message_log::render(frame, columns[0], app);
            dashboard::render(frame, columns[1], view);
        }
        None => message_log::render(frame, main_layout[1], app),
    }

    render_input(frame, main_layout[2], app);
    render_keybindings(frame, main_layout[3], app);
}

/// Renders the prompt line.
fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let is_insert = app.mode == Mode::Insert;
    let border_style = if app.conversation.is_busy() {
        Style::default().fg(Color::DarkGray)
    } else if is_insert {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = if is_insert {
        " Paste a token address or ask a question (INSERT) "
    } else {
        " Paste a token address or ask a question "
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = format!("{PROMPT}{}", app.input.as_str());
    frame.render_widget(Paragraph::new(text), inner);

    if is_insert {
        frame.set_cursor_position((cursor_x(inner, app.input.cursor_column()), inner.y));
    }
}

/// Screen column of the input cursor, kept inside the input box.
fn cursor_x(inner: Rect, column: u16) -> u16 {
    inner
        .x
        .saturating_add(PROMPT.len() as u16)
        .saturating_add(column)
        .min(inner.right().saturating_sub(1))
}

/// Renders the keybindings help line.
fn render_keybindings(frame: &mut Frame, area: Rect, app: &App) {
    let help = match app.mode {
        Mode::Insert => "[Enter]submit [Esc]normal [↑↓/PgUp/PgDn]scroll [Ctrl+C]quit",
        Mode::Normal => "[i]insert [j/k/↑↓/PgUp/PgDn]scroll [G]latest [q]quit",
    };

    let para = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, area);
}
