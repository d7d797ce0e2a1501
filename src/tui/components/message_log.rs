//! Scrollable conversation log.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::format::{Segment, highlight};
use crate::session::{Message, Role};
use crate::tui::app::App;

/// Prefix printed before the first line of a message.
pub fn prefix(role: Role) -> &'static str {
    match role {
        Role::User => "USER> ",
        Role::System => "SYSTEM> ",
    }
}

fn prefix_style(role: Role) -> Style {
    let color = match role {
        Role::User => Color::Cyan,
        Role::System => Color::Green,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Converts one message into styled lines, highlighting figures in it.
pub fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, text) in message.text.lines().enumerate() {
        let mut spans = Vec::new();
        if i == 0 {
            spans.push(Span::styled(prefix(message.role), prefix_style(message.role)));
        }
        for segment in highlight(text) {
            spans.push(match segment {
                Segment::Plain(s) => Span::raw(s),
                Segment::Highlight(s) => Span::styled(
                    s,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            });
        }
        lines.push(Line::from(spans));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            prefix(message.role),
            prefix_style(message.role),
        )));
    }
    lines
}

/// Renders the message log, pinned to the bottom unless scrolled up.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Terminal ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    for message in app.conversation.messages() {
        lines.extend(message_lines(message));
        lines.push(Line::default());
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    let total = para.line_count(inner.width);
    let max_offset = total.saturating_sub(inner.height as usize);
    app.set_max_scroll(u16::try_from(max_offset).unwrap_or(u16::MAX));
    let offset = max_offset.saturating_sub(app.scroll as usize);
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);

    frame.render_widget(para.scroll((offset, 0)), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_carries_prefix() {
        let message = Message {
            id: 3,
            role: Role::System,
            text: "Price: $1.50K\nChange: ↑ 2.00%".to_string(),
        };
        let lines = message_lines(&message);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].content, "SYSTEM> ");
        assert_eq!(lines[0].spans[2].content, "$1.50K");
        assert_ne!(lines[1].spans[0].content, "SYSTEM> ");
    }

    #[test]
    fn empty_message_still_shows_prefix() {
        let message = Message {
            id: 1,
            role: Role::User,
            text: String::new(),
        };
        let lines = message_lines(&message);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans[0].content, "USER> ");
    }
}
