//! Event handling for the TUI.

use std::time::Duration;

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::debug;

use crate::market::PriceFeed;
use crate::session::{Outcome, Submission, SubmissionState};

use super::app::{App, Mode, PAGE_SCROLL};

/// Events that can occur in the terminal.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// Text was pasted.
    Paste(String),
    /// Terminal was resized; the next draw reflows the layout.
    Resize,
    /// Periodic tick for UI updates.
    Tick,
}

/// Messages that update application state.
#[derive(Debug)]
pub enum Message {
    /// Input event from terminal.
    Input(Event),
    /// The running submission entered a new state.
    Progress { id: u64, state: SubmissionState },
    /// The running submission finished.
    Completed { id: u64, outcome: Outcome },
    /// Fresh SOL/USD price.
    NativePrice(Decimal),
}

/// Work the event loop must start outside of [`update`].
#[derive(Debug)]
pub enum Action {
    /// Drive an accepted submission.
    Submit(Submission),
}

/// Spawns a task that polls for terminal events and sends them to a channel.
pub fn spawn_event_reader(tx: mpsc::UnboundedSender<Message>) {
    tokio::spawn(async move {
        loop {
            match tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            })
            .await
            {
                Ok(Some(CrosstermEvent::Key(key))) if key.kind != KeyEventKind::Release => {
                    if tx.send(Message::Input(Event::Key(key))).is_err() {
                        break;
                    }
                }
                Ok(Some(CrosstermEvent::Paste(text))) => {
                    if tx.send(Message::Input(Event::Paste(text))).is_err() {
                        break;
                    }
                }
                Ok(Some(CrosstermEvent::Resize(..))) => {
                    if tx.send(Message::Input(Event::Resize)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });
}

/// Spawns a task that sends periodic tick events.
pub fn spawn_tick_timer(tx: mpsc::UnboundedSender<Message>, interval_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
        loop {
            interval.tick().await;
            if tx.send(Message::Input(Event::Tick)).is_err() {
                break;
            }
        }
    });
}

/// Spawns a task that refreshes the SOL price every `every`.
///
/// Failed fetches are logged and skipped; the header keeps the last price.
pub fn spawn_price_poller<P>(feed: P, tx: mpsc::UnboundedSender<Message>, every: Duration)
where
    P: PriceFeed + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match feed.fetch_native_price().await {
                Ok(price) => {
                    if tx.send(Message::NativePrice(price)).is_err() {
                        break;
                    }
                }
                Err(e) => debug!(error = %e, "SOL price refresh failed"),
            }
        }
    });
}

/// Updates application state based on a message.
pub fn update(app: &mut App, message: Message) -> Option<Action> {
    match message {
        Message::Input(event) => handle_input(app, event),
        Message::Progress { id, state } => {
            app.conversation.advance(id, state);
            None
        }
        Message::Completed { id, outcome } => {
            app.conversation.complete(id, outcome);
            app.scroll_to_bottom();
            None
        }
        Message::NativePrice(price) => {
            app.native_price = Some(price);
            None
        }
    }
}

/// Handles input events and updates application state.
fn handle_input(app: &mut App, event: Event) -> Option<Action> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Paste(text) => {
            if app.mode == Mode::Insert {
                app.input.insert_str(&text);
            }
            None
        }
        Event::Resize => None,
        Event::Tick => {
            app.on_tick();
            None
        }
    }
}

/// Handles key press events.
fn handle_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    // Global keys (work in any mode)
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return None;
        }
        KeyCode::Up => {
            app.scroll_up(1);
            return None;
        }
        KeyCode::Down => {
            app.scroll_down(1);
            return None;
        }
        KeyCode::PageUp => {
            app.scroll_up(PAGE_SCROLL);
            return None;
        }
        KeyCode::PageDown => {
            app.scroll_down(PAGE_SCROLL);
            return None;
        }
        _ => {}
    }

    match app.mode {
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Insert => handle_insert_mode(app, key),
    }
}

/// Handles keys in normal mode.
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Enter => app.mode = Mode::Insert,
        KeyCode::Char('k') => app.scroll_up(1),
        KeyCode::Char('j') => app.scroll_down(1),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),
        _ => {}
    }
    None
}

/// Handles keys in insert mode (text input).
fn handle_insert_mode(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => app.mode = Mode::Normal,
        KeyCode::Enter => {
            let submission = app.conversation.submit(app.input.as_str())?;
            app.input.clear();
            app.scroll_to_bottom();
            return Some(Action::Submit(submission));
        }
        KeyCode::Char(c) => app.input.insert(c),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Home => app.input.move_home(),
        KeyCode::End => app.input.move_end(),
        _ => {}
    }
    None
}
