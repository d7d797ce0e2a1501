//! Application state for the TUI.

use std::cell::Cell;

use rust_decimal::Decimal;

use crate::session::Conversation;

use super::input::TextInput;

/// Braille spinner frames shown while a submission runs.
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Lines moved by PgUp/PgDn.
pub const PAGE_SCROLL: u16 = 10;

/// Input mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Keys navigate and `q` quits.
    Normal,
    /// Keys edit the input line.
    #[default]
    Insert,
}

/// Central application state container.
pub struct App {
    /// Message log, token view and submission state.
    pub conversation: Conversation,
    /// The prompt line.
    pub input: TextInput,
    pub mode: Mode,
    /// Lines scrolled up from the bottom of the message log.
    pub scroll: u16,
    /// Largest useful `scroll`, recorded by the message log on each draw.
    max_scroll: Cell<u16>,
    /// Latest SOL/USD price, if one was fetched.
    pub native_price: Option<Decimal>,
    /// Tick counter driving the spinner.
    pub spinner: usize,
    /// Flag to signal application should quit.
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            conversation: Conversation::new(),
            input: TextInput::new(),
            mode: Mode::default(),
            scroll: 0,
            max_scroll: Cell::new(0),
            native_price: None,
            spinner: 0,
            should_quit: false,
        }
    }

    /// Current spinner frame, or `None` when idle.
    pub fn spinner_frame(&self) -> Option<&'static str> {
        self.conversation
            .is_busy()
            .then(|| SPINNER_FRAMES[self.spinner % SPINNER_FRAMES.len()])
    }

    /// Advances the spinner while a submission runs.
    pub fn on_tick(&mut self) {
        if self.conversation.is_busy() {
            self.spinner = self.spinner.wrapping_add(1);
        }
    }

    /// Records how far the log can scroll at the current terminal size.
    pub fn set_max_scroll(&self, max: u16) {
        self.max_scroll.set(max);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self
            .scroll
            .saturating_add(lines)
            .min(self.max_scroll.get());
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self
            .scroll
            .min(self.max_scroll.get())
            .saturating_sub(lines);
    }

    /// Jumps back to the newest message.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll = 0;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
