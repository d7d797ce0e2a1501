//! Terminal User Interface for BLYV Terminal.
//!
//! Ratatui front end: a message log, the token dashboard and a prompt line,
//! driven by an mpsc message loop.

pub mod app;
pub mod components;
pub mod event;
pub mod input;
pub mod terminal;
pub mod ui;

pub use app::App;
pub use event::{Action, Event, Message};
pub use terminal::{Tui, restore_terminal, setup_terminal};
pub use ui::render;
