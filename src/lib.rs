//! BLYV Terminal library.
//!
//! Looks up Solana tokens by mint address, charts their recent candles and
//! narrates the numbers; free-text questions go straight to the narrator.

pub mod address;
pub mod config;
pub mod credentials;
pub mod error;
pub mod format;
pub mod market;
pub mod models;
pub mod narration;
pub mod session;
pub mod tui;

pub use error::{BlyvError, Result};
