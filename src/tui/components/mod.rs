//! Reusable UI panels.

pub mod chart;
pub mod dashboard;
pub mod message_log;
pub mod status_bar;
