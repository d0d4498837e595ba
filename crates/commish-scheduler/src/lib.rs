//! # Commish Scheduler
//! Cron parsing and recurring tickers.
//!
//! Each of the commissioner's triggers is one [`Ticker`]: an independently
//! scheduled cron loop running as a tokio task. Tickers are the error
//! boundary for everything they run; a failed tick is logged and the ticker
//! keeps firing on schedule.

pub mod cron;
pub mod ticker;

pub use ticker::{Ticker, TickerHandle};
