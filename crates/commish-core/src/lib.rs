//! # Commish Core
//! Shared configuration, error and domain types for the commissioner bot.

pub mod config;
pub mod error;
pub mod types;

pub use config::CommishConfig;
pub use error::{CommishError, Result};
pub use types::{Phase, WeekAdvance};
