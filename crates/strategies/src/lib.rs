// In crates/strategies/src/lib.rs

//! Indicator math and signal detection for the crossover scanner.
//!
//! Everything in this crate is pure: identical inputs always give identical outputs,
//! and nothing is cached between calls.

pub mod ema;
pub mod error;
pub mod ma_crossover;

// Re-export public types
pub use ema::{closing_prices, ema_series};
pub use error::{Error, Result};
pub use ma_crossover::{detect, detect_from_closes};
