// In crates/core-types/src/types.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tradable pair identifier (e.g., "BTCUSDT").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub String);

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol(value.to_string())
    }
}

/// A single candlestick bar, oldest-first when delivered in a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: i64,
}

/// The direction of an EMA crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Crossover {
    /// The short EMA crossed above the long EMA (bullish).
    Up,
    /// The short EMA crossed below the long EMA (bearish).
    Down,
}

impl Crossover {
    /// Human-readable label used in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Crossover::Up => "Up ↑ (Long)",
            Crossover::Down => "Down ↓ (Short)",
        }
    }

    /// The direction of a reversal from this one.
    pub fn opposite(&self) -> Self {
        match self {
            Crossover::Up => Crossover::Down,
            Crossover::Down => Crossover::Up,
        }
    }
}

impl fmt::Display for Crossover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crossover::Up => f.write_str("UP"),
            Crossover::Down => f.write_str("DOWN"),
        }
    }
}

/// One detection stream per instrument: a candle interval and the two EMA windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeSpec {
    /// Display label, also used as part of the state key (e.g., "15m").
    pub name: String,
    /// The interval token understood by the candle source (e.g., "15m", "1h").
    pub interval: String,
    pub short_window: usize,
    pub long_window: usize,
}

impl TimeframeSpec {
    /// The minimum number of bars needed for a conclusive detection.
    pub fn required_bars(&self) -> usize {
        self.long_window + 1
    }
}

/// The composite key of the crossover state map: one entry per (instrument, timeframe).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PairKey {
    pub symbol: Symbol,
    pub timeframe: String,
}

impl PairKey {
    pub fn new(symbol: &Symbol, timeframe: &TimeframeSpec) -> Self {
        Self {
            symbol: symbol.clone(),
            timeframe: timeframe.name.clone(),
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.symbol, self.timeframe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_displays_symbol_and_timeframe() {
        let tf = TimeframeSpec {
            name: "15m".to_string(),
            interval: "15m".to_string(),
            short_window: 20,
            long_window: 50,
        };
        let key = PairKey::new(&Symbol::from("BTCUSDT"), &tf);
        assert_eq!(key.to_string(), "BTCUSDT_15m");
        assert_eq!(tf.required_bars(), 51);
    }

    #[test]
    fn crossover_labels_and_opposites() {
        assert_eq!(Crossover::Up.opposite(), Crossover::Down);
        assert_eq!(Crossover::Down.opposite(), Crossover::Up);
        assert!(Crossover::Up.label().starts_with("Up"));
        assert!(Crossover::Down.label().starts_with("Down"));
    }
}
