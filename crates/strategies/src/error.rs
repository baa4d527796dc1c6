// In crates/strategies/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("EMA period must be at least 1, got {0}")]
    InvalidPeriod(usize),

    #[error("Kline close price {0} cannot be represented as f64")]
    UnrepresentablePrice(rust_decimal::Decimal),
}

pub type Result<T> = std::result::Result<T, Error>;
