// In crates/strategies/src/ema.rs

use crate::{Error, Result};
use core_types::Kline;
use num_traits::cast::ToPrimitive;
use ta::Next;
use ta::indicators::ExponentialMovingAverage as Ema;

/// Computes an exponential moving average over the whole price series.
///
/// The smoothing factor is `k = 2 / (period + 1)`. The first output is the first
/// price itself (no SMA warm-up), and every later value is
/// `price * k + previous * (1 - k)`. The output is index-aligned with the input.
///
/// Returns `Error::InvalidPeriod` for a zero period.
pub fn ema_series(prices: &[f64], period: usize) -> Result<Vec<f64>> {
    // `ta`'s EMA seeds with the first sample, which is exactly the seeding we want.
    let mut ema = Ema::new(period).map_err(|_| Error::InvalidPeriod(period))?;
    Ok(prices.iter().map(|&price| ema.next(price)).collect())
}

/// Extracts the closing price of each kline as `f64`, preserving order.
pub fn closing_prices(klines: &[Kline]) -> Result<Vec<f64>> {
    klines
        .iter()
        .map(|k| k.close.to_f64().ok_or(Error::UnrepresentablePrice(k.close)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn constant_series_is_a_fixed_point() {
        for len in [1, 2, 7, 60] {
            let prices = vec![42.5; len];
            let ema = ema_series(&prices, 20).unwrap();
            assert_eq!(ema.len(), len);
            for value in ema {
                assert_close(value, 42.5);
            }
        }
    }

    #[test]
    fn seeds_with_first_price_and_applies_smoothing() {
        // period 3 -> k = 0.5
        let ema = ema_series(&[10.0, 20.0, 30.0], 3).unwrap();
        assert_close(ema[0], 10.0);
        assert_close(ema[1], 15.0);
        assert_close(ema[2], 22.5);
    }

    #[test]
    fn period_one_tracks_price_exactly() {
        let prices = [3.0, 9.0, 1.0, 4.0];
        let ema = ema_series(&prices, 1).unwrap();
        for (e, p) in ema.iter().zip(prices.iter()) {
            assert_close(*e, *p);
        }
    }

    #[test]
    fn shorter_period_tracks_a_rising_series_faster() {
        let prices: Vec<f64> = (0..100).map(|i| 100.0 + i as f64 * 0.75).collect();
        let fast = ema_series(&prices, 20).unwrap();
        let slow = ema_series(&prices, 50).unwrap();
        assert_close(fast[0], slow[0]);
        for i in 1..prices.len() {
            assert!(fast[i] >= slow[i], "index {i}: {} < {}", fast[i], slow[i]);
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(ema_series(&[], 20).unwrap().is_empty());
    }

    #[test]
    fn zero_period_is_rejected() {
        assert_eq!(ema_series(&[1.0], 0), Err(Error::InvalidPeriod(0)));
    }

    #[test]
    fn closing_prices_keeps_kline_order() {
        let kline = |close| Kline {
            open_time: 0,
            open: dec!(1),
            high: dec!(1),
            low: dec!(1),
            close,
            volume: dec!(0),
            close_time: 0,
        };
        let closes = closing_prices(&[kline(dec!(101.5)), kline(dec!(99.25))]).unwrap();
        assert_eq!(closes, vec![101.5, 99.25]);
    }
}
