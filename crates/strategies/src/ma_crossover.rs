// In crates/strategies/src/ma_crossover.rs

use crate::Result;
use crate::ema::ema_series;
use core_types::Crossover;

/// Detects whether the short EMA crossed the long EMA on the most recent step.
///
/// Only the last two index pairs are inspected:
/// `prev = short[n-2] - long[n-2]`, `curr = short[n-1] - long[n-1]`.
/// A crossing requires a strict sign change, so a difference of exactly zero on
/// either step is never reported. Returns `None` when the sequences differ in
/// length or hold fewer than two values.
pub fn detect(short_ema: &[f64], long_ema: &[f64]) -> Option<Crossover> {
    let n = short_ema.len();
    if n < 2 || long_ema.len() != n {
        return None;
    }

    let prev_diff = short_ema[n - 2] - long_ema[n - 2];
    let curr_diff = short_ema[n - 1] - long_ema[n - 1];

    if prev_diff < 0.0 && curr_diff > 0.0 {
        // Bullish: short line just crossed above the long line.
        Some(Crossover::Up)
    } else if prev_diff > 0.0 && curr_diff < 0.0 {
        // Bearish: short line just crossed below the long line.
        Some(Crossover::Down)
    } else {
        None
    }
}

/// Runs both EMAs over the closing prices and reports a crossover on the last bar.
pub fn detect_from_closes(
    closes: &[f64],
    short_window: usize,
    long_window: usize,
) -> Result<Option<Crossover>> {
    let short_ema = ema_series(closes, short_window)?;
    let long_ema = ema_series(closes, long_window)?;
    Ok(detect(&short_ema, &long_ema))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_crossing_above_is_up() {
        // prev diff = 99 - 100 = -1, curr diff = 101 - 100.5 = 0.5
        let short = [98.0, 99.0, 101.0];
        let long = [100.0, 100.0, 100.5];
        assert_eq!(detect(&short, &long), Some(Crossover::Up));
    }

    #[test]
    fn short_crossing_below_is_down() {
        let short = [101.0, 99.0];
        let long = [100.5, 100.0];
        assert_eq!(detect(&short, &long), Some(Crossover::Down));
    }

    #[test]
    fn negating_both_diffs_swaps_direction() {
        let cases = [(-1.0, 0.5), (0.25, -3.0), (-2.0, -1.0), (4.0, 0.0)];
        for (prev, curr) in cases {
            let long = [0.0, 0.0];
            let original = detect(&[prev, curr], &long);
            let negated = detect(&[-prev, -curr], &long);
            assert_eq!(negated, original.map(|c| c.opposite()), "prev={prev} curr={curr}");
        }
    }

    #[test]
    fn same_side_is_no_crossover() {
        assert_eq!(detect(&[101.0, 102.0], &[100.0, 100.0]), None);
        assert_eq!(detect(&[98.0, 97.0], &[100.0, 100.0]), None);
    }

    #[test]
    fn touching_at_exact_zero_is_not_a_crossover() {
        assert_eq!(detect(&[99.0, 100.0], &[100.0, 100.0]), None);
        assert_eq!(detect(&[100.0, 101.0], &[100.0, 100.0]), None);
        assert_eq!(detect(&[100.0, 99.0], &[100.0, 100.0]), None);
    }

    #[test]
    fn too_short_or_mismatched_input_is_no_crossover() {
        assert_eq!(detect(&[1.0], &[2.0]), None);
        assert_eq!(detect(&[], &[]), None);
        assert_eq!(detect(&[1.0, 3.0], &[2.0, 2.0, 2.0]), None);
    }

    #[test]
    fn reversal_after_a_long_decline_is_detected_on_the_last_bar() {
        // Sixty bars falling, then a sharp jump on the final bar pulls the fast EMA above.
        let mut closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        assert_eq!(detect_from_closes(&closes, 20, 50).unwrap(), None);
        closes.push(400.0);
        assert_eq!(detect_from_closes(&closes, 20, 50).unwrap(), Some(Crossover::Up));
    }

    #[test]
    fn flat_prices_never_cross() {
        let closes = vec![100.0; 61];
        assert_eq!(detect_from_closes(&closes, 20, 50).unwrap(), None);
    }
}
