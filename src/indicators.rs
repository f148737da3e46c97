//! indicators.rs — Technical indicators over close-price series.
//!
//! Pure functions; every "not enough data" case is `None`, never a fault.

/// Mean of the last `window` closes; `None` when the series is shorter.
pub fn sma(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    let tail = &closes[closes.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

/// RSI over the last `length` price deltas (14-period in production).
///
/// Average gain and average loss are plain means of the positive/negative
/// deltas in the window; a zero average loss saturates at 100.
pub fn rsi(closes: &[f64], length: usize) -> Option<f64> {
    if length == 0 || closes.len() < length + 1 {
        return None;
    }
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let tail = &deltas[deltas.len() - length..];
    let avg_gain = tail.iter().filter(|d| **d > 0.0).sum::<f64>() / length as f64;
    let avg_loss = tail.iter().filter(|d| **d < 0.0).map(|d| -d).sum::<f64>() / length as f64;
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Relative change of the latest close against the close seven rows back.
/// Needs at least eight closes; a zero base is treated as no data.
pub fn seven_day_return(closes: &[f64]) -> Option<f64> {
    if closes.len() < 8 {
        return None;
    }
    let latest = closes[closes.len() - 1];
    let base = closes[closes.len() - 8];
    if base == 0.0 {
        return None;
    }
    Some((latest - base) / base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn sma_is_the_tail_mean() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_close(sma(&closes, 2).unwrap(), 4.5);
        assert_close(sma(&closes, 5).unwrap(), 3.0);
        assert_eq!(sma(&closes, 6), None);
        assert_eq!(sma(&closes, 0), None);
    }

    #[test]
    fn rsi_saturates_at_100_when_prices_only_rise() {
        let closes = [1.0, 2.0, 3.0, 4.0];
        assert_close(rsi(&closes, 3).unwrap(), 100.0);
    }

    #[test]
    fn rsi_matches_hand_computed_value() {
        // deltas: +1, -1, +2; window 2 -> gains mean 1.0, losses mean 0.5
        let closes = [10.0, 11.0, 10.0, 12.0];
        let expected = 100.0 - 100.0 / (1.0 + 1.0 / 0.5);
        assert_close(rsi(&closes, 2).unwrap(), expected);
    }

    #[test]
    fn rsi_needs_length_plus_one_closes() {
        let closes = [10.0, 11.0, 12.0];
        assert_eq!(rsi(&closes, 3), None);
        assert!(rsi(&closes, 2).is_some());
    }

    #[test]
    fn seven_day_return_uses_the_shifted_close() {
        let closes = [100.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 110.0];
        // eight closes: latest 110 against closes[0] = 100
        assert_close(seven_day_return(&closes).unwrap(), 0.1);
    }

    #[test]
    fn seven_day_return_short_series_is_none() {
        let closes = [1.0; 7];
        assert_eq!(seven_day_return(&closes), None);
    }
}
