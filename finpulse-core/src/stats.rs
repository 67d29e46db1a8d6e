//! Statistics helpers shared by the analytics and risk engines.
//!
//! Every function is pure: slice in, scalar or vector out. Degenerate inputs
//! (too few values) return `None` instead of a sentinel.

/// Simple returns `x[i] / x[i-1] - 1` by sequence position.
///
/// `n` prices give `n - 1` returns. Values are not filtered: a zero or NaN
/// price yields a non-finite return that callers decide how to treat.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (Bessel-corrected, divisor `n - 1`).
///
/// A constant input yields exactly `0.0`; the mean of a constant is not
/// always exact in floating point, so that case is checked directly.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if values.iter().all(|v| *v == values[0]) {
        return Some(0.0);
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Percentile with linear interpolation between closest ranks.
///
/// `pct` is in `[0, 100]`. Rank is `(n - 1) * pct / 100`, the same definition
/// as the common "linear" method of numerical libraries.
pub fn percentile_linear(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&pct) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (sorted.len() - 1) as f64 * pct / 100.0;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Maximum drawdown as a non-positive fraction (e.g. -0.15 = 15% drawdown).
///
/// Tracks the running peak; each point's drawdown is `price / peak - 1`.
/// Non-finite and non-positive prices are skipped, so the result stays in
/// `[-1, 0]`. Returns `0.0` for a series that never falls below its running peak.
pub fn max_drawdown(prices: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for &price in prices.iter().filter(|p| p.is_finite() && **p > 0.0) {
        if price > peak {
            peak = price;
        }
        let dd = price / peak - 1.0;
        if dd < max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

/// Keep a value only if it is finite.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn returns_by_position() {
        let r = simple_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.1).abs() < EPS);
        assert!((r[1] - (-0.1)).abs() < EPS);
    }

    #[test]
    fn returns_of_short_series_are_empty() {
        assert!(simple_returns(&[]).is_empty());
        assert!(simple_returns(&[100.0]).is_empty());
    }

    #[test]
    fn return_over_zero_price_is_not_finite() {
        let r = simple_returns(&[0.0, 1.0]);
        assert!(!r[0].is_finite());
        assert_eq!(finite(r[0]), None);
    }

    #[test]
    fn sample_std_uses_bessel_correction() {
        // population var = 1.25, sample var = 5/3
        let s = sample_std(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((s - (5.0_f64 / 3.0).sqrt()).abs() < EPS);
    }

    #[test]
    fn sample_std_of_constant_is_exactly_zero() {
        assert_eq!(sample_std(&[0.01; 40]), Some(0.0));
    }

    #[test]
    fn sample_std_of_non_constant_small_values_is_positive() {
        let s = sample_std(&[0.01, 0.01, 0.010000001]).unwrap();
        assert!(s > 0.0);
    }

    #[test]
    fn sample_std_needs_two_values() {
        assert_eq!(sample_std(&[1.0]), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile_linear(&v, 0.0), Some(1.0));
        assert_eq!(percentile_linear(&v, 100.0), Some(5.0));
        assert_eq!(percentile_linear(&v, 50.0), Some(3.0));
        // rank = 4 * 0.05 = 0.2 → 1.0 + 0.2 * (2.0 - 1.0)
        assert!((percentile_linear(&v, 5.0).unwrap() - 1.2).abs() < EPS);
    }

    #[test]
    fn percentile_ignores_input_order() {
        let v = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert!((percentile_linear(&v, 5.0).unwrap() - 1.2).abs() < EPS);
    }

    #[test]
    fn percentile_rejects_bad_input() {
        assert_eq!(percentile_linear(&[], 5.0), None);
        assert_eq!(percentile_linear(&[1.0], 101.0), None);
    }

    #[test]
    fn drawdown_of_rising_series_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0, 4.0]), 0.0);
    }

    #[test]
    fn drawdown_measures_worst_decline_from_peak() {
        // peak 120, trough 90 → -25%; later peak 130 → 117 is only -10%
        let dd = max_drawdown(&[100.0, 120.0, 90.0, 130.0, 117.0]);
        assert!((dd - (-0.25)).abs() < EPS);
    }

    #[test]
    fn drawdown_skips_non_positive_prices() {
        let mut prices: Vec<f64> = (1..=40).map(|i| 100.0 + i as f64).collect();
        prices.push(-5.0);
        prices.push(0.0);
        assert_eq!(max_drawdown(&prices), 0.0);

        let dd = max_drawdown(&[100.0, -1.0, 50.0]);
        assert!((dd - (-0.5)).abs() < EPS);
    }

    #[test]
    fn drawdown_skips_nan_prices() {
        let dd = max_drawdown(&[100.0, f64::NAN, 50.0]);
        assert!((dd - (-0.5)).abs() < EPS);
    }
}
