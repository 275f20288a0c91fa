// =============================================================================
// Wilder's Smoothing
// =============================================================================
//
// A first-order recursive filter, NOT a moving window:
//
//   seed   = mean of the first `period` available raw values,
//            placed at the index of the `period`-th available value
//   s_t    = s_{t-1} - s_{t-1} / period + raw_t
//
// Everything before the seed is unavailable.  Leading unavailable raw values
// (e.g. True Range at bar 0) are skipped before the seed window starts.  Once
// the seed window has begun, an unavailable raw value stops the recursion and
// every later output is unavailable as well.
// =============================================================================

/// Smooth `raw` with Wilder's recursion, returning one entry per input.
///
/// Returns all-`None` when `period` is zero or fewer than `period` values are
/// available after the leading gap.
pub fn wilder_smooth(raw: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; raw.len()];
    if period == 0 {
        return out;
    }

    let Some(start) = raw.iter().position(Option::is_some) else {
        return out;
    };
    let Some(seed_idx) = start.checked_add(period - 1).filter(|&i| i < raw.len()) else {
        return out;
    };

    let mut seed_sum = 0.0;
    for value in &raw[start..=seed_idx] {
        match value {
            Some(v) => seed_sum += v,
            None => return out,
        }
    }

    let period_f = period as f64;
    let mut smoothed = seed_sum / period_f;
    if !smoothed.is_finite() {
        return out;
    }
    out[seed_idx] = Some(smoothed);

    for t in seed_idx + 1..raw.len() {
        let Some(value) = raw[t] else {
            break;
        };
        smoothed = smoothed - smoothed / period_f + value;
        if !smoothed.is_finite() {
            break;
        }
        out[t] = Some(smoothed);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avail(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn seed_is_mean_of_first_period_values() {
        let raw = avail(&[2.0, 4.0, 6.0, 8.0, 10.0]);
        let s = wilder_smooth(&raw, 3);
        assert_eq!(s[0], None);
        assert_eq!(s[1], None);
        assert_eq!(s[2], Some(4.0));
    }

    #[test]
    fn recursion_after_seed() {
        let raw = avail(&[2.0, 4.0, 6.0, 8.0, 10.0]);
        let s = wilder_smooth(&raw, 3);
        // 4 - 4/3 + 8
        let s3 = 4.0 - 4.0 / 3.0 + 8.0;
        assert!((s[3].unwrap() - s3).abs() < 1e-12);
        let s4 = s3 - s3 / 3.0 + 10.0;
        assert!((s[4].unwrap() - s4).abs() < 1e-12);
    }

    #[test]
    fn differs_from_simple_moving_average() {
        let raw = avail(&[1.0, 1.0, 1.0, 5.0]);
        let s = wilder_smooth(&raw, 3);
        let sma = (1.0 + 1.0 + 5.0) / 3.0;
        assert!((s[3].unwrap() - sma).abs() > 1e-6);
    }

    #[test]
    fn leading_gap_is_skipped() {
        let mut raw = vec![None];
        raw.extend(avail(&[3.0, 3.0, 6.0]));
        let s = wilder_smooth(&raw, 3);
        assert_eq!(s, vec![None, None, None, Some(4.0)]);
        assert_eq!(s.iter().position(Option::is_some), Some(3));
    }

    #[test]
    fn gap_after_seed_ends_recursion() {
        let raw = vec![Some(1.0), Some(1.0), None, Some(1.0)];
        assert!(wilder_smooth(&raw, 2).iter().skip(2).all(Option::is_none));

        let raw = vec![Some(1.0), Some(1.0), Some(2.0), None, Some(1.0)];
        let s = wilder_smooth(&raw, 2);
        assert_eq!(s[1], Some(1.0));
        assert_eq!(s[2], Some(2.5));
        assert_eq!(s[3], None);
        assert_eq!(s[4], None);
    }

    #[test]
    fn too_short_or_zero_period() {
        let raw = avail(&[1.0, 2.0]);
        assert!(wilder_smooth(&raw, 3).iter().all(Option::is_none));
        assert!(wilder_smooth(&raw, 0).iter().all(Option::is_none));
        assert!(wilder_smooth(&[], 3).is_empty());
    }

    #[test]
    fn huge_period_is_unavailable() {
        let mut raw = vec![None];
        raw.extend(avail(&[1.0, 2.0, 3.0]));
        assert!(wilder_smooth(&raw, usize::MAX).iter().all(Option::is_none));
        assert!(wilder_smooth(&raw, usize::MAX - 1).iter().all(Option::is_none));
    }
}
