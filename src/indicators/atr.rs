// =============================================================================
// True Range & Average True Range — Wilder's Smoothing Method
// =============================================================================
//
// True Range (TR) for each bar after the first:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// TR is unavailable at bar 0 (no previous close).
//
// ATR is TR passed through `wilder::wilder_smooth`, so the first ATR value is
// the mean of TR[1..=period] and lands on bar index `period`.
// =============================================================================

use crate::indicators::wilder::wilder_smooth;

/// Per-bar True Range, aligned with the inputs (index 0 is `None`).
///
/// The three slices must have equal length; the caller checks this.
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<Option<f64>> {
    let n = highs.len().min(lows.len()).min(closes.len());
    let mut out = Vec::with_capacity(n);
    if n == 0 {
        return out;
    }
    out.push(None);

    for i in 1..n {
        let high = highs[i];
        let low = lows[i];
        let prev_close = closes[i - 1];

        // f64::max ignores NaN, so screen the inputs instead of the result.
        if !(high.is_finite() && low.is_finite() && prev_close.is_finite()) {
            out.push(None);
            continue;
        }

        let hl = high - low;
        let hc = (high - prev_close).abs();
        let lc = (low - prev_close).abs();

        out.push(Some(hl.max(hc).max(lc)));
    }
    out
}

/// Wilder-smoothed True Range, one entry per bar.
pub fn average_true_range(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Vec<Option<f64>> {
    wilder_smooth(&true_range(highs, lows, closes), period)
}
