// =============================================================================
// Return / Volatility Calculator
// =============================================================================
//
// Log returns:
//   r_t = ln(close_t / close_{t-1})          for t = 1 .. n-1
//
// Historical volatility over a trailing window of `w` bars (n = w - 1 returns):
//   mean     = Σ r / n
//   variance = Σ (r - mean)² / (n - 1)       (sample, divisor on the RETURN count)
//   vol      = sqrt(variance)
//   annual   = vol * sqrt(trading_days_per_year)
//
// Realized volatility is the lighter standalone variant: the plain sample
// standard deviation of the same returns, never annualized and without the
// result struct.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{IndicatorError, Result};
use crate::types::PriceBar;

/// Conventional trading sessions per year used for annualisation.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Default denominator for [`ratio_to_base`].
pub const DEFAULT_RATIO_BASE: f64 = 100.0;

/// Raw and annualized volatility for one trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityResult {
    pub period: usize,
    pub volatility: f64,
    pub annualized_volatility: f64,
}

/// Volatility of one window relative to a reference window, scaled by 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioResult {
    pub numerator_period: usize,
    pub reference_period: usize,
    pub ratio: Option<f64>,
}

impl RatioResult {
    /// `reference` is `None` when the reference window could not be computed.
    pub fn new(
        numerator: &VolatilityResult,
        reference_period: usize,
        reference: Option<&VolatilityResult>,
    ) -> Self {
        Self {
            numerator_period: numerator.period,
            reference_period,
            ratio: reference.and_then(|r| volatility_ratio(numerator.volatility, r.volatility)),
        }
    }
}

/// Lazily yield the log returns of consecutive closes.
///
/// The iterator borrows `bars` and yields `bars.len() - 1` values.
pub fn log_returns(bars: &[PriceBar]) -> Result<impl Iterator<Item = f64> + '_> {
    if bars.len() < 2 {
        return Err(IndicatorError::InsufficientData {
            required: 2,
            available: bars.len(),
        });
    }
    Ok(bars.windows(2).map(|w| (w[1].close / w[0].close).ln()))
}

/// Collect the log returns of the trailing `window` bars, checking that every
/// return is finite.
fn window_returns(bars: &[PriceBar], window: usize, min_window: usize) -> Result<Vec<f64>> {
    if window < min_window || bars.len() < window {
        trace!(
            window,
            available = bars.len(),
            "volatility: insufficient data"
        );
        return Err(IndicatorError::InsufficientData {
            required: window.max(min_window),
            available: bars.len(),
        });
    }

    let returns: Vec<f64> = log_returns(&bars[bars.len() - window..])?.collect();
    if let Some(bad) = returns.iter().find(|r| !r.is_finite()) {
        return Err(IndicatorError::invalid(format!(
            "non-finite log return {bad} in trailing {window} bars"
        )));
    }
    Ok(returns)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation of the log returns over the trailing `window`
/// bars.
///
/// One return has no sample deviation, so at least three bars are needed.
///
/// # Errors
/// `InsufficientData` when `window < 3` or fewer than `window` bars exist.
pub fn realized_volatility(bars: &[PriceBar], window: usize) -> Result<f64> {
    let returns = window_returns(bars, window, 3)?;
    let mu = mean(&returns);
    let variance =
        returns.iter().map(|r| (r - mu).powi(2)).sum::<f64>() / (returns.len() - 1) as f64;
    Ok(variance.sqrt())
}

/// Sample standard deviation of the log returns over the trailing `window`
/// bars, plus its annualized value.
///
/// The variance divisor is `n - 1` with `n = window - 1` returns, so at least
/// three bars are needed.
///
/// # Errors
/// - `InsufficientData` when `window < 3` or fewer than `window` bars exist.
/// - `InvalidInput` when a close produces a non-finite return.
pub fn historical_volatility(
    bars: &[PriceBar],
    window: usize,
    trading_days_per_year: u32,
) -> Result<VolatilityResult> {
    let returns = window_returns(bars, window, 3)?;

    let mu = mean(&returns);
    let squared_diffs = returns.iter().map(|r| (r - mu).powi(2));
    let variance = squared_diffs.sum::<f64>() / (returns.len() - 1) as f64;
    let volatility = variance.sqrt();

    Ok(VolatilityResult {
        period: window,
        volatility,
        annualized_volatility: volatility * f64::from(trading_days_per_year).sqrt(),
    })
}

/// `(vol1 / vol2) * 100`.
///
/// Returns `None` when `vol2` is zero or the quotient is non-finite.
pub fn volatility_ratio(vol1: f64, vol2: f64) -> Option<f64> {
    if vol2 == 0.0 {
        return None;
    }
    let ratio = (vol1 / vol2) * 100.0;
    ratio.is_finite().then_some(ratio)
}

/// [`volatility_ratio`] against the conventional base of `100.0`.
pub fn ratio_to_base(vol: f64) -> Option<f64> {
    volatility_ratio(vol, DEFAULT_RATIO_BASE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FIXTURE_CLOSES: [f64; 20] = [
        100.0, 101.0, 99.0, 102.0, 104.0, 103.0, 105.0, 107.0, 106.0, 108.0, 110.0, 109.0, 111.0,
        113.0, 112.0, 114.0, 116.0, 115.0, 117.0, 119.0,
    ];

    fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
            })
            .collect()
    }

    #[test]
    fn log_returns_yields_one_fewer_than_bars() {
        let bars = bars_from_closes(&[100.0, 110.0, 99.0]);
        let returns: Vec<f64> = log_returns(&bars).unwrap().collect();
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - (1.1f64).ln()).abs() < 1e-12);
        assert!((returns[1] - (99.0f64 / 110.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn log_returns_needs_two_bars() {
        let bars = bars_from_closes(&[100.0]);
        assert_eq!(
            log_returns(&bars).err(),
            Some(IndicatorError::InsufficientData {
                required: 2,
                available: 1
            })
        );
    }

    #[test]
    fn historical_volatility_matches_reference_fixture() {
        let bars = bars_from_closes(&FIXTURE_CLOSES);
        let hv = historical_volatility(&bars, 10, TRADING_DAYS_PER_YEAR).unwrap();

        // Independent computation over the last 10 closes.
        let tail = &FIXTURE_CLOSES[10..];
        let rets: Vec<f64> = tail.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
        let m = rets.iter().sum::<f64>() / rets.len() as f64;
        let var = rets.iter().map(|r| (r - m) * (r - m)).sum::<f64>() / (rets.len() - 1) as f64;

        assert!((hv.volatility - var.sqrt()).abs() < 1e-6);
        assert!((hv.volatility - 0.013228712060193696).abs() < 1e-6);
        assert_eq!(hv.period, 10);
    }

    #[test]
    fn annualized_is_scaled_by_sqrt_252() {
        let bars = bars_from_closes(&FIXTURE_CLOSES);
        for window in 3..=FIXTURE_CLOSES.len() {
            let hv = historical_volatility(&bars, window, 252).unwrap();
            assert!(hv.volatility >= 0.0);
            assert!((hv.annualized_volatility - hv.volatility * 252f64.sqrt()).abs() < 1e-9);
        }
    }

    #[test]
    fn historical_volatility_insufficient_window() {
        let bars = bars_from_closes(&FIXTURE_CLOSES);
        assert!(historical_volatility(&bars, 2, 252)
            .unwrap_err()
            .is_insufficient_data());
        assert!(historical_volatility(&bars, 21, 252)
            .unwrap_err()
            .is_insufficient_data());
    }

    #[test]
    fn flat_prices_have_zero_volatility() {
        let bars = bars_from_closes(&[50.0; 12]);
        let hv = historical_volatility(&bars, 12, 252).unwrap();
        assert_eq!(hv.volatility, 0.0);
        assert_eq!(realized_volatility(&bars, 12).unwrap(), 0.0);
    }

    #[test]
    fn realized_volatility_is_sample_deviation() {
        let bars = bars_from_closes(&FIXTURE_CLOSES);
        let rv = realized_volatility(&bars, 10).unwrap();
        assert!((rv - 0.013228712060193696).abs() < 1e-9);
    }

    #[test]
    fn realized_volatility_rejects_short_window() {
        let bars = bars_from_closes(&FIXTURE_CLOSES);
        assert!(realized_volatility(&bars, 1).is_err());
        assert!(realized_volatility(&bars, 0).is_err());
        // a single return has no sample deviation
        assert!(realized_volatility(&bars, 2)
            .unwrap_err()
            .is_insufficient_data());
        assert!(realized_volatility(&bars, 3).is_ok());
    }

    #[test]
    fn ratio_of_equal_values_is_100() {
        for x in [1e-6, 0.2, 3.5, 1e6, -0.7] {
            assert_eq!(volatility_ratio(x, x), Some(100.0));
        }
    }

    #[test]
    fn ratio_against_zero_is_unavailable() {
        assert_eq!(volatility_ratio(0.3, 0.0), None);
        assert_eq!(volatility_ratio(0.0, 0.0), None);
        assert_eq!(volatility_ratio(0.3, -0.0), None);
    }

    #[test]
    fn ratio_to_default_base() {
        assert_eq!(ratio_to_base(25.0), Some(25.0));
    }

    #[test]
    fn ratio_result_without_reference() {
        let numerator = VolatilityResult {
            period: 10,
            volatility: 0.02,
            annualized_volatility: 0.02 * 252f64.sqrt(),
        };
        let r = RatioResult::new(&numerator, 5, None);
        assert_eq!(r.reference_period, 5);
        assert_eq!(r.ratio, None);

        let reference = VolatilityResult {
            period: 5,
            volatility: 0.01,
            annualized_volatility: 0.01 * 252f64.sqrt(),
        };
        let r = RatioResult::new(&numerator, 5, Some(&reference));
        assert!((r.ratio.unwrap() - 200.0).abs() < 1e-9);
    }
}
