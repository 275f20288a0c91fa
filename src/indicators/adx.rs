// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline (one entry per input bar, index 0 has no predecessor):
//   1. True Range per bar (see `atr`).
//   2. +DM / -DM per bar:
//        up   = H_t - H_{t-1}
//        down = L_{t-1} - L_t
//        +DM  = up   if up > down && up > 0   else 0
//        -DM  = down if down > up && down > 0 else 0
//   3. Wilder's smoothing (period) of TR, +DM and -DM.
//   4. +DI = 100 * smoothed(+DM) / ATR
//      -DI = 100 * smoothed(-DM) / ATR          (unavailable when ATR == 0)
//   5. DX  = 100 * |+DI - -DI| / (+DI + -DI)    (unavailable when the sum is 0)
//   6. ADX = Wilder's smoothing of DX, seeded the same way.
//
// With the mean seed, DI appears at bar `period` and ADX at bar
// `2 * period - 1`, so a full triple needs `2 * period` bars.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{IndicatorError, Result};
use crate::indicators::atr::average_true_range;
use crate::indicators::wilder::wilder_smooth;
use crate::types::{hlc_columns, PriceBar};

/// Conventional Wilder period.
pub const DEFAULT_ADX_PERIOD: usize = 14;

/// Aligned +DI / -DI / ADX series, one entry per input bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalSeries {
    pub plus_di: Vec<Option<f64>>,
    pub minus_di: Vec<Option<f64>>,
    pub adx: Vec<Option<f64>>,
}

/// The trailing-aligned reading of a [`DirectionalSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalResult {
    pub period: usize,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
    pub adx: Option<f64>,
}

impl DirectionalResult {
    pub fn unavailable(period: usize) -> Self {
        Self {
            period,
            plus_di: None,
            minus_di: None,
            adx: None,
        }
    }
}

impl DirectionalSeries {
    pub fn len(&self) -> usize {
        self.adx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adx.is_empty()
    }

    /// Values on the last bar, tagged with `period`.
    pub fn latest(&self, period: usize) -> DirectionalResult {
        DirectionalResult {
            period,
            plus_di: self.plus_di.last().copied().flatten(),
            minus_di: self.minus_di.last().copied().flatten(),
            adx: self.adx.last().copied().flatten(),
        }
    }
}

/// Raw +DM / -DM per bar.  Index 0 is `None`; on every other bar at most one
/// of the two is non-zero.
pub fn directional_movement(highs: &[f64], lows: &[f64]) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let n = highs.len().min(lows.len());
    let mut plus_dm = Vec::with_capacity(n);
    let mut minus_dm = Vec::with_capacity(n);
    if n == 0 {
        return (plus_dm, minus_dm);
    }
    plus_dm.push(None);
    minus_dm.push(None);

    for i in 1..n {
        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];

        if !(up_move.is_finite() && down_move.is_finite()) {
            plus_dm.push(None);
            minus_dm.push(None);
            continue;
        }

        let pdm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        let mdm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };

        plus_dm.push(Some(pdm));
        minus_dm.push(Some(mdm));
    }

    (plus_dm, minus_dm)
}

/// Run the full pipeline without length requirements.
///
/// Short inputs are not an error here: every stage simply reports `None`
/// until its seed bar is reached.  The slices are truncated to the shortest
/// of the three.
pub fn directional_series(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> DirectionalSeries {
    let n = highs.len().min(lows.len()).min(closes.len());
    let (highs, lows, closes) = (&highs[..n], &lows[..n], &closes[..n]);

    let atr = average_true_range(highs, lows, closes, period);
    let (plus_dm, minus_dm) = directional_movement(highs, lows);
    let sm_plus_dm = wilder_smooth(&plus_dm, period);
    let sm_minus_dm = wilder_smooth(&minus_dm, period);

    let mut plus_di = Vec::with_capacity(n);
    let mut minus_di = Vec::with_capacity(n);
    let mut dx = Vec::with_capacity(n);

    for t in 0..n {
        let (Some(tr), Some(pdm), Some(mdm)) = (atr[t], sm_plus_dm[t], sm_minus_dm[t]) else {
            plus_di.push(None);
            minus_di.push(None);
            dx.push(None);
            continue;
        };
        if tr == 0.0 {
            plus_di.push(None);
            minus_di.push(None);
            dx.push(None);
            continue;
        }

        let pdi = 100.0 * pdm / tr;
        let mdi = 100.0 * mdm / tr;
        plus_di.push(Some(pdi));
        minus_di.push(Some(mdi));
        dx.push(compute_dx(pdi, mdi));
    }

    let adx = wilder_smooth(&dx, period);

    trace!(
        bars = n,
        period,
        first_adx = adx.iter().position(Option::is_some),
        "directional series computed"
    );

    DirectionalSeries {
        plus_di,
        minus_di,
        adx,
    }
}

/// Compute the aligned +DI / -DI / ADX series.
///
/// # Errors
/// `InvalidInput` when:
/// - the three inputs differ in length,
/// - `period` is zero,
/// - there are fewer than `2 * period` bars.
pub fn compute_adx(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Result<DirectionalSeries> {
    if highs.len() != lows.len() || highs.len() != closes.len() {
        return Err(IndicatorError::invalid(format!(
            "input lengths differ: highs={}, lows={}, closes={}",
            highs.len(),
            lows.len(),
            closes.len()
        )));
    }
    if period == 0 {
        return Err(IndicatorError::invalid("ADX period must be positive"));
    }
    let Some(required) = period.checked_mul(2) else {
        return Err(IndicatorError::invalid(format!(
            "ADX period {period} is too large"
        )));
    };
    if highs.len() < required {
        return Err(IndicatorError::invalid(format!(
            "ADX({period}) needs at least {required} bars, got {}",
            highs.len()
        )));
    }

    Ok(directional_series(highs, lows, closes, period))
}

/// [`compute_adx`] over price bars.
pub fn compute_adx_bars(bars: &[PriceBar], period: usize) -> Result<DirectionalSeries> {
    let (highs, lows, closes) = hlc_columns(bars);
    compute_adx(&highs, &lows, &closes, period)
}

/// Tolerant variant of [`compute_adx_bars`] used where a short window must
/// degrade to unavailable values instead of failing.
pub fn directional_series_bars(bars: &[PriceBar], period: usize) -> DirectionalSeries {
    let (highs, lows, closes) = hlc_columns(bars);
    directional_series(&highs, &lows, &closes, period)
}

fn compute_dx(plus_di: f64, minus_di: f64) -> Option<f64> {
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return None;
    }
    let dx = 100.0 * (plus_di - minus_di).abs() / di_sum;
    dx.is_finite().then_some(dx)
}
