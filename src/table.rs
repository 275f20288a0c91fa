// =============================================================================
// Indicator Table Builder
// =============================================================================
//
// Joins volatility, ratio and directional readings into one row per requested
// period.  The builder is symbol-agnostic; multi-symbol views tag the rows
// afterwards (`tag_rows`) or use `build_comparison_table`, which fans the
// per-symbol work out across the blocking pool.
//
// Row rules:
//   - periods are deduplicated and sorted ascending
//   - periods longer than the series are omitted
//   - the reference volatility is computed once per series
//   - directional fields are filled only when `period >= adx_period`, from the
//     last bar of the ADX engine run on the trailing `period` bars, rounded
//     to one decimal
// =============================================================================

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::{IndicatorError, Result};
use crate::indicators::adx::{directional_series_bars, DirectionalResult, DEFAULT_ADX_PERIOD};
use crate::indicators::volatility::{
    historical_volatility, RatioResult, VolatilityResult, TRADING_DAYS_PER_YEAR,
};
use crate::types::{PriceBar, PriceSeries};

// =============================================================================
// Types
// =============================================================================

/// Explicit inputs to the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub periods: Vec<usize>,
    pub reference_period: usize,
    #[serde(default = "default_adx_period")]
    pub adx_period: usize,
    #[serde(default = "default_trading_days_per_year")]
    pub trading_days_per_year: u32,
}

fn default_adx_period() -> usize {
    DEFAULT_ADX_PERIOD
}

fn default_trading_days_per_year() -> u32 {
    TRADING_DAYS_PER_YEAR
}

impl TableConfig {
    pub fn new(periods: Vec<usize>, reference_period: usize) -> Self {
        Self {
            periods,
            reference_period,
            adx_period: DEFAULT_ADX_PERIOD,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
        }
    }

    pub fn with_adx_period(mut self, adx_period: usize) -> Self {
        self.adx_period = adx_period;
        self
    }

    /// Reject structurally invalid configurations.
    pub fn validate(&self) -> Result<()> {
        if self.periods.iter().any(|&p| p == 0) {
            return Err(IndicatorError::invalid("periods must be positive"));
        }
        if self.reference_period == 0 {
            return Err(IndicatorError::invalid("reference period must be positive"));
        }
        if self.adx_period == 0 {
            return Err(IndicatorError::invalid("ADX period must be positive"));
        }
        if self.trading_days_per_year == 0 {
            return Err(IndicatorError::invalid(
                "trading days per year must be positive",
            ));
        }
        Ok(())
    }

    /// Deduplicated periods in ascending order.
    pub fn sorted_periods(&self) -> Vec<usize> {
        let mut periods = self.periods.clone();
        periods.sort_unstable();
        periods.dedup();
        periods
    }
}

/// One table row for a single lookback period.  `None` marks a value that
/// could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub period: usize,
    pub volatility: Option<f64>,
    pub annualized_volatility: Option<f64>,
    pub reference_period: usize,
    pub ratio: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
    pub adx: Option<f64>,
}

impl IndicatorRow {
    fn join(
        period: usize,
        volatility: Option<&VolatilityResult>,
        ratio: Option<&RatioResult>,
        reference_period: usize,
        directional: &DirectionalResult,
    ) -> Self {
        Self {
            period,
            volatility: volatility.map(|v| v.volatility),
            annualized_volatility: volatility.map(|v| v.annualized_volatility),
            reference_period,
            ratio: ratio.and_then(|r| r.ratio),
            plus_di: directional.plus_di,
            minus_di: directional.minus_di,
            adx: directional.adx,
        }
    }
}

/// An [`IndicatorRow`] tagged with the symbol it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolRow {
    pub symbol: String,
    #[serde(flatten)]
    pub row: IndicatorRow,
}

// =============================================================================
// Builder
// =============================================================================

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Insufficient data degrades to `None`; anything else is propagated.
fn degrade<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_insufficient_data() => Ok(None),
        Err(e) => Err(e),
    }
}

fn directional_for(bars: &[PriceBar], period: usize, adx_period: usize) -> DirectionalResult {
    if period < adx_period {
        return DirectionalResult::unavailable(period);
    }
    let window = &bars[bars.len() - period..];
    let latest = directional_series_bars(window, adx_period).latest(period);
    DirectionalResult {
        period,
        plus_di: latest.plus_di.map(|v| round_to(v, 1)),
        minus_di: latest.minus_di.map(|v| round_to(v, 1)),
        adx: latest.adx.map(|v| round_to(v, 1)),
    }
}

/// Build one row per requested period, ascending by period.
///
/// # Errors
/// `InvalidInput` for a structurally invalid `config` or a series whose
/// closes produce non-finite returns.
pub fn build_indicator_table(bars: &[PriceBar], config: &TableConfig) -> Result<Vec<IndicatorRow>> {
    config.validate()?;

    let reference = degrade(historical_volatility(
        bars,
        config.reference_period,
        config.trading_days_per_year,
    ))?;
    if reference.is_none() {
        debug!(
            reference_period = config.reference_period,
            bars = bars.len(),
            "reference volatility unavailable"
        );
    }

    let mut rows = Vec::new();
    for period in config.sorted_periods() {
        if period > bars.len() {
            debug!(period, bars = bars.len(), "period exceeds history, skipped");
            continue;
        }

        let volatility = degrade(historical_volatility(
            bars,
            period,
            config.trading_days_per_year,
        ))?;
        let ratio = volatility
            .as_ref()
            .map(|v| RatioResult::new(v, config.reference_period, reference.as_ref()));
        let directional = directional_for(bars, period, config.adx_period);

        rows.push(IndicatorRow::join(
            period,
            volatility.as_ref(),
            ratio.as_ref(),
            config.reference_period,
            &directional,
        ));
    }

    Ok(rows)
}

/// Attach `symbol` to every row.
pub fn tag_rows(symbol: &str, rows: Vec<IndicatorRow>) -> Vec<SymbolRow> {
    rows.into_iter()
        .map(|row| SymbolRow {
            symbol: symbol.to_string(),
            row,
        })
        .collect()
}

/// Build and concatenate the tables of several symbols concurrently.
///
/// Each symbol runs on the blocking pool.  The output keeps the input symbol
/// order.  A symbol whose table fails (bad closes, or a panicked task) is
/// logged and left out; an invalid `config` fails the whole call up front.
pub async fn build_comparison_table(
    universe: Vec<(String, PriceSeries)>,
    config: TableConfig,
) -> Result<Vec<SymbolRow>> {
    config.validate()?;

    let mut tasks = JoinSet::new();
    for (idx, (symbol, series)) in universe.into_iter().enumerate() {
        let config = config.clone();
        tasks.spawn_blocking(move || {
            let rows = build_indicator_table(series.bars(), &config);
            (idx, symbol, rows)
        });
    }

    let mut results: Vec<(usize, Vec<SymbolRow>)> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, symbol, Ok(rows))) => results.push((idx, tag_rows(&symbol, rows))),
            Ok((_, symbol, Err(e))) => {
                warn!(symbol = %symbol, error = %e, "indicator table failed, symbol skipped");
            }
            Err(e) => warn!(error = %e, "indicator task aborted"),
        }
    }

    results.sort_by_key(|(idx, _)| *idx);
    Ok(results.into_iter().flat_map(|(_, rows)| rows).collect())
}
