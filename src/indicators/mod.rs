// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators behind the
// dashboard tables.  Series-valued functions return one `Option<f64>` per
// input bar so callers can tell "computed zero" from "not computable".

pub mod adx;
pub mod atr;
pub mod volatility;
pub mod wilder;

pub use adx::{
    compute_adx, compute_adx_bars, directional_movement, directional_series,
    directional_series_bars, DirectionalResult, DirectionalSeries, DEFAULT_ADX_PERIOD,
};
pub use atr::{average_true_range, true_range};
pub use volatility::{
    historical_volatility, log_returns, ratio_to_base, realized_volatility, volatility_ratio,
    RatioResult, VolatilityResult, TRADING_DAYS_PER_YEAR,
};
pub use wilder::wilder_smooth;
