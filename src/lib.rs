// =============================================================================
// voldash — volatility & directional-movement tables for equity price history
// =============================================================================
//
// Data flows one way:
//   CSV files -> market_data -> PriceSeries -> indicators -> table -> caller
//
// Nothing in `indicators` or `table` performs I/O.
// =============================================================================

pub mod error;
pub mod indicators;
pub mod market_data;
pub mod runtime_config;
pub mod table;
pub mod types;

pub use error::IndicatorError;
pub use table::{
    build_comparison_table, build_indicator_table, tag_rows, IndicatorRow, SymbolRow, TableConfig,
};
pub use types::{hlc_columns, PriceBar, PriceSeries};
