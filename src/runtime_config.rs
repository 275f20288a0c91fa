// =============================================================================
// Dashboard Configuration
// =============================================================================
//
// Everything the dashboard used to keep in query parameters and session state
// lives here as plain data and is handed to the table builder explicitly.
//
// All fields carry `#[serde(default)]` so that a partial JSON file (or `{}`)
// loads with sensible values.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::adx::DEFAULT_ADX_PERIOD;
use crate::indicators::volatility::TRADING_DAYS_PER_YEAR;
use crate::table::TableConfig;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_data_dir() -> PathBuf {
    PathBuf::from("HistoricalData")
}

fn default_fixed_periods() -> Vec<usize> {
    vec![5, 10, 30, 100]
}

fn default_custom_period() -> usize {
    10
}

fn default_reference_period() -> usize {
    5
}

fn default_adx_period() -> usize {
    DEFAULT_ADX_PERIOD
}

fn default_trading_days_per_year() -> u32 {
    TRADING_DAYS_PER_YEAR
}

// =============================================================================
// DashboardConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Folder holding one `<SYMBOL>.csv` price history per symbol.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Symbols to tabulate.  Empty means every CSV found in `data_dir`.
    #[serde(default)]
    pub symbols: Vec<String>,

    /// Lookback windows always shown.
    #[serde(default = "default_fixed_periods")]
    pub fixed_periods: Vec<usize>,

    /// User-chosen extra lookback window.
    #[serde(default = "default_custom_period")]
    pub custom_period: usize,

    /// Denominator window for volatility ratios.
    #[serde(default = "default_reference_period")]
    pub reference_period: usize,

    #[serde(default = "default_adx_period")]
    pub adx_period: usize,

    #[serde(default = "default_trading_days_per_year")]
    pub trading_days_per_year: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            symbols: Vec::new(),
            fixed_periods: default_fixed_periods(),
            custom_period: default_custom_period(),
            reference_period: default_reference_period(),
            adx_period: default_adx_period(),
            trading_days_per_year: default_trading_days_per_year(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        info!(
            path = %path.display(),
            data_dir = %config.data_dir.display(),
            symbols = ?config.symbols,
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Fixed periods plus the custom one.  The table builder sorts and
    /// deduplicates.
    pub fn table_config(&self) -> TableConfig {
        let mut periods = self.fixed_periods.clone();
        periods.push(self.custom_period);
        TableConfig {
            periods,
            reference_period: self.reference_period,
            adx_period: self.adx_period,
            trading_days_per_year: self.trading_days_per_year,
        }
    }
}
