// =============================================================================
// voldash — Main Entry Point
// =============================================================================
//
// Loads every configured price history, builds the per-symbol indicator
// tables concurrently and writes one JSON row per line to stdout.  Logs go to
// stderr so the output can be piped straight into a presentation layer.
// =============================================================================

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use voldash::market_data;
use voldash::runtime_config::DashboardConfig;
use voldash::table::build_comparison_table;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path =
        std::env::var("VOLDASH_CONFIG").unwrap_or_else(|_| "voldash.json".into());
    let mut config = DashboardConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        DashboardConfig::default()
    });

    if let Ok(dir) = std::env::var("VOLDASH_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Ok(syms) = std::env::var("VOLDASH_SYMBOLS") {
        config.symbols = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if config.symbols.is_empty() {
        config.symbols = market_data::list_symbols(&config.data_dir)?;
    }

    let table_config = config.table_config();
    info!(
        symbols = ?config.symbols,
        periods = ?table_config.sorted_periods(),
        reference_period = table_config.reference_period,
        adx_period = table_config.adx_period,
        "Building indicator tables"
    );

    // ── 2. Load price histories ──────────────────────────────────────────
    let mut universe = Vec::with_capacity(config.symbols.len());
    for symbol in &config.symbols {
        match market_data::load_symbol(&config.data_dir, symbol) {
            Ok(series) if series.is_empty() => {
                warn!(symbol = %symbol, "Price history is empty, skipping");
            }
            Ok(series) => universe.push((symbol.clone(), series)),
            Err(e) => warn!(symbol = %symbol, error = %e, "Failed to load price history"),
        }
    }

    // ── 3. Compute & emit ────────────────────────────────────────────────
    let loaded = universe.len();
    let rows = build_comparison_table(universe, table_config)
        .await
        .context("failed to build indicator tables")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for row in &rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    info!(symbols = loaded, rows = rows.len(), "Done");
    Ok(())
}
