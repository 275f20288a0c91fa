pub mod csv_loader;

// Re-export the loaders for convenient access (e.g. `use crate::market_data::load_symbol`).
pub use csv_loader::{list_symbols, load_price_series, load_symbol, read_price_series};
