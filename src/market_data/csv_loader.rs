use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::types::{PriceBar, PriceSeries};

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

/// Date layouts seen in exported price histories.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%Y", "%d-%m-%Y", "%m/%d/%Y"];

/// Positions of the required columns in a header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .with_context(|| format!("missing column {name:?} in header {headers:?}"))
        };
        Ok(Self {
            date: find("date")?,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

fn field<'r>(record: &'r StringRecord, idx: usize, name: &str) -> Result<&'r str> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .with_context(|| format!("empty field {name}"))
}

/// Parse a price, tolerating thousands separators such as `"1,234.50"`.
fn parse_price(raw: &str, name: &str) -> Result<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .with_context(|| format!("failed to parse {name} as f64: {raw}"))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .with_context(|| format!("unrecognised date: {raw}"))
}

fn parse_bar(record: &StringRecord, cols: Columns) -> Result<PriceBar> {
    let date = parse_date(field(record, cols.date, "date")?)?;
    let open = parse_price(field(record, cols.open, "open")?, "open")?;
    let high = parse_price(field(record, cols.high, "high")?, "high")?;
    let low = parse_price(field(record, cols.low, "low")?, "low")?;
    let close = parse_price(field(record, cols.close, "close")?, "close")?;
    Ok(PriceBar::new(date, open, high, low, close)?)
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

/// Parse a price history from any CSV source.
///
/// Records that cannot be decoded, and rows that fail to parse or violate the
/// bar invariants, are skipped with a warning.  The result is sorted by date; when a date repeats, the later
/// row wins.
pub fn read_price_series<R: Read>(reader: R) -> Result<PriceSeries> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let cols = Columns::resolve(rdr.headers().context("failed to read CSV header")?)?;

    let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();
    let mut skipped = 0usize;
    for (line, record) in rdr.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                skipped += 1;
                warn!(row = line + 1, error = %e, "skipping malformed CSV record");
                continue;
            }
        };
        match parse_bar(&record, cols) {
            Ok(bar) => {
                by_date.insert(bar.date, bar);
            }
            Err(e) => {
                skipped += 1;
                warn!(row = line + 1, error = %e, "skipping price row");
            }
        }
    }

    debug!(bars = by_date.len(), skipped, "price history parsed");
    Ok(PriceSeries::new(by_date.into_values().collect()))
}

/// Load a price history from a CSV file.
pub fn load_price_series(path: impl AsRef<Path>) -> Result<PriceSeries> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let series = read_price_series(BufReader::new(file))
        .with_context(|| format!("failed to load price history from {}", path.display()))?;

    info!(
        path = %path.display(),
        bars = series.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        "price history loaded"
    );
    Ok(series)
}

fn csv_files(data_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(data_dir)
        .with_context(|| format!("failed to list {}", data_dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Symbols available in `data_dir`: the stems of its `*.csv` files, sorted.
pub fn list_symbols(data_dir: impl AsRef<Path>) -> Result<Vec<String>> {
    Ok(csv_files(data_dir.as_ref())?
        .iter()
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect())
}

/// Load the first CSV in `data_dir` whose file name starts with `symbol`.
pub fn load_symbol(data_dir: impl AsRef<Path>, symbol: &str) -> Result<PriceSeries> {
    let data_dir = data_dir.as_ref();
    let Some(path) = csv_files(data_dir)?.into_iter().find(|p| {
        p.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(symbol))
    }) else {
        bail!("no price file for {symbol} in {}", data_dir.display());
    };
    load_price_series(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
