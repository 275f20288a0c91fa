// =============================================================================
// Shared types used across the indicator engine
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{IndicatorError, Result};

/// One traded session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// Build a bar, rejecting non-finite or non-positive prices and bars where
    /// open/close fall outside the `[low, high]` range.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Result<Self> {
        for (name, value) in [("open", open), ("high", high), ("low", low), ("close", close)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(IndicatorError::invalid(format!(
                    "{date}: {name} must be positive and finite, got {value}"
                )));
            }
        }
        if low > high || open < low || open > high || close < low || close > high {
            return Err(IndicatorError::invalid(format!(
                "{date}: expected low <= open,close <= high (o={open} h={high} l={low} c={close})"
            )));
        }
        Ok(Self {
            date,
            open,
            high,
            low,
            close,
        })
    }
}

/// Ordered price history for a single symbol, oldest first.
///
/// Dates are expected to ascend; the indicator functions do not check this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The trailing `count` bars (or the whole series when shorter).
    pub fn tail(&self, count: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(count);
        &self.bars[start..]
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

/// Split bars into aligned `(highs, lows, closes)` columns.
pub fn hlc_columns(bars: &[PriceBar]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut highs = Vec::with_capacity(bars.len());
    let mut lows = Vec::with_capacity(bars.len());
    let mut closes = Vec::with_capacity(bars.len());
    for bar in bars {
        highs.push(bar.high);
        lows.push(bar.low);
        closes.push(bar.close);
    }
    (highs, lows, closes)
}

impl From<Vec<PriceBar>> for PriceSeries {
    fn from(bars: Vec<PriceBar>) -> Self {
        Self::new(bars)
    }
}

impl AsRef<[PriceBar]> for PriceSeries {
    fn as_ref(&self) -> &[PriceBar] {
        &self.bars
    }
}
