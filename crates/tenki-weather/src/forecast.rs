//! Extraction of per-day weather text from a JMA forecast document.
//!
//! A forecast document is an array of blocks. The first block's first time
//! series carries one timestamp per forecast day in `timeDefines` and, for each
//! sub-area, one description per day in `weathers`. Only the first sub-area is
//! read, and at most [`MAX_FORECAST_DAYS`] positionally aligned pairs are kept.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{ForecastBlock, ForecastItem, WeatherError};

/// Upper bound on items recorded per forecast run
pub const MAX_FORECAST_DAYS: usize = 3;

/// Length of the `YYYY-MM-DD` prefix of an ISO-8601 timestamp
const DATE_LEN: usize = 10;

/// Extract up to [`MAX_FORECAST_DAYS`] `(date, weather_text)` items.
///
/// A sub-area without `weathers` yields no items rather than an error.
///
/// # Errors
///
/// Returns `WeatherError::Format` when the document is not an array or the
/// first block lacks `timeSeries[0].timeDefines` or `timeSeries[0].areas[0]`.
pub fn extract_items(payload: &Value) -> Result<Vec<ForecastItem>, WeatherError> {
    let first_block = payload
        .as_array()
        .and_then(|blocks| blocks.first())
        .ok_or_else(|| WeatherError::format("forecast document has no blocks"))?;

    let block = ForecastBlock::deserialize(first_block)?;

    let series = block
        .time_series
        .first()
        .ok_or_else(|| WeatherError::format("forecast block has no timeSeries"))?;

    let area = series
        .areas
        .first()
        .ok_or_else(|| WeatherError::format("timeSeries[0] has no areas"))?;

    let items = series
        .time_defines
        .iter()
        .zip(area.weathers.iter())
        .take(MAX_FORECAST_DAYS)
        .map(|(time, weather)| ForecastItem::new(calendar_date(time), weather.as_str()))
        .collect();

    Ok(items)
}

/// Truncate an ISO-8601 timestamp to its calendar date
fn calendar_date(timestamp: &str) -> String {
    timestamp.chars().take(DATE_LEN).collect()
}
