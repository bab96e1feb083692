use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Forecast area (a JMA "office"), identified by its code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub code: String,
    pub name: String,
}

impl Area {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Label shown in the area selector, e.g. `東京都（130000）`
    pub fn label(&self) -> String {
        format!("{}（{}）", self.name, self.code)
    }
}

/// One forecast day of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastItem {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    pub weather_text: String,
}

impl ForecastItem {
    pub fn new(date: impl Into<String>, weather_text: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            weather_text: weather_text.into(),
        }
    }
}

/// A single successful fetch for an area, as recorded in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRun {
    pub id: i64,
    pub area_code: String,
    /// Local time with second precision, `YYYY-MM-DDTHH:MM:SS`
    pub fetched_at: String,
    /// Payload exactly as received, serialized to JSON text
    pub raw_json: String,
}

/// Area list document (`area.json`)
#[derive(Debug, Deserialize)]
pub(crate) struct AreaListResponse {
    pub offices: HashMap<String, OfficeEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OfficeEntry {
    pub name: String,
}

/// First block of a forecast document; only the fields read here are modelled
#[derive(Debug, Deserialize)]
pub(crate) struct ForecastBlock {
    #[serde(rename = "timeSeries")]
    pub time_series: Vec<TimeSeries>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimeSeries {
    #[serde(rename = "timeDefines")]
    pub time_defines: Vec<String>,
    pub areas: Vec<TimeSeriesArea>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimeSeriesArea {
    #[serde(default)]
    pub weathers: Vec<String>,
}

/// Weather service errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// Network failure, timeout or non-success status from the remote service
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Unexpected JSON shape, from the remote service or a stored payload
    #[error("Format error: {0}")]
    Format(String),
    /// Local cache failure
    #[error("Storage error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl WeatherError {
    pub fn format(msg: impl Into<String>) -> Self {
        WeatherError::Format(msg.into())
    }

    /// User-friendly message for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Transport(e) if e.is_timeout() => {
                "The request timed out. Please try again."
            }
            WeatherError::Transport(e) if e.status().is_some() => {
                "The weather service returned an error. Please try again later."
            }
            WeatherError::Transport(_) => "Unable to connect. Check your internet connection.",
            WeatherError::Format(_) => "Received an unexpected response from the weather service.",
            WeatherError::Store(_) => "Unable to access the local forecast cache.",
        }
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(e: serde_json::Error) -> Self {
        WeatherError::Format(e.to_string())
    }
}
