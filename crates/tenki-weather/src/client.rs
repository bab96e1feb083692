//! Japan Meteorological Agency client.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tenki_core::AREA_CODE_PLACEHOLDER;
use tracing::instrument;

use crate::types::{Area, AreaListResponse, WeatherError};

/// Read-only client for the area list and per-area forecasts.
///
/// No retries: a failed request is reported to the caller as-is.
#[derive(Debug, Clone)]
pub struct JmaClient {
    client: Client,
    area_url: String,
    forecast_url: String,
}

impl JmaClient {
    /// Build a client.
    ///
    /// `forecast_url` is a template in which `{code}` is replaced by the area code.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Transport` if the HTTP client cannot be built.
    pub fn new(
        area_url: impl Into<String>,
        forecast_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            area_url: area_url.into(),
            forecast_url: forecast_url.into(),
        })
    }

    /// Fetch all forecast areas, sorted by name.
    ///
    /// # Errors
    ///
    /// `Transport` on network failure, timeout or error status; `Format` when
    /// the document has no `offices` mapping of `{code: {name}}`.
    #[instrument(skip(self), level = "info")]
    pub async fn list_areas(&self) -> Result<Vec<Area>, WeatherError> {
        let response: AreaListResponse = self.get_json(&self.area_url).await?;
        let areas = areas_from_offices(response);
        tracing::info!(count = areas.len(), "Fetched area list");
        Ok(areas)
    }

    /// Fetch the raw forecast document for an area.
    ///
    /// # Errors
    ///
    /// `Transport` on network failure, timeout or error status; `Format` when
    /// the body is not a JSON array.
    #[instrument(skip(self), level = "info")]
    pub async fn get_forecast(&self, code: &str) -> Result<Value, WeatherError> {
        let url = self.forecast_url_for(code);
        let value: Value = self.get_json(&url).await?;

        match value {
            Value::Array(_) => Ok(value),
            other => Err(WeatherError::format(format!(
                "expected forecast array, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn forecast_url_for(&self, code: &str) -> String {
        self.forecast_url.replace(AREA_CODE_PLACEHOLDER, code)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, WeatherError> {
        tracing::debug!(url, "GET");

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;

        Ok(serde_json::from_str(&body)?)
    }
}

/// Flatten the `offices` mapping into areas ordered by name, then code
pub(crate) fn areas_from_offices(response: AreaListResponse) -> Vec<Area> {
    let mut areas: Vec<Area> = response
        .offices
        .into_iter()
        .map(|(code, office)| Area::new(code, office.name))
        .collect();

    areas.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));
    areas
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
