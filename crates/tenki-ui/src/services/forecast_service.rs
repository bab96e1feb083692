//! Forecast backend: remote client plus local cache.
//!
//! Runs on the UI thread. Each call completes (fetch, write, read) before
//! control returns to the event loop.

use std::time::Duration;

use tenki_core::Config;
use tenki_weather::{Area, ForecastItem, ForecastStore, JmaClient, WeatherError};

/// Wires the area selector and the "show" action to the JMA client and the cache.
#[derive(Debug, Clone)]
pub struct ForecastService {
    client: JmaClient,
    store: ForecastStore,
}

impl ForecastService {
    pub fn new(client: JmaClient, store: ForecastStore) -> Self {
        Self { client, store }
    }

    /// Build the service from the `[jma]` and `[storage]` config sections.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Transport` if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let client = JmaClient::new(
            config.jma.area_url.as_str(),
            config.jma.forecast_url.as_str(),
            Duration::from_secs(config.jma.timeout_secs),
        )?;
        let store = ForecastStore::new(config.storage.db_path.clone());
        Ok(Self::new(client, store))
    }

    /// Create the cache tables. Called once at startup.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Store` if the database cannot be created.
    pub fn initialize(&self) -> Result<(), WeatherError> {
        self.store.initialize()
    }

    /// Areas for the selector, sorted by name.
    ///
    /// # Errors
    ///
    /// Propagates `Transport` and `Format` errors from the client.
    pub async fn list_areas(&self) -> Result<Vec<Area>, WeatherError> {
        self.client.list_areas().await
    }

    /// Fetch a forecast, record it, and return the latest cached items for `code`.
    ///
    /// # Errors
    ///
    /// The first failing step's error: `Transport`/`Format` from the fetch,
    /// `Format`/`Store` from recording, `Store` from reading back.
    pub async fn show_forecast(&self, code: &str) -> Result<Vec<ForecastItem>, WeatherError> {
        let payload = self.client.get_forecast(code).await?;
        self.store.save_forecast(code, &payload)?;
        let items = self.store.load_latest_forecast(code)?;

        tracing::info!(code, items = items.len(), "Forecast ready");
        Ok(items)
    }

    pub fn store(&self) -> &ForecastStore {
        &self.store
    }
}
