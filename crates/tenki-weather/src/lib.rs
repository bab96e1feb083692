//! Weather service for tenki
//!
//! Fetches the area list and forecasts from the Japan Meteorological Agency
//! and keeps every fetched forecast in a local SQLite cache.

pub mod client;
pub mod forecast;
pub mod store;
pub mod types;

pub use client::JmaClient;
pub use forecast::{extract_items, MAX_FORECAST_DAYS};
pub use store::ForecastStore;
pub use types::*;
