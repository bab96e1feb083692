pub mod forecast_model;

pub use forecast_model::{format_forecast, ForecastModel, PendingAction};
