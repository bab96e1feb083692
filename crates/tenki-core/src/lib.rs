pub mod app;
pub mod config;
pub mod error;

pub use app::App;
pub use config::{
    Config, JmaConfig, LoggingConfig, StorageConfig, UiConfig, ValidationResult,
    AREA_CODE_PLACEHOLDER,
};
pub use error::{AppError, ConfigError};

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;

/// Initialize logging.
///
/// The terminal is owned by the UI, so events are appended to the configured
/// log file. `RUST_LOG` takes precedence over the configured level.
pub fn init(logging: &LoggingConfig) -> Result<()> {
    if let Some(parent) = logging.file.parent() {
        std::fs::create_dir_all(parent).context("Failed to create log directory")?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logging.file)
        .with_context(|| format!("Failed to open log file {}", logging.file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    tracing::info!("tenki core initialized");
    Ok(())
}
