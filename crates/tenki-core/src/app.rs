use std::path::Path;
use std::sync::Arc;

use crate::error::AppError;
use crate::{Config, ValidationResult};

/// Main application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
}

impl App {
    /// Load and validate the user's config file.
    ///
    /// Validation warnings are returned rather than logged because logging is
    /// configured from the loaded config.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the file cannot be read, parsed or validated.
    pub fn load() -> Result<(Self, ValidationResult), AppError> {
        let (config, validation) = Config::load_validated()?;

        Ok((Self::new(config), validation))
    }

    /// [`App::load`] for a config file at an explicit path
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the file cannot be read, parsed or validated.
    pub fn load_from(config_path: &Path) -> Result<(Self, ValidationResult), AppError> {
        let (config, validation) = Config::load_validated_from(config_path)?;

        Ok((Self::new(config), validation))
    }

    /// Create an application around an already loaded config
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Prepare directories the application writes to
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` when a directory cannot be created.
    pub fn initialize(&mut self) -> Result<(), AppError> {
        tracing::info!("Initializing application");

        if let Some(parent) = self.config.storage.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!(
            db_path = %self.config.storage.db_path.display(),
            "Application initialized successfully"
        );
        Ok(())
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) {
        tracing::info!("Shutting down application");
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }
}
