use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Placeholder substituted with the area code in [`JmaConfig::forecast_url`].
pub const AREA_CODE_PLACEHOLDER: &str = "{code}";

type Result<T> = std::result::Result<T, ConfigError>;

const APP_DIR_NAME: &str = "tenki";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote forecast service
    #[serde(default)]
    pub jma: JmaConfig,

    /// Local forecast cache
    #[serde(default)]
    pub storage: StorageConfig,

    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Japan Meteorological Agency endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JmaConfig {
    /// Area list resource (`{"offices": {...}}`)
    #[serde(default = "default_area_url")]
    pub area_url: String,

    /// Forecast resource, `{code}` is replaced by the area code
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_area_url() -> String {
    "https://www.jma.go.jp/bosai/common/const/area.json".to_string()
}

fn default_forecast_url() -> String {
    "https://www.jma.go.jp/bosai/forecast/data/forecast/{code}.json".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for JmaConfig {
    fn default() -> Self {
        Self {
            area_url: default_area_url(),
            forecast_url: default_forecast_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file holding areas, forecast runs and forecast items
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_db_path() -> PathBuf {
    default_config_dir().join("weather.db")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Title shown in the header bar
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_title() -> String {
    "天気予報アプリ".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file; the terminal belongs to the UI so logs never go to stdout
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    default_config_dir().join("tenki.log")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jma: JmaConfig::default(),
            storage: StorageConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    ///
    /// # Errors
    ///
    /// `NoConfigDir`, `Io` or `ParseError` when the file cannot be located, read or parsed.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, writing defaults there if missing
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read or written, `ParseError` when it is not valid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Io {
            path: config_path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    ///
    /// # Errors
    ///
    /// Load errors as in [`Config::load`], or `Invalid` when validation finds errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config_path = Self::config_path()?;
        Self::load_validated_from(&config_path)
    }

    /// [`Config::load_validated`] for an explicit path
    ///
    /// # Errors
    ///
    /// Load errors as in [`Config::load_from`], or `Invalid` when validation finds errors.
    pub fn load_validated_from(config_path: &Path) -> Result<(Self, ValidationResult)> {
        let config = Self::load_from(config_path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.jma.area_url, "jma.area_url", &mut result);

        if !self.jma.forecast_url.contains(AREA_CODE_PLACEHOLDER) {
            result.add_error(
                "jma.forecast_url",
                format!("URL template must contain {}", AREA_CODE_PLACEHOLDER),
            );
        } else {
            // Any real code makes the template a concrete URL
            let sample = self.jma.forecast_url.replace(AREA_CODE_PLACEHOLDER, "130000");
            self.validate_url(&sample, "jma.forecast_url", &mut result);
        }

        if self.jma.timeout_secs == 0 {
            result.add_error("jma.timeout_secs", "Timeout must be greater than 0");
        } else if self.jma.timeout_secs > 60 {
            result.add_warning(
                "jma.timeout_secs",
                "Timeout is unusually long (>60s); the UI blocks while fetching",
            );
        }

        if self.storage.db_path.as_os_str().is_empty() {
            result.add_error("storage.db_path", "Database path must not be empty");
        }

        if self.ui.title.trim().is_empty() {
            result.add_warning("ui.title", "Title is empty");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to an explicit path
    ///
    /// # Errors
    ///
    /// `Io` when the directory or file cannot be written.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        let io_error = |source| ConfigError::Io {
            path: config_path.to_path_buf(),
            source,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, contents).map_err(io_error)?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join(APP_DIR_NAME);

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_default_timeout_is_ten_seconds() {
        assert_eq!(Config::default().jma.timeout_secs, 10);
    }

    #[test]
    fn test_invalid_area_url() {
        let mut config = Config::default();
        config.jma.area_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "jma.area_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.jma.area_url = "ftp://www.jma.go.jp/area.json".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_forecast_url_requires_placeholder() {
        let mut config = Config::default();
        config.jma.forecast_url = "https://www.jma.go.jp/forecast/130000.json".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "jma.forecast_url"));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = Config::default();
        config.jma.timeout_secs = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "jma.timeout_secs"));
    }

    #[test]
    fn test_long_timeout_is_warning() {
        let mut config = Config::default();
        config.jma.timeout_secs = 120;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "jma.timeout_secs"));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.jma.timeout_secs, 10);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.jma.forecast_url, config.jma.forecast_url);
        assert_eq!(reloaded.storage.db_path, config.storage.db_path);
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[storage]
db_path = "/tmp/tenki/test.db"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.storage.db_path, PathBuf::from("/tmp/tenki/test.db"));
        assert_eq!(config.jma.timeout_secs, 10);
        assert_eq!(config.ui.title, "天気予報アプリ");
    }

    #[test]
    fn test_storage_only_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\ndb_path = \"/tmp/x.db\"\n").unwrap();

        let (config, validation) = Config::load_validated_from(&path).unwrap();
        assert_eq!(config.storage.db_path, PathBuf::from("/tmp/x.db"));
        assert!(validation.is_valid());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[jma\narea_url = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_failed_validation_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[jma]\ntimeout_secs = 0\n").unwrap();

        let err = Config::load_validated_from(&path).unwrap_err();
        match err {
            ConfigError::Invalid(summary) => assert!(summary.contains("jma.timeout_secs")),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }
}
