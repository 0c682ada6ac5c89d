//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::views::chart::ReferenceRange;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where pets and records are persisted
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("budgie-fit").to_string_lossy().to_string())
        .unwrap_or_else(|| "./budgie_fit_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Spreadsheet export settings
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub output_dir: String,

    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,
}

fn default_export_dir() -> String {
    dirs::download_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string())
}

fn default_filename_prefix() -> String {
    crate::export::DEFAULT_FILENAME_PREFIX.to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_export_dir(),
            filename_prefix: default_filename_prefix(),
        }
    }
}

/// Chart reference band (healthy weight range, grams)
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_reference_min")]
    pub reference_min: f64,

    #[serde(default = "default_reference_max")]
    pub reference_max: f64,
}

fn default_reference_min() -> f64 {
    ReferenceRange::default().min
}

fn default_reference_max() -> f64 {
    ReferenceRange::default().max
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            reference_min: default_reference_min(),
            reference_max: default_reference_max(),
        }
    }
}

impl ChartConfig {
    pub fn reference_range(&self) -> ReferenceRange {
        ReferenceRange::new(self.reference_min, self.reference_max)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config = Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate().map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })?;
        Ok(config)
    }

    /// Check values that parse but cannot be used
    pub fn validate(&self) -> Result<(), String> {
        let chart = &self.chart;
        if !(chart.reference_min.is_finite() && chart.reference_max.is_finite()) {
            return Err("chart reference range must be finite".to_string());
        }
        if chart.reference_min > chart.reference_max {
            return Err(format!(
                "chart.reference_min ({}) is greater than chart.reference_max ({})",
                chart.reference_min, chart.reference_max
            ));
        }
        Ok(())
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("budgie-fit").join("config.toml")),
            Some(PathBuf::from("./budgie-fit.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable source
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(data_dir) = var("BUDGIE_FIT_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(output_dir) = var("BUDGIE_FIT_EXPORT_DIR") {
            self.export.output_dir = output_dir;
        }
        if let Some(level) = var("BUDGIE_FIT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("BUDGIE_FIT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_path(path: &str) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(path),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Budgie Fit Configuration
#
# Environment variables override these settings:
# - BUDGIE_FIT_DATA_DIR
# - BUDGIE_FIT_EXPORT_DIR
# - BUDGIE_FIT_LOG_LEVEL
# - BUDGIE_FIT_LOG_FORMAT

[storage]
# Directory holding budgieFit_pets.json and budgieFit_logs.json
data_dir = "~/.local/share/budgie-fit"

[export]
# Where exported spreadsheets are written
output_dir = "~/Downloads"

# Exported file name: <prefix>_<YYYY-MM-DD>.xlsx
filename_prefix = "budgie_weights"

[chart]
# Healthy weight band drawn on charts (grams)
reference_min = 30.0
reference_max = 40.0

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"

# Optional log file path
# file = "/tmp/budgie-fit.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::parse(
            r#"
            [chart]
            reference_min = 28.5

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.chart.reference_min, 28.5);
        assert_eq!(config.chart.reference_max, 40.0);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.export.filename_prefix, "budgie_weights");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.storage.data_dir, "~/.local/share/budgie-fit");
        assert_eq!(config.chart.reference_range(), ReferenceRange::default());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BUDGIE_FIT_DATA_DIR", "/tmp/birds"),
            ("BUDGIE_FIT_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, "/tmp/birds");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("/var/data"), PathBuf::from("/var/data"));
        assert_eq!(expand_path("~user/x"), PathBuf::from("~user/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/birds"), home.join("birds"));
            assert_eq!(expand_path("~"), home);
        }
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert!(matches!(Config::load(&path), Err(ConfigError::Io { .. })));

        std::fs::write(&path, "[chart]\nreference_min = \"low\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_inverted_reference_range_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chart]\nreference_min = 45.0\nreference_max = 35.0\n").unwrap();

        match Config::load(&path) {
            Err(ConfigError::Parse { error, .. }) => assert!(error.contains("reference_min")),
            other => panic!("expected parse error, got {:?}", other),
        }

        std::fs::write(&path, "[chart]\nreference_min = 35.0\nreference_max = 35.0\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.chart.reference_range(), ReferenceRange::new(35.0, 35.0));
        assert!(Config::default().validate().is_ok());
    }
}
