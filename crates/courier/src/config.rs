//! Configuration management for courier
//!
//! Loads analytics tuning and the default dataset location from a JSON file.
//! Every field has a default, so partial files are fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable naming the dataset file.
pub const DATASET_ENV: &str = "COURIER_DATASET";

/// Dataset used when nothing else names one.
pub const DEFAULT_DATASET: &str = "deliveries.csv";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
  /// Dataset path used when neither the CLI nor the environment names one
  #[serde(default)]
  pub dataset: Option<PathBuf>,
  /// Handler tuning
  #[serde(default)]
  pub analytics: AnalyticsConfig,
}

/// Knobs shared by the analytics handlers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
  /// Rows returned by ranking handlers when the question names no count
  #[serde(default = "default_top_k")]
  pub default_top_k: usize,
  /// Upper bound for a count named in the question
  #[serde(default = "default_max_top_k")]
  pub max_top_k: usize,
  /// Rows returned by the area delay ranking
  #[serde(default = "default_area_limit")]
  pub area_limit: usize,
  /// Decimal places for reported figures
  #[serde(default = "default_precision")]
  pub precision: u32,
  /// Upper bounds (km, ascending) of the distance bands
  #[serde(default = "default_distance_bands")]
  pub distance_bands_km: Vec<f64>,
}

/// Largest accepted `precision`.
pub const MAX_PRECISION: u32 = 10;

fn default_top_k() -> usize {
  5
}
fn default_max_top_k() -> usize {
  50
}
fn default_area_limit() -> usize {
  10
}
fn default_precision() -> u32 {
  2
}
fn default_distance_bands() -> Vec<f64> {
  vec![2.0, 5.0, 10.0, 20.0]
}

impl Default for AnalyticsConfig {
  fn default() -> Self {
    Self {
      default_top_k: default_top_k(),
      max_top_k: default_max_top_k(),
      area_limit: default_area_limit(),
      precision: default_precision(),
      distance_bands_km: default_distance_bands(),
    }
  }
}

impl AnalyticsConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.default_top_k == 0 {
      return Err(ConfigError::Invalid("default_top_k must be at least 1".to_string()));
    }
    if self.max_top_k < self.default_top_k {
      return Err(ConfigError::Invalid(format!(
        "max_top_k ({}) is smaller than default_top_k ({})",
        self.max_top_k, self.default_top_k
      )));
    }
    if self.area_limit == 0 {
      return Err(ConfigError::Invalid("area_limit must be at least 1".to_string()));
    }
    if self.precision > MAX_PRECISION {
      return Err(ConfigError::Invalid(format!(
        "precision ({}) exceeds {MAX_PRECISION} decimal places",
        self.precision
      )));
    }

    let bands = &self.distance_bands_km;
    if bands.iter().any(|bound| !bound.is_finite() || *bound <= 0.0) {
      return Err(ConfigError::Invalid("distance bands must be positive".to_string()));
    }
    if bands.windows(2).any(|pair| pair[0] >= pair[1]) {
      return Err(ConfigError::Invalid("distance bands must be strictly ascending".to_string()));
    }

    Ok(())
  }
}

impl Config {
  /// Load configuration from a file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    config.analytics.validate()?;
    Ok(config)
  }

  /// Load configuration from the working directory, the user config dir, or defaults
  pub fn load() -> Result<Self, ConfigError> {
    for path in Self::search_paths() {
      if path.exists() {
        return Self::load_from_file(path);
      }
    }

    Ok(Config::default())
  }

  /// Save configuration to a file
  pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(self)?;
    std::fs::write(path, content)?;
    Ok(())
  }

  fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("courier.json"), PathBuf::from(".courier.json")];
    if let Some(config_dir) = dirs::config_dir() {
      paths.push(config_dir.join("courier").join("config.json"));
    }
    paths
  }

  /// Pick the dataset path: explicit flag, then environment, then config, then the default.
  pub fn resolve_dataset_path(&self, cli_path: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_path {
      return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(DATASET_ENV) {
      if !path.trim().is_empty() {
        return PathBuf::from(path);
      }
    }
    self.dataset.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  #[test]
  fn test_analytics_default() {
    let analytics = AnalyticsConfig::default();
    assert_eq!(analytics.default_top_k, 5);
    assert_eq!(analytics.max_top_k, 50);
    assert_eq!(analytics.area_limit, 10);
    assert_eq!(analytics.precision, 2);
    assert_eq!(analytics.distance_bands_km, vec![2.0, 5.0, 10.0, 20.0]);
    assert!(analytics.validate().is_ok());
  }

  #[test]
  fn test_config_load_nonexistent_file() {
    let result = Config::load_from_file(Path::new("nonexistent.json"));
    assert!(result.is_err());
  }

  #[test]
  fn test_config_load_partial_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("partial.json");

    fs::write(&config_path, r#"{ "analytics": { "default_top_k": 3 } }"#).unwrap();

    let config = Config::load_from_file(&config_path).unwrap();
    assert_eq!(config.analytics.default_top_k, 3);
    assert_eq!(config.analytics.max_top_k, 50);
    assert_eq!(config.analytics.precision, 2);
    assert!(config.dataset.is_none());
  }

  #[test]
  fn test_config_load_invalid_json() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("invalid.json");

    fs::write(&config_path, "{ invalid json }").unwrap();

    let result = Config::load_from_file(&config_path);
    assert!(matches!(result, Err(ConfigError::Parse(_))));
  }

  #[test]
  fn test_config_load_rejects_invalid_settings() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("bad.json");

    fs::write(&config_path, r#"{ "analytics": { "distance_bands_km": [5.0, 2.0] } }"#).unwrap();

    let result = Config::load_from_file(&config_path);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
  }

  #[test]
  fn test_validate_rules() {
    let zero_k = AnalyticsConfig { default_top_k: 0, ..AnalyticsConfig::default() };
    assert!(zero_k.validate().is_err());

    let small_max = AnalyticsConfig { max_top_k: 2, ..AnalyticsConfig::default() };
    assert!(small_max.validate().is_err());

    let negative_band = AnalyticsConfig { distance_bands_km: vec![-1.0], ..AnalyticsConfig::default() };
    assert!(negative_band.validate().is_err());

    let no_bands = AnalyticsConfig { distance_bands_km: vec![], ..AnalyticsConfig::default() };
    assert!(no_bands.validate().is_ok());
  }

  #[test]
  fn test_validate_caps_precision() {
    let widest = AnalyticsConfig { precision: MAX_PRECISION, ..AnalyticsConfig::default() };
    assert!(widest.validate().is_ok());

    let overflowing = AnalyticsConfig { precision: 400, ..AnalyticsConfig::default() };
    let err = overflowing.validate().unwrap_err();
    assert!(err.to_string().contains("precision (400)"));
  }

  #[test]
  fn test_config_load_and_save() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("courier.json");

    let original = Config {
      dataset: Some(PathBuf::from("/data/zomato.csv")),
      analytics: AnalyticsConfig { area_limit: 4, precision: 1, ..AnalyticsConfig::default() },
    };

    original.save_to_file(&config_path).unwrap();
    let loaded = Config::load_from_file(&config_path).unwrap();

    assert_eq!(original, loaded);
  }

  #[test]
  fn test_explicit_dataset_path_wins() {
    let config = Config { dataset: Some(PathBuf::from("from-config.csv")), ..Config::default() };
    assert_eq!(config.resolve_dataset_path(Some(Path::new("cli.csv"))), PathBuf::from("cli.csv"));
  }
}
