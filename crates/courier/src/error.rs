//! Error taxonomy for dispatch, ingestion and configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Failures that can occur while answering a question.
///
/// Everything except `RegistryIntegrity` is user facing and gets folded into a
/// normal answer by the dispatch engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
  #[error("I don't understand this question")]
  ClassificationMiss,

  #[error("Insufficient data for this question ({dimension})")]
  InsufficientData { dimension: String },

  #[error("Unknown {name} '{value}': no records in the dataset have this value")]
  InvalidParameter { name: String, value: String },

  #[error("Internal error: intent '{intent}' has no registered handler")]
  RegistryIntegrity { intent: String },
}

impl AnalysisError {
  pub fn insufficient_data(dimension: impl Into<String>) -> Self {
    Self::InsufficientData { dimension: dimension.into() }
  }

  pub fn invalid_parameter(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self::InvalidParameter { name: name.into(), value: value.into() }
  }

  pub fn registry_integrity(intent: impl Into<String>) -> Self {
    Self::RegistryIntegrity { intent: intent.into() }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::ClassificationMiss => ErrorKind::ClassificationMiss,
      Self::InsufficientData { .. } => ErrorKind::InsufficientData,
      Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
      Self::RegistryIntegrity { .. } => ErrorKind::RegistryIntegrity,
    }
  }

  /// Whether this error is reported to the asker instead of aborting the request.
  pub fn is_user_facing(&self) -> bool {
    !matches!(self, Self::RegistryIntegrity { .. })
  }
}

/// Serializable discriminant of [`AnalysisError`], carried on answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  ClassificationMiss,
  InsufficientData,
  InvalidParameter,
  RegistryIntegrity,
}

/// Failures while reading a delivery dataset from disk.
#[derive(Error, Debug)]
pub enum DatasetError {
  #[error("Failed to read dataset {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Malformed CSV: {0}")]
  Csv(#[from] csv::Error),

  #[error("Required column '{column}' not found (tried: {candidates})")]
  MissingColumn { column: String, candidates: String },
}

impl DatasetError {
  pub fn missing_column(column: impl Into<String>, candidates: &[&str]) -> Self {
    Self::MissingColumn { column: column.into(), candidates: candidates.join(", ") }
  }
}

/// Failures while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Failed to access config file: {0}")]
  Io(#[from] std::io::Error),

  #[error("Invalid config JSON: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("Invalid analytics setting: {0}")]
  Invalid(String),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_only_registry_integrity_aborts() {
    assert!(AnalysisError::ClassificationMiss.is_user_facing());
    assert!(AnalysisError::insufficient_data("city").is_user_facing());
    assert!(AnalysisError::invalid_parameter("city", "Atlantis").is_user_facing());
    assert!(!AnalysisError::registry_integrity("weather_effect").is_user_facing());
  }

  #[test]
  fn test_messages_name_the_offending_value() {
    let err = AnalysisError::invalid_parameter("city", "Atlantis");
    assert!(err.to_string().contains("Atlantis"));
    assert!(err.to_string().contains("city"));

    let err = AnalysisError::insufficient_data("festival");
    assert!(err.to_string().contains("festival"));
  }

  #[test]
  fn test_kind_serializes_snake_case() {
    let json = serde_json::to_string(&ErrorKind::InsufficientData).unwrap();
    assert_eq!(json, "\"insufficient_data\"");
  }

  #[test]
  fn test_missing_column_lists_candidates() {
    let err = DatasetError::missing_column("duration", &["Time_taken (min)", "Time_taken"]);
    assert!(err.to_string().contains("Time_taken (min), Time_taken"));
  }
}
