//! Self-describing analysis results.
//!
//! Everything a renderer or exporter needs (column names, units, labels) is carried
//! on the result itself so presentation code never has to know which handler ran.

use serde::Serialize;

use crate::error::ErrorKind;
use crate::intent::Intent;
use crate::stats::Strength;

/// A single value cell in a [`Table`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
  Text(String),
  Integer(i64),
  Number(f64),
  /// No value; serialized as `null`.
  Empty,
}

impl Cell {
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Cell::Number(value) => Some(*value),
      Cell::Integer(value) => Some(*value as f64),
      Cell::Text(_) | Cell::Empty => None,
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Cell::Text(value) => Some(value),
      _ => None,
    }
  }
}

impl std::fmt::Display for Cell {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Cell::Text(value) => f.write_str(value),
      Cell::Integer(value) => write!(f, "{value}"),
      Cell::Number(value) => write!(f, "{value}"),
      Cell::Empty => f.write_str("-"),
    }
  }
}

impl From<&str> for Cell {
  fn from(value: &str) -> Self {
    Cell::Text(value.to_string())
  }
}

impl From<String> for Cell {
  fn from(value: String) -> Self {
    Cell::Text(value)
  }
}

impl From<f64> for Cell {
  fn from(value: f64) -> Self {
    Cell::Number(value)
  }
}

impl From<Option<f64>> for Cell {
  fn from(value: Option<f64>) -> Self {
    value.map_or(Cell::Empty, Cell::Number)
  }
}

impl From<usize> for Cell {
  fn from(value: usize) -> Self {
    Cell::Integer(value as i64)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub unit: Option<String>,
}

impl Column {
  pub fn new(name: &str) -> Self {
    Self { name: name.to_string(), unit: None }
  }

  pub fn with_unit(name: &str, unit: &str) -> Self {
    Self { name: name.to_string(), unit: Some(unit.to_string()) }
  }
}

/// Ordered rows of named columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
  pub columns: Vec<Column>,
  pub rows: Vec<Vec<Cell>>,
}

impl Table {
  pub fn new(columns: Vec<Column>) -> Self {
    Self { columns, rows: Vec::new() }
  }

  pub fn push_row(&mut self, row: Vec<Cell>) {
    debug_assert_eq!(row.len(), self.columns.len(), "row width must match columns");
    self.rows.push(row);
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn column_names(&self) -> Vec<&str> {
    self.columns.iter().map(|column| column.name.as_str()).collect()
  }

  /// Cells of the named column, top to bottom.
  pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
    let index = self.columns.iter().position(|column| column.name == name)?;
    Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
  pub category: String,
  pub value: f64,
  /// Deliveries behind `value`.
  pub count: usize,
}

/// Chart-ready ordered `(category, value)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
  pub label: String,
  pub unit: String,
  pub points: Vec<SeriesPoint>,
}

impl Series {
  pub fn new(label: &str, unit: &str) -> Self {
    Self { label: label.to_string(), unit: unit.to_string(), points: Vec::new() }
  }

  pub fn push(&mut self, category: impl Into<String>, value: f64, count: usize) {
    self.points.push(SeriesPoint { category: category.into(), value, count });
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scalar {
  pub value: f64,
  pub unit: String,
  pub label: String,
  /// Observations the value was computed from.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sample_size: Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub strength: Option<Strength>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultBody {
  Scalar(Scalar),
  Table(Table),
  Series(Series),
}

/// Output of one analysis: a typed body plus a natural-language summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
  pub summary: String,
  pub body: ResultBody,
}

impl AnalysisResult {
  pub fn table(summary: impl Into<String>, table: Table) -> Self {
    Self { summary: summary.into(), body: ResultBody::Table(table) }
  }

  pub fn series(summary: impl Into<String>, series: Series) -> Self {
    Self { summary: summary.into(), body: ResultBody::Series(series) }
  }

  pub fn scalar(summary: impl Into<String>, value: f64, unit: &str, label: &str) -> Self {
    Self {
      summary: summary.into(),
      body: ResultBody::Scalar(Scalar {
        value,
        unit: unit.to_string(),
        label: label.to_string(),
        sample_size: None,
        strength: None,
      }),
    }
  }

  /// A correlation coefficient with its sample size and strength label.
  pub fn correlation(summary: impl Into<String>, r: f64, sample_size: usize, strength: Strength, label: &str) -> Self {
    Self {
      summary: summary.into(),
      body: ResultBody::Scalar(Scalar {
        value: r,
        unit: "r".to_string(),
        label: label.to_string(),
        sample_size: Some(sample_size),
        strength: Some(strength),
      }),
    }
  }

  /// A summary with an empty table, used for fallbacks and user-facing errors.
  pub fn message(summary: impl Into<String>) -> Self {
    Self::table(summary, Table::default())
  }

  pub fn as_table(&self) -> Option<&Table> {
    match &self.body {
      ResultBody::Table(table) => Some(table),
      _ => None,
    }
  }

  pub fn as_series(&self) -> Option<&Series> {
    match &self.body {
      ResultBody::Series(series) => Some(series),
      _ => None,
    }
  }

  pub fn as_scalar(&self) -> Option<&Scalar> {
    match &self.body {
      ResultBody::Scalar(scalar) => Some(scalar),
      _ => None,
    }
  }
}

/// What the dispatch boundary hands back for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
  pub query: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub intent: Option<Intent>,
  pub result: AnalysisResult,
  /// Set when the answer explains why no figures could be produced.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub issue: Option<ErrorKind>,
}

impl Answer {
  pub fn summary(&self) -> &str {
    &self.result.summary
  }
}
