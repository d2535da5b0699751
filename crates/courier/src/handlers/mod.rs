//! Analytics handlers, one function per intent, grouped by family.
//!
//! Every handler has the [`HandlerFn`] shape: a pure function of the dataset,
//! the extracted parameters and the analytics settings.

pub mod aggregate;
pub mod comparison;
pub mod correlation;
pub mod geospatial;
pub mod ranking;

use crate::config::AnalyticsConfig;
use crate::dataset::{Dataset, Domain, Record};
use crate::error::AnalysisError;
use crate::intent::{ParamKind, Parameters};
use crate::result::AnalysisResult;
use crate::stats;
use crate::text;

pub type HandlerFn = fn(&HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError>;

/// Everything a handler may read.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
  pub dataset: &'a Dataset,
  pub params: &'a Parameters,
  pub config: &'a AnalyticsConfig,
}

type FieldFn = fn(&Record) -> Option<&str>;

struct Filter {
  key: String,
  field: FieldFn,
}

impl<'a> HandlerContext<'a> {
  pub fn new(dataset: &'a Dataset, params: &'a Parameters, config: &'a AnalyticsConfig) -> Self {
    Self { dataset, params, config }
  }

  /// Records passing the question's city / vehicle / order filters.
  ///
  /// A filter value the dataset has never seen is an `InvalidParameter`; a known
  /// value simply narrows the records, which may leave none.
  pub fn eligible(&self) -> Result<Vec<&'a Record>, AnalysisError> {
    let mut filters = Vec::new();

    if let Some(city) = &self.params.city {
      filters.push(self.filter(ParamKind::City, city, self.dataset.cities(), |r| r.city.as_deref())?);
    }
    if let Some(vehicle) = &self.params.vehicle_type {
      filters.push(self.filter(ParamKind::VehicleType, vehicle, self.dataset.vehicle_types(), |r| {
        r.vehicle_type.as_deref()
      })?);
    }
    if let Some(order) = &self.params.order_type {
      filters.push(self.filter(ParamKind::OrderType, order, self.dataset.order_types(), |r| {
        r.order_type.as_deref()
      })?);
    }

    Ok(
      self
        .dataset
        .records()
        .iter()
        .filter(|record| {
          filters.iter().all(|filter| (filter.field)(record).is_some_and(|value| text::normalize(value) == filter.key))
        })
        .collect(),
    )
  }

  fn filter(
    &self,
    kind: ParamKind,
    value: &str,
    domain: &Domain,
    field: FieldFn,
  ) -> Result<Filter, AnalysisError> {
    match domain.resolve(value) {
      Some(canonical) => Ok(Filter { key: text::normalize(canonical), field }),
      None => Err(AnalysisError::invalid_parameter(kind.name(), value)),
    }
  }

  /// Requested row count, falling back to the configured default.
  pub fn top_k(&self) -> usize {
    let max = self.config.max_top_k.max(1);
    self.params.top_k.unwrap_or(self.config.default_top_k).clamp(1, max)
  }

  pub fn round(&self, value: f64) -> f64 {
    stats::round_to(value, self.config.precision)
  }

  /// `value` formatted with the configured precision, for summaries.
  pub fn figure(&self, value: f64) -> String {
    format!("{:.*}", self.config.precision as usize, value)
  }

  /// Human-readable note on the active filters, e.g. ` (city Urban, vehicle_type scooter)`.
  pub fn scope(&self) -> String {
    let parts: Vec<String> = self
      .params
      .pairs()
      .into_iter()
      .filter(|(name, _)| *name != ParamKind::TopK.name())
      .map(|(name, value)| format!("{name} {value}"))
      .collect();

    if parts.is_empty() {
      String::new()
    } else {
      format!(" ({})", parts.join(", "))
    }
  }
}


#[cfg(test)]
mod tests {
  use super::fixtures::*;
  use super::*;

  #[test]
  fn test_eligible_without_filters_returns_everything() {
    let data = dataset(vec![delivery("P1", "Urban", 10.0), delivery("P2", "Metropolitian", 20.0)]);
    let params = Parameters::default();
    let config = AnalyticsConfig::default();
    let ctx = HandlerContext::new(&data, &params, &config);

    assert_eq!(ctx.eligible().unwrap().len(), 2);
    assert_eq!(ctx.scope(), "");
  }

  #[test]
  fn test_city_filter_matches_normalized_values() {
    let data = dataset(vec![
      delivery("P1", "Semi-Urban", 10.0),
      delivery("P2", "semi urban", 12.0),
      delivery("P3", "Urban", 20.0),
    ]);
    let params = Parameters { city: Some("semi-urban".to_string()), ..Parameters::default() };
    let config = AnalyticsConfig::default();
    let ctx = HandlerContext::new(&data, &params, &config);

    let eligible = ctx.eligible().unwrap();
    assert_eq!(eligible.len(), 2);
    assert_eq!(ctx.scope(), " (city semi-urban)");
  }

  #[test]
  fn test_unknown_filter_value_is_invalid_parameter() {
    let data = dataset(vec![delivery("P1", "Urban", 10.0)]);
    let params = Parameters { city: Some("Atlantis".to_string()), ..Parameters::default() };
    let config = AnalyticsConfig::default();
    let ctx = HandlerContext::new(&data, &params, &config);

    assert_eq!(ctx.eligible().unwrap_err(), AnalysisError::invalid_parameter("city", "Atlantis"));
  }

  #[test]
  fn test_top_k_defaults_and_clamps() {
    let data = dataset(vec![]);
    let config = AnalyticsConfig { default_top_k: 3, max_top_k: 10, ..AnalyticsConfig::default() };

    let none = Parameters::default();
    assert_eq!(HandlerContext::new(&data, &none, &config).top_k(), 3);

    let huge = Parameters { top_k: Some(500), ..Parameters::default() };
    assert_eq!(HandlerContext::new(&data, &huge, &config).top_k(), 10);

    let zero = Parameters { top_k: Some(0), ..Parameters::default() };
    assert_eq!(HandlerContext::new(&data, &zero, &config).top_k(), 1);
  }
}
