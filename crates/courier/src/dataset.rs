//! In-memory delivery dataset.
//!
//! A [`Dataset`] is built once from a list of [`Record`]s and never mutated
//! afterwards; the dispatch engine shares it behind an `Arc`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::geo::{self, GeoPoint};
use crate::text;

/// Bucket of the day in which an order was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
  Morning,
  Afternoon,
  Evening,
  Night,
}

impl TimeOfDay {
  /// morning 05-12, afternoon 12-17, evening 17-21, night otherwise
  pub fn from_hour(hour: u32) -> Self {
    match hour {
      5..=11 => TimeOfDay::Morning,
      12..=16 => TimeOfDay::Afternoon,
      17..=20 => TimeOfDay::Evening,
      _ => TimeOfDay::Night,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      TimeOfDay::Morning => "morning",
      TimeOfDay::Afternoon => "afternoon",
      TimeOfDay::Evening => "evening",
      TimeOfDay::Night => "night",
    }
  }
}

/// Road traffic density, ordered from lightest to heaviest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficDensity {
  Low,
  Medium,
  High,
  Jam,
}

impl TrafficDensity {
  pub fn parse(value: &str) -> Option<Self> {
    match value.trim().to_lowercase().as_str() {
      "low" => Some(TrafficDensity::Low),
      "medium" => Some(TrafficDensity::Medium),
      "high" => Some(TrafficDensity::High),
      "jam" => Some(TrafficDensity::Jam),
      _ => None,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      TrafficDensity::Low => "low",
      TrafficDensity::Medium => "medium",
      TrafficDensity::High => "high",
      TrafficDensity::Jam => "jam",
    }
  }
}

/// One delivery event.
///
/// Only the duration is mandatory; every other attribute may be missing in
/// real exports and handlers skip records lacking the field they need.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
  pub personnel_id: Option<String>,
  pub age: Option<u32>,
  /// Within [0, 5] when present.
  pub rating: Option<f64>,
  pub order_date: Option<NaiveDate>,
  pub time_of_day: Option<TimeOfDay>,
  /// Minutes, never negative.
  pub duration_min: f64,
  pub city: Option<String>,
  pub vehicle_type: Option<String>,
  pub vehicle_condition: Option<u8>,
  pub traffic: Option<TrafficDensity>,
  pub weather: Option<String>,
  pub festival: Option<bool>,
  pub order_type: Option<String>,
  pub multiple_deliveries: Option<u32>,
  pub restaurant: Option<GeoPoint>,
  pub destination: Option<GeoPoint>,
}

impl Record {
  /// A record with the given duration and nothing else filled in.
  pub fn with_duration(duration_min: f64) -> Self {
    Self { duration_min: duration_min.max(0.0), ..Self::default() }
  }

  /// Restaurant-to-destination distance, `None` if either end is missing or out of range.
  pub fn route_km(&self) -> Option<f64> {
    geo::route_distance(self.restaurant, self.destination)
  }
}

/// The distinct values of one categorical column, keyed by their normalized form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domain {
  values: BTreeMap<String, String>,
}

impl Domain {
  fn from_values<'a>(values: impl Iterator<Item = &'a str>) -> Self {
    let mut domain = Self::default();
    for value in values {
      let key = text::normalize(value);
      if !key.is_empty() {
        domain.values.entry(key).or_insert_with(|| value.to_string());
      }
    }
    domain
  }

  /// Canonical dataset spelling for `raw`, compared after normalization.
  pub fn resolve(&self, raw: &str) -> Option<&str> {
    self.values.get(&text::normalize(raw)).map(String::as_str)
  }

  /// `(normalized, canonical)` pairs.
  pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
    self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

/// Immutable, validated collection of delivery records.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
  records: Vec<Record>,
  cities: Domain,
  vehicle_types: Domain,
  order_types: Domain,
  weather: Domain,
}

impl Dataset {
  pub fn new(records: Vec<Record>) -> Self {
    let cities = Domain::from_values(records.iter().filter_map(|r| r.city.as_deref()));
    let vehicle_types = Domain::from_values(records.iter().filter_map(|r| r.vehicle_type.as_deref()));
    let order_types = Domain::from_values(records.iter().filter_map(|r| r.order_type.as_deref()));
    let weather = Domain::from_values(records.iter().filter_map(|r| r.weather.as_deref()));

    Self { records, cities, vehicle_types, order_types, weather }
  }

  pub fn records(&self) -> &[Record] {
    &self.records
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn cities(&self) -> &Domain {
    &self.cities
  }

  pub fn vehicle_types(&self) -> &Domain {
    &self.vehicle_types
  }

  pub fn order_types(&self) -> &Domain {
    &self.order_types
  }

  pub fn weather(&self) -> &Domain {
    &self.weather
  }
}

impl fmt::Display for Dataset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} records, {} cities, {} vehicle types, {} order types, {} weather conditions",
      self.records.len(),
      self.cities.len(),
      self.vehicle_types.len(),
      self.order_types.len(),
      self.weather.len()
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(city: &str, vehicle: &str) -> Record {
    Record {
      city: Some(city.to_string()),
      vehicle_type: Some(vehicle.to_string()),
      ..Record::with_duration(20.0)
    }
  }

  #[test]
  fn test_time_of_day_buckets() {
    assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
    assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
    assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
    assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
    assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
    assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
    assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
  }

  #[test]
  fn test_traffic_parse_and_order() {
    assert_eq!(TrafficDensity::parse(" Jam "), Some(TrafficDensity::Jam));
    assert_eq!(TrafficDensity::parse("MEDIUM"), Some(TrafficDensity::Medium));
    assert_eq!(TrafficDensity::parse("NaN"), None);
    assert!(TrafficDensity::Low < TrafficDensity::Jam);
  }

  #[test]
  fn test_with_duration_never_negative() {
    assert_eq!(Record::with_duration(-3.0).duration_min, 0.0);
  }

  #[test]
  fn test_domains_are_built_from_records() {
    let dataset = Dataset::new(vec![
      record("Semi-Urban", "electric_scooter"),
      record("Urban", "motorcycle"),
      record("Urban", "scooter"),
    ]);

    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.cities().len(), 2);
    assert_eq!(dataset.cities().resolve("semi urban"), Some("Semi-Urban"));
    assert_eq!(dataset.cities().resolve("URBAN"), Some("Urban"));
    assert_eq!(dataset.cities().resolve("Atlantis"), None);
    assert_eq!(dataset.vehicle_types().resolve("electric scooter"), Some("electric_scooter"));
    assert!(dataset.order_types().is_empty());
  }

  #[test]
  fn test_weather_domain_and_summary() {
    let dataset = Dataset::new(vec![
      Record { weather: Some("Sunny".into()), ..record("Urban", "scooter") },
      Record { weather: Some("sunny".into()), ..record("Urban", "scooter") },
      Record { weather: Some("Fog".into()), ..record("Urban", "scooter") },
    ]);

    assert_eq!(dataset.weather().len(), 2);
    assert_eq!(dataset.weather().resolve("SUNNY"), Some("Sunny"));
    assert_eq!(
      dataset.to_string(),
      "3 records, 1 cities, 1 vehicle types, 0 order types, 2 weather conditions"
    );
  }

  #[test]
  fn test_route_km_requires_both_valid_points() {
    let mut rec = Record::with_duration(10.0);
    assert_eq!(rec.route_km(), None);

    rec.restaurant = Some(GeoPoint::new(12.0, 77.0));
    rec.destination = Some(GeoPoint::new(12.0, 77.0));
    assert_eq!(rec.route_km(), Some(0.0));

    rec.destination = Some(GeoPoint::new(95.0, 77.0));
    assert_eq!(rec.route_km(), None);
  }
}
