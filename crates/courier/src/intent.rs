//! Closed taxonomy of supported questions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier for every question family the engine can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentTag {
  FastestPersonnel,
  AvgDurationByCity,
  MultiDeliveryEffect,
  VehicleEfficiency,
  OrderTypeDuration,
  TimeOfDayEffect,
  FestivalDelay,
  TrafficEffect,
  WeatherEffect,
  LocationTimeDiff,
  TopRatedFastest,
  AgeSpeedCorrelation,
  VehicleConditionEffect,
  AreaDelayRanking,
  DistanceDurationCorrelation,
  HighestRated,
}

impl IntentTag {
  pub const ALL: [IntentTag; 16] = [
    IntentTag::FastestPersonnel,
    IntentTag::AvgDurationByCity,
    IntentTag::MultiDeliveryEffect,
    IntentTag::VehicleEfficiency,
    IntentTag::OrderTypeDuration,
    IntentTag::TimeOfDayEffect,
    IntentTag::FestivalDelay,
    IntentTag::TrafficEffect,
    IntentTag::WeatherEffect,
    IntentTag::LocationTimeDiff,
    IntentTag::TopRatedFastest,
    IntentTag::AgeSpeedCorrelation,
    IntentTag::VehicleConditionEffect,
    IntentTag::AreaDelayRanking,
    IntentTag::DistanceDurationCorrelation,
    IntentTag::HighestRated,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      IntentTag::FastestPersonnel => "fastest_personnel",
      IntentTag::AvgDurationByCity => "avg_duration_by_city",
      IntentTag::MultiDeliveryEffect => "multi_delivery_effect",
      IntentTag::VehicleEfficiency => "vehicle_efficiency",
      IntentTag::OrderTypeDuration => "order_type_duration",
      IntentTag::TimeOfDayEffect => "time_of_day_effect",
      IntentTag::FestivalDelay => "festival_delay",
      IntentTag::TrafficEffect => "traffic_effect",
      IntentTag::WeatherEffect => "weather_effect",
      IntentTag::LocationTimeDiff => "location_time_diff",
      IntentTag::TopRatedFastest => "top_rated_fastest",
      IntentTag::AgeSpeedCorrelation => "age_speed_correlation",
      IntentTag::VehicleConditionEffect => "vehicle_condition_effect",
      IntentTag::AreaDelayRanking => "area_delay_ranking",
      IntentTag::DistanceDurationCorrelation => "distance_duration_correlation",
      IntentTag::HighestRated => "highest_rated",
    }
  }
}

impl fmt::Display for IntentTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for IntentTag {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    IntentTag::ALL
      .iter()
      .copied()
      .find(|tag| tag.as_str() == s.trim())
      .ok_or_else(|| format!("unknown intent '{s}'"))
  }
}

/// Parameters a question may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
  City,
  VehicleType,
  OrderType,
  TopK,
}

impl ParamKind {
  pub fn name(&self) -> &'static str {
    match self {
      ParamKind::City => "city",
      ParamKind::VehicleType => "vehicle_type",
      ParamKind::OrderType => "order_type",
      ParamKind::TopK => "top_k",
    }
  }
}

/// Values extracted from a question. Absent fields were not mentioned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub city: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vehicle_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub order_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub top_k: Option<usize>,
}

impl Parameters {
  pub fn is_empty(&self) -> bool {
    self.city.is_none() && self.vehicle_type.is_none() && self.order_type.is_none() && self.top_k.is_none()
  }

  /// `(name, value)` pairs for the parameters that are set.
  pub fn pairs(&self) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(city) = &self.city {
      pairs.push((ParamKind::City.name(), city.clone()));
    }
    if let Some(vehicle) = &self.vehicle_type {
      pairs.push((ParamKind::VehicleType.name(), vehicle.clone()));
    }
    if let Some(order) = &self.order_type {
      pairs.push((ParamKind::OrderType.name(), order.clone()));
    }
    if let Some(k) = self.top_k {
      pairs.push((ParamKind::TopK.name(), k.to_string()));
    }
    pairs
  }
}

/// A classified question: which analysis to run and with what parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
  pub tag: IntentTag,
  pub params: Parameters,
}

impl Intent {
  pub fn new(tag: IntentTag) -> Self {
    Self { tag, params: Parameters::default() }
  }

  pub fn with_params(tag: IntentTag, params: Parameters) -> Self {
    Self { tag, params }
  }
}
