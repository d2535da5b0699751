//! Static mapping from intent tag to handler function.

use std::collections::HashMap;

use crate::error::AnalysisError;
use crate::handlers::{aggregate, comparison, correlation, geospatial, ranking, HandlerFn};
use crate::intent::IntentTag;

#[derive(Clone, Default)]
pub struct Registry {
  handlers: HashMap<IntentTag, HandlerFn>,
}

impl std::fmt::Debug for Registry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut tags: Vec<&IntentTag> = self.handlers.keys().collect();
    tags.sort();
    f.debug_struct("Registry").field("intents", &tags).finish()
  }
}

impl Registry {
  /// A registry with nothing registered.
  pub fn empty() -> Self {
    Self::default()
  }

  /// Every supported intent wired to its handler.
  pub fn standard() -> Self {
    Self::empty()
      // Rankings
      .register(IntentTag::FastestPersonnel, ranking::fastest_personnel)
      .register(IntentTag::TopRatedFastest, ranking::top_rated_fastest)
      .register(IntentTag::HighestRated, ranking::highest_rated)
      // Group aggregates
      .register(IntentTag::AvgDurationByCity, aggregate::avg_duration_by_city)
      .register(IntentTag::VehicleEfficiency, aggregate::vehicle_efficiency)
      .register(IntentTag::OrderTypeDuration, aggregate::order_type_duration)
      .register(IntentTag::MultiDeliveryEffect, aggregate::multi_delivery_effect)
      .register(IntentTag::TimeOfDayEffect, aggregate::time_of_day_effect)
      .register(IntentTag::TrafficEffect, aggregate::traffic_effect)
      .register(IntentTag::WeatherEffect, aggregate::weather_effect)
      .register(IntentTag::VehicleConditionEffect, aggregate::vehicle_condition_effect)
      // Correlations and comparisons
      .register(IntentTag::AgeSpeedCorrelation, correlation::age_speed_correlation)
      .register(IntentTag::FestivalDelay, comparison::festival_delay)
      // Geospatial
      .register(IntentTag::LocationTimeDiff, geospatial::location_time_diff)
      .register(IntentTag::AreaDelayRanking, geospatial::area_delay_ranking)
      .register(IntentTag::DistanceDurationCorrelation, geospatial::distance_duration_correlation)
  }

  pub fn register(mut self, tag: IntentTag, handler: HandlerFn) -> Self {
    self.handlers.insert(tag, handler);
    self
  }

  /// The handler for `tag`; a missing entry means the registry was assembled wrong.
  pub fn lookup(&self, tag: IntentTag) -> Result<HandlerFn, AnalysisError> {
    self.handlers.get(&tag).copied().ok_or_else(|| AnalysisError::registry_integrity(tag.as_str()))
  }

  pub fn contains(&self, tag: IntentTag) -> bool {
    self.handlers.contains_key(&tag)
  }

  pub fn len(&self) -> usize {
    self.handlers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.handlers.is_empty()
  }
}
