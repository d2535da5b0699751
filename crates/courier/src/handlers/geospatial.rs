//! Handlers built on the restaurant-to-destination route distance.
//!
//! Only records whose both coordinate pairs are present and in range take part;
//! the rest of the dataset is untouched and still feeds every other handler.

use std::collections::BTreeMap;

use super::correlation::correlation_result;
use super::HandlerContext;
use crate::dataset::Record;
use crate::error::AnalysisError;
use crate::result::{AnalysisResult, Column, Series, Table};
use crate::stats;

const DISTANCE: &str = "distance";

/// `(record, km)` for every eligible record with a usable route.
fn routed<'a>(ctx: &HandlerContext<'a>) -> Result<Vec<(&'a Record, f64)>, AnalysisError> {
  Ok(ctx.eligible()?.into_iter().filter_map(|record| Some((record, record.route_km()?))).collect())
}

pub fn distance_duration_correlation(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let pairs: Vec<(f64, f64)> = routed(ctx)?.into_iter().map(|(record, km)| (km, record.duration_min)).collect();
  correlation_result(ctx, &pairs, DISTANCE, "distance and delivery time")
}

fn band_labels(bounds: &[f64]) -> Vec<String> {
  let mut labels = Vec::with_capacity(bounds.len() + 1);
  let mut lower = 0.0;
  for upper in bounds {
    labels.push(format!("{lower}-{upper} km"));
    lower = *upper;
  }
  labels.push(format!("{lower}+ km"));
  labels
}

fn band_of(bounds: &[f64], km: f64) -> usize {
  bounds.iter().position(|upper| km < *upper).unwrap_or(bounds.len())
}

/// Mean delivery time per distance band, nearest band first.
pub fn location_time_diff(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let bounds = &ctx.config.distance_bands_km;
  let labels = band_labels(bounds);

  let groups = stats::group_stats(routed(ctx)?.into_iter().map(|(record, km)| (band_of(bounds, km), record.duration_min)));
  let (Some(nearest), Some(farthest)) = (groups.first(), groups.last()) else {
    return Err(AnalysisError::insufficient_data(DISTANCE));
  };

  let mut series = Series::new("avg_time_min", "min");
  for group in &groups {
    series.push(labels[group.key].clone(), ctx.round(group.mean), group.count);
  }

  let routes: usize = groups.iter().map(|g| g.count).sum();
  let summary = format!(
    "Delivery time by restaurant-to-destination distance{}: {} averages {} min, {} averages {} min ({routes} deliveries)",
    ctx.scope(),
    labels[nearest.key],
    ctx.figure(nearest.mean),
    labels[farthest.key],
    ctx.figure(farthest.mean)
  );
  Ok(AnalysisResult::series(summary, series))
}

#[derive(Debug, Default)]
struct Area {
  durations: Vec<f64>,
  distances: Vec<f64>,
}

/// Slowest areas first, limited to the requested count or the configured area limit.
pub fn area_delay_ranking(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let cities = ctx.dataset.cities();
  let mut areas: BTreeMap<String, Area> = BTreeMap::new();
  for (record, km) in routed(ctx)? {
    let Some(city) = record.city.as_deref() else {
      continue;
    };
    let area = areas.entry(cities.resolve(city).unwrap_or(city).to_string()).or_default();
    area.durations.push(record.duration_min);
    area.distances.push(km);
  }

  let mut ranked: Vec<(String, f64, f64, usize)> = areas
    .into_iter()
    .filter_map(|(name, area)| {
      Some((name, stats::mean(&area.durations)?, stats::mean(&area.distances)?, area.durations.len()))
    })
    .collect();
  if ranked.is_empty() {
    return Err(AnalysisError::insufficient_data("area"));
  }

  ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
  let limit = if ctx.params.top_k.is_some() { ctx.top_k() } else { ctx.config.area_limit };
  ranked.truncate(limit.max(1));

  let mut table = Table::new(vec![
    Column::new("area"),
    Column::with_unit("avg_time_min", "min"),
    Column::with_unit("avg_distance_km", "km"),
    Column::new("deliveries"),
  ]);
  for (name, avg_time, avg_km, count) in &ranked {
    table.push_row(vec![name.as_str().into(), ctx.round(*avg_time).into(), ctx.round(*avg_km).into(), (*count).into()]);
  }

  let (worst, worst_time, _, _) = &ranked[0];
  let summary = format!(
    "Areas with the highest delivery delays{}: {worst} leads at {} min on average",
    ctx.scope(),
    ctx.figure(*worst_time)
  );
  Ok(AnalysisResult::table(summary, table))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AnalyticsConfig;
  use crate::geo::GeoPoint;
  use crate::handlers::fixtures::{dataset, delivery};
  use crate::intent::Parameters;

  const ORIGIN: GeoPoint = GeoPoint { lat: 12.9716, lon: 77.5946 };

  /// A delivery heading due north by roughly `km` kilometres.
  fn trip(city: &str, km: f64, minutes: f64) -> Record {
    let degrees = km / 111.194_926_644_558_73;
    Record {
      restaurant: Some(ORIGIN),
      destination: Some(GeoPoint::new(ORIGIN.lat + degrees, ORIGIN.lon)),
      ..delivery("P1", city, minutes)
    }
  }

  #[test]
  fn test_linear_distance_gives_strong_correlation() {
    let records = (1..=6).map(|i| trip("Urban", i as f64, 10.0 + 3.0 * i as f64)).collect();
    let data = dataset(records);
    let params = Parameters::default();
    let config = AnalyticsConfig::default();
    let ctx = HandlerContext::new(&data, &params, &config);

    let result = distance_duration_correlation(&ctx).unwrap();
    let scalar = result.as_scalar().unwrap();

    assert!((scalar.value.abs() - 1.0).abs() < 1e-6);
    assert_eq!(scalar.sample_size, Some(6));
    assert_eq!(scalar.strength, Some(stats::Strength::Strong));
  }

  #[test]
  fn test_invalid_coordinates_are_excluded() {
    let mut broken = trip("Urban", 3.0, 500.0);
    broken.destination = Some(GeoPoint::new(120.0, 77.0));
    let data = dataset(vec![trip("Urban", 1.0, 10.0), trip("Urban", 2.0, 20.0), broken, delivery("P9", "Urban", 900.0)]);
    let params = Parameters::default();
    let config = AnalyticsConfig::default();
    let ctx = HandlerContext::new(&data, &params, &config);

    let result = distance_duration_correlation(&ctx).unwrap();
    assert_eq!(result.as_scalar().unwrap().sample_size, Some(2));
    assert_eq!(data.len(), 4);
  }

  #[test]
  fn test_no_coordinates_is_insufficient() {
    let data = dataset(vec![delivery("P1", "Urban", 10.0), delivery("P2", "Urban", 20.0)]);
    let params = Parameters::default();
    let config = AnalyticsConfig::default();
    let ctx = HandlerContext::new(&data, &params, &config);

    assert_eq!(distance_duration_correlation(&ctx).unwrap_err(), AnalysisError::insufficient_data(DISTANCE));
    assert_eq!(location_time_diff(&ctx).unwrap_err(), AnalysisError::insufficient_data(DISTANCE));
    assert_eq!(area_delay_ranking(&ctx).unwrap_err(), AnalysisError::insufficient_data("area"));
  }

  #[test]
  fn test_band_labels_and_lookup() {
    let bounds = [2.0, 5.0, 10.0, 20.0];
    assert_eq!(band_labels(&bounds), vec!["0-2 km", "2-5 km", "5-10 km", "10-20 km", "20+ km"]);
    assert_eq!(band_of(&bounds, 0.0), 0);
    assert_eq!(band_of(&bounds, 2.0), 1);
    assert_eq!(band_of(&bounds, 19.9), 3);
    assert_eq!(band_of(&bounds, 250.0), 4);
    assert_eq!(band_labels(&[]), vec!["0+ km"]);
  }

  #[test]
  fn test_location_bands_skip_empty_ones() {
    let data = dataset(vec![trip("Urban", 1.0, 12.0), trip("Urban", 1.5, 14.0), trip("Urban", 25.0, 45.0)]);
    let params = Parameters::default();
    let config = AnalyticsConfig::default();
    let ctx = HandlerContext::new(&data, &params, &config);

    let result = location_time_diff(&ctx).unwrap();
    let points: Vec<(String, f64, usize)> =
      result.as_series().unwrap().points.iter().map(|p| (p.category.clone(), p.value, p.count)).collect();
    assert_eq!(points, vec![("0-2 km".to_string(), 13.0, 2), ("20+ km".to_string(), 45.0, 1)]);
  }

  #[test]
  fn test_area_ranking_slowest_first_and_limited() {
    let data = dataset(vec![
      trip("Urban", 3.0, 20.0),
      trip("Metropolitian", 6.0, 35.0),
      trip("Semi-Urban", 9.0, 48.0),
      trip("Urban", 5.0, 24.0),
    ]);
    let params = Parameters::default();
    let config = AnalyticsConfig { area_limit: 2, ..AnalyticsConfig::default() };
    let ctx = HandlerContext::new(&data, &params, &config);

    let result = area_delay_ranking(&ctx).unwrap();
    let table = result.as_table().unwrap();
    let names: Vec<String> = table.rows.iter().map(|row| row[0].to_string()).collect();

    assert_eq!(names, vec!["Semi-Urban", "Metropolitian"]);
    assert_eq!(table.column_names(), vec!["area", "avg_time_min", "avg_distance_km", "deliveries"]);
    assert!((table.rows[0][2].as_f64().unwrap() - 9.0).abs() < 0.02);
    assert!(result.summary.contains("Semi-Urban"));
  }

  #[test]
  fn test_area_ranking_honours_requested_count() {
    let data = dataset(vec![trip("A", 1.0, 10.0), trip("B", 1.0, 20.0), trip("C", 1.0, 30.0)]);
    let params = Parameters { top_k: Some(1), ..Parameters::default() };
    let config = AnalyticsConfig::default();
    let ctx = HandlerContext::new(&data, &params, &config);

    let table = area_delay_ranking(&ctx).unwrap().as_table().unwrap().clone();
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0][0].to_string(), "C");
  }
}
