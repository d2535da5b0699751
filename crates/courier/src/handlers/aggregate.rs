//! Mean delivery time grouped by one categorical dimension.

use super::HandlerContext;
use crate::dataset::{Record, TimeOfDay, TrafficDensity};
use crate::error::AnalysisError;
use crate::result::{AnalysisResult, Column, Series, Table};
use crate::stats::{self, GroupStats};

enum Order {
  Ascending,
  Descending,
}

fn grouped<K: Ord>(
  ctx: &HandlerContext<'_>,
  dimension: &str,
  key: impl Fn(&Record) -> Option<K>,
) -> Result<Vec<GroupStats<K>>, AnalysisError> {
  let pairs = ctx.eligible()?.into_iter().filter_map(|record| Some((key(record)?, record.duration_min)));
  let groups = stats::group_stats(pairs);
  if groups.is_empty() {
    return Err(AnalysisError::insufficient_data(dimension));
  }
  Ok(groups)
}

fn sort_by_mean<K>(groups: &mut [GroupStats<K>], order: Order) {
  // groups arrive key-ordered, so equal means keep name order
  match order {
    Order::Ascending => groups.sort_by(|a, b| a.mean.total_cmp(&b.mean)),
    Order::Descending => groups.sort_by(|a, b| b.mean.total_cmp(&a.mean)),
  }
}

fn describe<K>(
  ctx: &HandlerContext<'_>,
  heading: &str,
  groups: &[GroupStats<K>],
  label: impl Fn(&K) -> String,
) -> String {
  let deliveries: usize = groups.iter().map(|g| g.count).sum();
  let quickest = groups.iter().min_by(|a, b| a.mean.total_cmp(&b.mean));
  let slowest = groups.iter().max_by(|a, b| a.mean.total_cmp(&b.mean));

  match (quickest, slowest) {
    (Some(quick), Some(slow)) if groups.len() > 1 => format!(
      "{heading}{}: quickest {} ({} min), slowest {} ({} min) across {deliveries} deliveries",
      ctx.scope(),
      label(&quick.key),
      ctx.figure(quick.mean),
      label(&slow.key),
      ctx.figure(slow.mean)
    ),
    (Some(only), _) => format!(
      "{heading}{}: only {} present, averaging {} min over {deliveries} deliveries",
      ctx.scope(),
      label(&only.key),
      ctx.figure(only.mean)
    ),
    _ => format!("{heading}{}", ctx.scope()),
  }
}

fn stats_table(ctx: &HandlerContext<'_>, dimension: &str, groups: &[GroupStats<String>]) -> Table {
  let mut table = Table::new(vec![
    Column::new(dimension),
    Column::with_unit("avg_time_min", "min"),
    Column::with_unit("median_time_min", "min"),
    Column::new("deliveries"),
  ]);
  for group in groups {
    table.push_row(vec![
      group.key.as_str().into(),
      ctx.round(group.mean).into(),
      ctx.round(group.median).into(),
      group.count.into(),
    ]);
  }
  table
}

fn duration_series<K>(ctx: &HandlerContext<'_>, groups: &[GroupStats<K>], label: impl Fn(&K) -> String) -> Series {
  let mut series = Series::new("avg_time_min", "min");
  for group in groups {
    series.push(label(&group.key), ctx.round(group.mean), group.count);
  }
  series
}

/// Quickest city first.
pub fn avg_duration_by_city(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let cities = ctx.dataset.cities();
  let mut groups = grouped(ctx, "city", |r| {
    let city = r.city.as_deref()?;
    Some(cities.resolve(city).unwrap_or(city).to_string())
  })?;
  sort_by_mean(&mut groups, Order::Ascending);

  let summary = describe(ctx, "Average delivery time per city", &groups, String::clone);
  Ok(AnalysisResult::table(summary, stats_table(ctx, "city", &groups)))
}

/// Most efficient (lowest mean time) vehicle first.
pub fn vehicle_efficiency(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let vehicles = ctx.dataset.vehicle_types();
  let mut groups = grouped(ctx, "vehicle_type", |r| {
    let vehicle = r.vehicle_type.as_deref()?;
    Some(vehicles.resolve(vehicle).unwrap_or(vehicle).to_string())
  })?;
  sort_by_mean(&mut groups, Order::Ascending);

  let summary = describe(ctx, "Delivery time by vehicle type", &groups, String::clone);
  Ok(AnalysisResult::table(summary, stats_table(ctx, "vehicle_type", &groups)))
}

/// Longest-running order type first.
pub fn order_type_duration(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let orders = ctx.dataset.order_types();
  let mut groups = grouped(ctx, "order_type", |r| {
    let order = r.order_type.as_deref()?;
    Some(orders.resolve(order).unwrap_or(order).to_string())
  })?;
  sort_by_mean(&mut groups, Order::Descending);

  let summary = describe(ctx, "Delivery time by order type", &groups, String::clone);
  Ok(AnalysisResult::table(summary, stats_table(ctx, "order_type", &groups)))
}

pub fn multi_delivery_effect(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let groups = grouped(ctx, "multiple_deliveries", |r| r.multiple_deliveries)?;
  let label = |count: &u32| count.to_string();

  let summary = describe(ctx, "Delivery time by number of simultaneous deliveries", &groups, label);
  Ok(AnalysisResult::series(summary, duration_series(ctx, &groups, label)))
}

pub fn time_of_day_effect(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let groups = grouped(ctx, "time_of_day", |r| r.time_of_day)?;
  let label = |bucket: &TimeOfDay| bucket.label().to_string();

  let summary = describe(ctx, "Delivery time by time of day", &groups, label);
  Ok(AnalysisResult::series(summary, duration_series(ctx, &groups, label)))
}

pub fn traffic_effect(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let groups = grouped(ctx, "traffic", |r| r.traffic)?;
  let label = |density: &TrafficDensity| density.label().to_string();

  let summary = describe(ctx, "Delivery time by traffic density", &groups, label);
  Ok(AnalysisResult::series(summary, duration_series(ctx, &groups, label)))
}

pub fn vehicle_condition_effect(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let groups = grouped(ctx, "vehicle_condition", |r| r.vehicle_condition)?;
  let label = |condition: &u8| condition.to_string();

  let summary = describe(ctx, "Delivery time by vehicle condition", &groups, label);
  Ok(AnalysisResult::series(summary, duration_series(ctx, &groups, label)))
}

pub fn weather_effect(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let conditions = ctx.dataset.weather();
  let mut groups = grouped(ctx, "weather", |r| {
    let weather = r.weather.as_deref()?;
    Some(conditions.resolve(weather).unwrap_or(weather).to_string())
  })?;
  sort_by_mean(&mut groups, Order::Ascending);

  let summary = describe(ctx, "Delivery time by weather", &groups, String::clone);
  Ok(AnalysisResult::series(summary, duration_series(ctx, &groups, String::clone)))
}
