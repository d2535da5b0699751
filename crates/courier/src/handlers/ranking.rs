//! Per-personnel rankings.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::HandlerContext;
use crate::error::AnalysisError;
use crate::result::{AnalysisResult, Column, Table};
use crate::stats;

const PERSONNEL: &str = "personnel_id";

/// Durations and ratings collected for one delivery person.
#[derive(Debug, Default)]
struct Courier {
  durations: Vec<f64>,
  ratings: Vec<f64>,
}

#[derive(Debug)]
struct Standing {
  id: String,
  avg_time: f64,
  avg_rating: Option<f64>,
  deliveries: usize,
  rated: usize,
}

fn standings(ctx: &HandlerContext<'_>) -> Result<Vec<Standing>, AnalysisError> {
  let mut couriers: BTreeMap<&str, Courier> = BTreeMap::new();
  for record in ctx.eligible()? {
    let Some(id) = record.personnel_id.as_deref() else {
      continue;
    };
    let courier = couriers.entry(id).or_default();
    courier.durations.push(record.duration_min);
    if let Some(rating) = record.rating {
      courier.ratings.push(rating);
    }
  }

  Ok(
    couriers
      .into_iter()
      .filter_map(|(id, courier)| {
        Some(Standing {
          id: id.to_string(),
          avg_time: stats::mean(&courier.durations)?,
          avg_rating: stats::mean(&courier.ratings),
          deliveries: courier.durations.len(),
          rated: courier.ratings.len(),
        })
      })
      .collect(),
  )
}

/// Lowest mean delivery time first; ties by identifier.
pub fn fastest_personnel(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let mut ranked = standings(ctx)?;
  if ranked.is_empty() {
    return Err(AnalysisError::insufficient_data(PERSONNEL));
  }

  // standings are id-ordered and the sort is stable
  ranked.sort_by(|a, b| a.avg_time.total_cmp(&b.avg_time));
  ranked.truncate(ctx.top_k());

  let mut table = Table::new(vec![
    Column::new("rank"),
    Column::new(PERSONNEL),
    Column::with_unit("avg_time_min", "min"),
    Column::new("deliveries"),
  ]);
  for (rank, standing) in ranked.iter().enumerate() {
    table.push_row(vec![
      (rank + 1).into(),
      standing.id.as_str().into(),
      ctx.round(standing.avg_time).into(),
      standing.deliveries.into(),
    ]);
  }

  let best = &ranked[0];
  let summary = format!(
    "Fastest delivery person on average{}: {} at {} min over {} deliveries",
    ctx.scope(),
    best.id,
    ctx.figure(best.avg_time),
    best.deliveries
  );
  Ok(AnalysisResult::table(summary, table))
}

fn by_rating_desc(a: &Standing, b: &Standing) -> Ordering {
  let (ra, rb) = (a.avg_rating.unwrap_or(0.0), b.avg_rating.unwrap_or(0.0));
  rb.total_cmp(&ra)
}

/// Best rated personnel, breaking rating ties by speed.
pub fn top_rated_fastest(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let mut ranked: Vec<Standing> = standings(ctx)?.into_iter().filter(|s| s.avg_rating.is_some()).collect();
  if ranked.is_empty() {
    return Err(AnalysisError::insufficient_data("rating"));
  }

  ranked.sort_by(|a, b| {
    by_rating_desc(a, b)
      .then_with(|| a.avg_time.total_cmp(&b.avg_time))
      .then_with(|| a.id.cmp(&b.id))
  });
  ranked.truncate(ctx.top_k());

  let mut table = Table::new(vec![
    Column::new("rank"),
    Column::new(PERSONNEL),
    Column::with_unit("avg_rating", "stars"),
    Column::with_unit("avg_time_min", "min"),
    Column::new("deliveries"),
  ]);
  for (rank, standing) in ranked.iter().enumerate() {
    table.push_row(vec![
      (rank + 1).into(),
      standing.id.as_str().into(),
      ctx.round(standing.avg_rating.unwrap_or_default()).into(),
      ctx.round(standing.avg_time).into(),
      standing.deliveries.into(),
    ]);
  }

  let best = &ranked[0];
  let summary = format!(
    "Top rated and fastest{}: {} with a {} rating and {} min average delivery time",
    ctx.scope(),
    best.id,
    ctx.figure(best.avg_rating.unwrap_or_default()),
    ctx.figure(best.avg_time)
  );
  Ok(AnalysisResult::table(summary, table))
}

/// Highest mean rating first; ties by identifier.
pub fn highest_rated(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let mut ranked: Vec<Standing> = standings(ctx)?.into_iter().filter(|s| s.avg_rating.is_some()).collect();
  if ranked.is_empty() {
    return Err(AnalysisError::insufficient_data("rating"));
  }

  ranked.sort_by(by_rating_desc);
  ranked.truncate(ctx.top_k());

  let mut table = Table::new(vec![
    Column::new("rank"),
    Column::new(PERSONNEL),
    Column::with_unit("avg_rating", "stars"),
    Column::new("ratings"),
  ]);
  for (rank, standing) in ranked.iter().enumerate() {
    table.push_row(vec![
      (rank + 1).into(),
      standing.id.as_str().into(),
      ctx.round(standing.avg_rating.unwrap_or_default()).into(),
      standing.rated.into(),
    ]);
  }

  let best = &ranked[0];
  let summary = format!(
    "Highest rated delivery person{}: {} with an average rating of {}",
    ctx.scope(),
    best.id,
    ctx.figure(best.avg_rating.unwrap_or_default())
  );
  Ok(AnalysisResult::table(summary, table))
}
