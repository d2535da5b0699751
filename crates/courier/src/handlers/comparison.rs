//! Festival versus regular-day delivery times.

use super::HandlerContext;
use crate::error::AnalysisError;
use crate::result::{AnalysisResult, Column, Table};
use crate::stats;

pub fn festival_delay(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let (mut regular, mut festival) = (Vec::new(), Vec::new());
  for record in ctx.eligible()? {
    match record.festival {
      Some(true) => festival.push(record.duration_min),
      Some(false) => regular.push(record.duration_min),
      None => {}
    }
  }

  let comparison = stats::compare(&regular, &festival).ok_or_else(|| AnalysisError::insufficient_data("festival"))?;

  // the No row is the baseline for delta_min and change_pct
  let mut table = Table::new(vec![
    Column::new("festival"),
    Column::with_unit("avg_time_min", "min"),
    Column::new("deliveries"),
    Column::with_unit("delta_min", "min"),
    Column::with_unit("change_pct", "%"),
  ]);
  table.push_row(vec![
    "No".into(),
    ctx.round(comparison.baseline_mean).into(),
    comparison.baseline_count.into(),
    0.0_f64.into(),
    comparison.change_pct.map(|_| 0.0).into(),
  ]);
  table.push_row(vec![
    "Yes".into(),
    ctx.round(comparison.condition_mean).into(),
    comparison.condition_count.into(),
    ctx.round(comparison.delta).into(),
    comparison.change_pct.map(|pct| ctx.round(pct)).into(),
  ]);

  let direction = if comparison.delta >= 0.0 { "longer" } else { "shorter" };
  let change = match comparison.change_pct {
    Some(pct) => format!(" ({}%)", ctx.figure(pct.abs())),
    None => String::new(),
  };
  let summary = format!(
    "Festival deliveries{} take {} min {direction}{change} than regular days ({} vs {} min)",
    ctx.scope(),
    ctx.figure(comparison.delta.abs()),
    ctx.figure(comparison.condition_mean),
    ctx.figure(comparison.baseline_mean)
  );
  Ok(AnalysisResult::table(summary, table))
}
