//! Pearson correlation between a numeric attribute and delivery time.

use super::HandlerContext;
use crate::error::AnalysisError;
use crate::result::AnalysisResult;
use crate::stats;

/// Correlation scalar for `pairs`, or `InsufficientData(dimension)` when r is undefined.
pub(super) fn correlation_result(
  ctx: &HandlerContext<'_>,
  pairs: &[(f64, f64)],
  dimension: &str,
  label: &str,
) -> Result<AnalysisResult, AnalysisError> {
  let correlation = stats::pearson(pairs).ok_or_else(|| AnalysisError::insufficient_data(dimension))?;

  let summary = format!(
    "Correlation between {label}{}: r = {} ({} correlation, n = {})",
    ctx.scope(),
    ctx.figure(correlation.r),
    correlation.strength.label(),
    correlation.n
  );
  Ok(AnalysisResult::correlation(summary, ctx.round(correlation.r), correlation.n, correlation.strength, label))
}

pub fn age_speed_correlation(ctx: &HandlerContext<'_>) -> Result<AnalysisResult, AnalysisError> {
  let pairs: Vec<(f64, f64)> =
    ctx.eligible()?.into_iter().filter_map(|r| Some((f64::from(r.age?), r.duration_min))).collect();

  correlation_result(ctx, &pairs, "age", "age and delivery time")
}
