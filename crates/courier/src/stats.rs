//! Numeric aggregation helpers: mean, median, grouping, Pearson correlation.
//!
//! Every function that could divide by zero returns `Option` instead, so callers
//! never see NaN.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub fn mean(values: &[f64]) -> Option<f64> {
  if values.is_empty() {
    return None;
  }
  Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
  if values.is_empty() {
    return None;
  }

  let mut sorted = values.to_vec();
  sorted.sort_by(f64::total_cmp);

  let mid = sorted.len() / 2;
  if sorted.len() % 2 == 0 {
    Some((sorted[mid - 1] + sorted[mid]) / 2.0)
  } else {
    Some(sorted[mid])
  }
}

/// Round half away from zero to `places` decimals.
///
/// Precisions beyond what `f64` can scale to return `value` unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
  let factor = 10f64.powi(places.min(i32::MAX as u32) as i32);
  let scaled = value * factor;
  if !factor.is_finite() || !scaled.is_finite() {
    return value;
  }
  scaled.round() / factor
}

/// Duration statistics for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats<K> {
  pub key: K,
  pub mean: f64,
  pub median: f64,
  pub count: usize,
}

/// Group `(key, value)` pairs and compute per-group statistics, ordered by key.
pub fn group_stats<K, I>(pairs: I) -> Vec<GroupStats<K>>
where
  K: Ord,
  I: IntoIterator<Item = (K, f64)>,
{
  let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
  for (key, value) in pairs {
    groups.entry(key).or_default().push(value);
  }

  groups
    .into_iter()
    .filter_map(|(key, values)| {
      Some(GroupStats { mean: mean(&values)?, median: median(&values)?, count: values.len(), key })
    })
    .collect()
}

/// Qualitative strength of a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
  None,
  Weak,
  Moderate,
  Strong,
}

impl Strength {
  /// |r| < 0.1 none, < 0.3 weak, < 0.6 moderate, otherwise strong.
  pub fn of(r: f64) -> Self {
    let magnitude = r.abs();
    if magnitude < 0.1 {
      Strength::None
    } else if magnitude < 0.3 {
      Strength::Weak
    } else if magnitude < 0.6 {
      Strength::Moderate
    } else {
      Strength::Strong
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Strength::None => "none",
      Strength::Weak => "weak",
      Strength::Moderate => "moderate",
      Strength::Strong => "strong",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
  pub r: f64,
  pub n: usize,
  pub strength: Strength,
}

/// Pearson correlation over paired samples.
///
/// `None` with fewer than two pairs or when either side has zero variance.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<Correlation> {
  let n = pairs.len();
  if n < 2 {
    return None;
  }

  let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
  let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

  let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
  for (x, y) in pairs {
    let dx = x - mean_x;
    let dy = y - mean_y;
    cov += dx * dy;
    var_x += dx * dx;
    var_y += dy * dy;
  }

  if var_x <= 0.0 || var_y <= 0.0 {
    return None;
  }

  let r = (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0);
  if !r.is_finite() {
    return None;
  }

  Some(Correlation { r, n, strength: Strength::of(r) })
}

/// Mean durations of two partitions and how the condition differs from the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
  pub baseline_mean: f64,
  pub baseline_count: usize,
  pub condition_mean: f64,
  pub condition_count: usize,
  pub delta: f64,
  /// `None` when the baseline mean is zero.
  pub change_pct: Option<f64>,
}

pub fn compare(baseline: &[f64], condition: &[f64]) -> Option<Comparison> {
  let baseline_mean = mean(baseline)?;
  let condition_mean = mean(condition)?;
  let delta = condition_mean - baseline_mean;
  let change_pct = (baseline_mean != 0.0).then(|| delta / baseline_mean * 100.0);

  Some(Comparison {
    baseline_mean,
    baseline_count: baseline.len(),
    condition_mean,
    condition_count: condition.len(),
    delta,
    change_pct,
  })
}
