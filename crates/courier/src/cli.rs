//! Command implementations and terminal rendering for the `courier` binary.

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use crate::classifier::Classification;
use crate::config::Config;
use crate::engine::DispatchEngine;
use crate::loader;
use crate::result::{Answer, ResultBody, Scalar, Series, Table};

/// Sample questions, one per supported analysis.
pub const EXAMPLE_QUESTIONS: &[&str] = &[
  "Which delivery person is the fastest on average?",
  "What is the average delivery time per city?",
  "How do multiple deliveries affect delivery time?",
  "Which vehicle type is most efficient for deliveries?",
  "What types of orders take the longest to deliver?",
  "Does order time affect delivery speed?",
  "Are deliveries slower during festivals?",
  "How does traffic density impact delivery time?",
  "How does weather affect delivery time?",
  "How do restaurant vs. delivery locations affect time?",
  "Which delivery person has the highest rating?",
  "Which top rated delivery person is also the fastest?",
  "Does the age of the delivery person affect speed?",
  "Does vehicle condition affect delivery time?",
  "Which areas have the highest delays?",
  "What is the correlation between distance and time?",
];

const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
  Pretty,
  Json,
}

/// Load configuration from an explicit file or the default search paths.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
  match path {
    Some(path) => {
      Config::load_from_file(path).with_context(|| format!("Failed to load config {}", path.display()))
    }
    None => Config::load().context("Failed to load configuration"),
  }
}

/// Build an engine over the dataset the flags, environment and config point at.
pub fn build_engine(config: &Config, data: Option<&Path>) -> Result<DispatchEngine> {
  let path = config.resolve_dataset_path(data);
  let (dataset, report) =
    loader::load_path(&path).with_context(|| format!("Failed to load dataset {}", path.display()))?;

  if report.rows_skipped > 0 {
    eprintln!(
      "{} skipped {} of {} rows without a usable delivery time",
      "warning:".yellow().bold(),
      report.rows_skipped,
      report.rows_read
    );
  }

  Ok(DispatchEngine::new(dataset, config.analytics.clone()))
}

pub fn ask(engine: &DispatchEngine, question: &str, format: OutputFormat) -> Result<()> {
  let answer = engine.answer(question)?;

  match format {
    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&answer)?),
    OutputFormat::Pretty => print!("{}", render_answer(&answer)),
  }
  Ok(())
}

pub fn classify(engine: &DispatchEngine, question: &str, format: OutputFormat) -> Result<()> {
  let classification = engine.classify(question);

  if format == OutputFormat::Json {
    println!("{}", serde_json::to_string_pretty(&classification.intent())?);
    return Ok(());
  }

  match classification {
    Classification::Matched(intent) => {
      println!("{} {}", "intent:".bold(), intent.tag.as_str().cyan().bold());
      for (name, value) in intent.params.pairs() {
        println!("  {} {}", format!("{name}:").dimmed(), value);
      }
    }
    Classification::Unmatched => println!("{}", "no matching intent".yellow()),
  }
  Ok(())
}

pub fn examples() {
  println!("{}", "Questions you can ask:".bold());
  for question in EXAMPLE_QUESTIONS {
    println!("  {} {question}", "•".cyan());
  }
}

/// Terminal rendering of an answer: summary line, then the body.
pub fn render_answer(answer: &Answer) -> String {
  let mut out = String::new();

  let summary = if answer.issue.is_some() { answer.summary().yellow().bold() } else { answer.summary().green().bold() };
  out.push_str(&format!("{summary}\n"));

  match &answer.result.body {
    ResultBody::Table(table) if !table.is_empty() => out.push_str(&render_table(table)),
    ResultBody::Table(_) => {}
    ResultBody::Series(series) => out.push_str(&render_series(series)),
    ResultBody::Scalar(scalar) => out.push_str(&render_scalar(scalar)),
  }

  if answer.intent.is_none() {
    out.push_str(&format!("{}\n", "Try one of these:".dimmed()));
    for question in EXAMPLE_QUESTIONS.iter().take(4) {
      out.push_str(&format!("  {} {question}\n", "•".dimmed()));
    }
  }

  out
}

fn header_label(name: &str, unit: Option<&str>) -> String {
  match unit {
    Some(unit) => format!("{name} ({unit})"),
    None => name.to_string(),
  }
}

fn render_table(table: &Table) -> String {
  let headers: Vec<String> = table.columns.iter().map(|c| header_label(&c.name, c.unit.as_deref())).collect();
  let cells: Vec<Vec<String>> = table.rows.iter().map(|row| row.iter().map(|cell| cell.to_string()).collect()).collect();

  let widths: Vec<usize> = headers
    .iter()
    .enumerate()
    .map(|(i, header)| cells.iter().filter_map(|row| row.get(i)).map(String::len).fold(header.len(), usize::max))
    .collect();

  let mut out = String::new();
  let header_line: Vec<String> =
    headers.iter().zip(&widths).map(|(header, &width)| format!("{header:<width$}")).collect();
  out.push_str(&format!("{}\n", header_line.join("  ").cyan().bold()));
  out.push_str(&format!("{}\n", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)).dimmed()));

  for (row, raw) in cells.iter().zip(&table.rows) {
    let line: Vec<String> = row
      .iter()
      .zip(raw)
      .zip(&widths)
      .map(|((text, cell), &width)| {
        if cell.as_f64().is_some() {
          format!("{text:>width$}")
        } else {
          format!("{text:<width$}")
        }
      })
      .collect();
    out.push_str(&format!("{}\n", line.join("  ")));
  }
  out
}

fn render_series(series: &Series) -> String {
  let label_width = series.points.iter().map(|p| p.category.len()).max().unwrap_or(0);
  let peak = series.points.iter().map(|p| p.value.abs()).fold(0.0_f64, f64::max);

  let mut out = String::new();
  for point in &series.points {
    let length = if peak > 0.0 { ((point.value.abs() / peak) * BAR_WIDTH as f64).round() as usize } else { 0 };
    out.push_str(&format!(
      "{:<label_width$}  {} {} {} {}\n",
      point.category,
      "█".repeat(length.max(1)).blue(),
      point.value,
      series.unit.dimmed(),
      format!("({} deliveries)", point.count).dimmed()
    ));
  }
  out
}

fn render_scalar(scalar: &Scalar) -> String {
  let detail = match (scalar.strength, scalar.sample_size) {
    (Some(strength), Some(n)) => format!(" ({}, n = {n})", strength.label()),
    (None, Some(n)) => format!(" (n = {n})"),
    _ => String::new(),
  };
  format!("{}: {} {}{}\n", scalar.label, scalar.value.to_string().bold(), scalar.unit.dimmed(), detail.dimmed())
}
