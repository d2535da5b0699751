use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use courier::cli::{self, OutputFormat};
use courier::config::DATASET_ENV;
use courier::logging;

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Courier - delivery data analyst\nAsk questions about a delivery dataset and get data-driven answers")]
#[command(version)]
struct Cli {
  /// Delivery dataset (CSV)
  #[arg(long, global = true, env = DATASET_ENV)]
  data: Option<PathBuf>,

  /// Configuration file (JSON)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Answer a question about the dataset
  Ask {
    /// The question (space-separated words are joined)
    #[arg(required = true)]
    question: Vec<String>,
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    format: OutputFormat,
  },
  /// Show which analysis a question maps to without running it
  Classify {
    /// The question (space-separated words are joined)
    #[arg(required = true)]
    question: Vec<String>,
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    format: OutputFormat,
  },
  /// List example questions
  Examples,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  logging::init(cli.verbose);

  match cli.command {
    Commands::Ask { question, format } => {
      let config = cli::load_config(cli.config.as_deref())?;
      let engine = cli::build_engine(&config, cli.data.as_deref())?;
      cli::ask(&engine, &question.join(" "), format)?;
    }
    Commands::Classify { question, format } => {
      let config = cli::load_config(cli.config.as_deref())?;
      let engine = cli::build_engine(&config, cli.data.as_deref())?;
      cli::classify(&engine, &question.join(" "), format)?;
    }
    Commands::Examples => cli::examples(),
  }

  Ok(())
}
