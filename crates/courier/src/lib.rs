//! Courier answers free-text questions about a delivery dataset.
//!
//! A question is classified into one of a closed set of intents, routed
//! through a static registry to an analytics handler, and returned as a
//! self-describing [`Answer`] (table, series or scalar plus a summary).
//!
//! ```no_run
//! use courier::{loader, AnalyticsConfig, DispatchEngine};
//!
//! let (dataset, _report) = loader::load_path("deliveries.csv")?;
//! let engine = DispatchEngine::new(dataset, AnalyticsConfig::default());
//! let answer = engine.answer("What is the average delivery time per city?")?;
//! println!("{}", answer.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classifier;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod history;
pub mod intent;
pub mod loader;
pub mod logging;
pub mod registry;
pub mod result;
pub mod stats;
pub mod text;

pub use classifier::{Classification, IntentClassifier};
pub use config::{AnalyticsConfig, Config};
pub use dataset::{Dataset, Record};
pub use engine::{DispatchEngine, FALLBACK_SUMMARY};
pub use error::{AnalysisError, ConfigError, DatasetError, ErrorKind};
pub use history::{HistoryEntry, SessionHistory};
pub use intent::{Intent, IntentTag, Parameters};
pub use registry::Registry;
pub use result::{AnalysisResult, Answer, Cell, ResultBody, Table};
