//! The single entry point for a question: classify, look up, run, record.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::classifier::{Classification, IntentClassifier};
use crate::config::AnalyticsConfig;
use crate::dataset::Dataset;
use crate::error::AnalysisError;
use crate::handlers::HandlerContext;
use crate::history::SessionHistory;
use crate::registry::Registry;
use crate::result::{AnalysisResult, Answer};

/// Summary of the answer given to questions outside the taxonomy.
pub const FALLBACK_SUMMARY: &str = "I don't understand this question";

#[derive(Debug)]
pub struct DispatchEngine {
  dataset: Arc<Dataset>,
  classifier: IntentClassifier,
  registry: Registry,
  config: AnalyticsConfig,
  history: SessionHistory,
}

impl DispatchEngine {
  /// Engine over `dataset` with every standard handler registered.
  pub fn new(dataset: impl Into<Arc<Dataset>>, config: AnalyticsConfig) -> Self {
    let dataset = dataset.into();
    let classifier = IntentClassifier::for_dataset(&dataset, config.max_top_k);
    Self { dataset, classifier, registry: Registry::standard(), config, history: SessionHistory::new() }
  }

  pub fn with_registry(mut self, registry: Registry) -> Self {
    self.registry = registry;
    self
  }

  pub fn history(&self) -> &SessionHistory {
    &self.history
  }

  pub fn classify(&self, query: &str) -> Classification {
    self.classifier.classify(query)
  }

  /// Answer `query`. Only a registry integrity failure is returned as an error;
  /// every other outcome, including misses and empty data, is an [`Answer`].
  pub fn dispatch(&self, query: &str) -> Result<Answer, AnalysisError> {
    let answer = match self.classifier.classify(query) {
      Classification::Unmatched => {
        info!(query, "no intent matched, returning fallback");
        Answer {
          query: query.to_string(),
          intent: None,
          result: AnalysisResult::message(FALLBACK_SUMMARY),
          issue: Some(AnalysisError::ClassificationMiss.kind()),
        }
      }
      Classification::Matched(intent) => {
        let handler = self.registry.lookup(intent.tag).inspect_err(|err| {
          error!(query, intent = %intent.tag, "{err}");
        })?;

        let ctx = HandlerContext::new(&self.dataset, &intent.params, &self.config);
        match handler(&ctx) {
          Ok(result) => {
            info!(query, intent = %intent.tag, "answered question");
            Answer { query: query.to_string(), intent: Some(intent), result, issue: None }
          }
          Err(err) if err.is_user_facing() => {
            warn!(query, intent = %intent.tag, "{err}");
            Answer {
              query: query.to_string(),
              issue: Some(err.kind()),
              result: AnalysisResult::message(err.to_string()),
              intent: Some(intent),
            }
          }
          Err(err) => {
            error!(query, intent = %intent.tag, "{err}");
            return Err(err);
          }
        }
      }
    };

    self.history.record(query, answer.clone());
    Ok(answer)
  }

  /// Boundary alias for [`DispatchEngine::dispatch`].
  pub fn answer(&self, query: &str) -> Result<Answer, AnalysisError> {
    self.dispatch(query)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dataset::Record;
  use crate::error::ErrorKind;
  use crate::intent::IntentTag;

  fn engine(records: Vec<Record>) -> DispatchEngine {
    DispatchEngine::new(Dataset::new(records), AnalyticsConfig::default())
  }

  fn city(name: &str, minutes: f64) -> Record {
    Record { city: Some(name.to_string()), personnel_id: Some("P1".into()), ..Record::with_duration(minutes) }
  }

  #[test]
  fn test_unmatched_question_returns_fallback() {
    let engine = engine(vec![city("A", 10.0)]);
    let answer = engine.dispatch("asdkjasd").unwrap();

    assert_eq!(answer.summary(), FALLBACK_SUMMARY);
    assert!(answer.result.as_table().unwrap().is_empty());
    assert_eq!(answer.intent, None);
    assert_eq!(answer.issue, Some(ErrorKind::ClassificationMiss));
  }

  #[test]
  fn test_fallback_never_touches_the_registry() {
    let engine = engine(vec![]).with_registry(Registry::empty());
    let answer = engine.dispatch("hello there").unwrap();
    assert_eq!(answer.summary(), FALLBACK_SUMMARY);
  }

  #[test]
  fn test_missing_handler_aborts_without_history() {
    let engine = engine(vec![city("A", 10.0)]).with_registry(Registry::empty());
    let err = engine.dispatch("How does traffic affect delivery time?").unwrap_err();

    assert_eq!(err, AnalysisError::registry_integrity("traffic_effect"));
    assert!(engine.history().last().is_none());
  }

  #[test]
  fn test_insufficient_data_becomes_an_answer() {
    let engine = engine(vec![city("A", 10.0)]);
    let answer = engine.dispatch("How does traffic affect delivery time?").unwrap();

    assert_eq!(answer.issue, Some(ErrorKind::InsufficientData));
    assert_eq!(answer.intent.as_ref().map(|i| i.tag), Some(IntentTag::TrafficEffect));
    assert!(answer.summary().contains("Insufficient data"));
    assert!(answer.result.as_table().unwrap().is_empty());
  }

  #[test]
  fn test_unknown_city_is_invalid_parameter_answer() {
    let engine = engine(vec![city("Urban", 10.0)]);
    let answer = engine.dispatch("Who is the fastest delivery person in Atlantis?").unwrap();

    assert_eq!(answer.issue, Some(ErrorKind::InvalidParameter));
    assert!(answer.summary().contains("Atlantis"));
  }

  #[test]
  fn test_every_answer_overwrites_history() {
    let engine = engine(vec![city("A", 10.0), city("A", 20.0), city("B", 30.0)]);

    engine.dispatch("What is the average delivery time per city?").unwrap();
    assert_eq!(engine.history().last().unwrap().answer.intent.unwrap().tag, IntentTag::AvgDurationByCity);

    engine.dispatch("asdkjasd").unwrap();
    let last = engine.history().last().unwrap();
    assert_eq!(last.query, "asdkjasd");
    assert_eq!(last.answer.summary(), FALLBACK_SUMMARY);
  }

  #[test]
  fn test_answer_is_dispatch() {
    let engine = engine(vec![city("A", 10.0), city("B", 30.0)]);
    let question = "What is the average delivery time per city?";
    assert_eq!(engine.answer(question).unwrap().result, engine.dispatch(question).unwrap().result);
  }

  #[test]
  fn test_engine_is_shareable_across_threads() {
    let engine = Arc::new(engine(vec![city("A", 10.0), city("B", 30.0)]));
    let workers: Vec<_> = (0..4)
      .map(|_| {
        let engine = Arc::clone(&engine);
        std::thread::spawn(move || engine.dispatch("What is the average delivery time per city?").unwrap())
      })
      .collect();

    for worker in workers {
      let answer = worker.join().unwrap();
      assert_eq!(answer.result.as_table().unwrap().rows.len(), 2);
    }
    assert!(engine.history().last().is_some());
  }
}
