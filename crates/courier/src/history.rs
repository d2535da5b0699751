//! Single-slot record of the most recent question and its answer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::result::Answer;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
  pub query: String,
  pub answer: Answer,
  pub recorded_at: DateTime<Utc>,
}

/// Thread-safe history holding at most one entry.
///
/// Clones share the same slot, so an engine and its host can both hold a handle.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
  slot: Arc<Mutex<Option<HistoryEntry>>>,
}

impl SessionHistory {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, Option<HistoryEntry>> {
    // The slot is replaced wholesale, so a poisoned value is still consistent
    self.slot.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Overwrite the slot with `answer` for `query`.
  pub fn record(&self, query: &str, answer: Answer) {
    let entry = HistoryEntry { query: query.to_string(), answer, recorded_at: Utc::now() };
    *self.lock() = Some(entry);
  }

  pub fn last(&self) -> Option<HistoryEntry> {
    self.lock().clone()
  }

  pub fn clear(&self) {
    self.lock().take();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::result::AnalysisResult;
  use std::thread;

  fn answer(query: &str) -> Answer {
    Answer { query: query.to_string(), intent: None, result: AnalysisResult::message(query), issue: None }
  }

  #[test]
  fn test_empty_history_has_no_entry() {
    assert!(SessionHistory::new().last().is_none());
  }

  #[test]
  fn test_record_overwrites_previous_entry() {
    let history = SessionHistory::new();
    history.record("first", answer("first"));
    history.record("second", answer("second"));

    let last = history.last().unwrap();
    assert_eq!(last.query, "second");
    assert_eq!(last.answer.summary(), "second");

    history.clear();
    assert!(history.last().is_none());
  }

  #[test]
  fn test_clones_share_the_slot() {
    let history = SessionHistory::new();
    let handle = history.clone();
    handle.record("shared", answer("shared"));
    assert_eq!(history.last().unwrap().query, "shared");
  }

  #[test]
  fn test_concurrent_writers_leave_one_whole_entry() {
    let history = SessionHistory::new();
    let workers: Vec<_> = (0..8)
      .map(|i| {
        let history = history.clone();
        thread::spawn(move || {
          let query = format!("question {i}");
          history.record(&query, answer(&query));
        })
      })
      .collect();
    for worker in workers {
      worker.join().unwrap();
    }

    let last = history.last().unwrap();
    assert_eq!(last.query, last.answer.query);
  }
}
