//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Listing stored tests as home-page cards
//!   - Fetching one stored test in wire shape
//!   - Exporting a stored test as clipboard text

use tracing::{info, instrument};

use crate::domain::TestRecord;
use crate::error::ApiError;
use crate::export::{Exporter, KeepOrder, RandomShuffler, Shuffler};
use crate::protocol::TestSummary;
use crate::remote::QuizRemote;

/// Random order for real exports, identity when shuffling is switched off.
pub fn shuffler(shuffle: bool) -> Box<dyn Shuffler + Send> {
  if shuffle {
    Box::new(RandomShuffler::new())
  } else {
    Box::new(KeepOrder)
  }
}

#[instrument(level = "info", skip(remote))]
pub async fn list_summaries(remote: &dyn QuizRemote) -> Result<Vec<TestSummary>, ApiError> {
  let tests = remote.list_tests().await?;
  info!(target: "quizdraft", count = tests.len(), "Tests listed");
  Ok(tests.iter().map(TestSummary::from).collect())
}

#[instrument(level = "info", skip(remote))]
pub async fn fetch_test(remote: &dyn QuizRemote, test_id: &str) -> Result<TestRecord, ApiError> {
  let test = remote.get_test(test_id).await?;
  Ok(TestRecord::from(&test))
}

#[instrument(level = "info", skip(remote, exporter))]
pub async fn export_text(
  remote: &dyn QuizRemote,
  exporter: &Exporter,
  shuffle: bool,
  test_id: &str,
) -> Result<String, ApiError> {
  let test = remote.get_test(test_id).await?;
  let text = exporter.export_test(&test, shuffler(shuffle).as_mut());
  info!(target: "quizdraft", %test_id, questions = test.questions.len(), text_len = text.len(), "Test exported");
  Ok(text)
}
