//! Test draft: the in-memory test being created or edited.
//!
//! In edit mode the draft also keeps what the remote store held when the test was
//! loaded (the snapshot): question ids and their stored answer ids. Reconciliation diffs
//! the live list against it.

use serde::Serialize;

use crate::domain::{Question, Test};

/// Non-empty checks run before saving.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", content = "questionId", rename_all = "snake_case")]
pub enum DraftIssue {
  EmptyTitle,
  NoQuestions,
  EmptyQuestionTitle(String),
}

/// One question as the remote store holds it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredQuestion {
  pub id: String,
  pub answer_ids: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct TestDraft {
  test_id: Option<String>,
  title: String,
  questions: Vec<Question>,
  snapshot: Vec<StoredQuestion>,
}

impl TestDraft {
  /// Blank draft for a test that does not exist yet.
  pub fn new() -> Self {
    Self::default()
  }

  /// Draft editing a persisted test.
  pub fn from_persisted(test: &Test) -> Self {
    let mut draft = Self::new();
    draft.load_from_persisted(test);
    draft
  }

  pub fn load_from_persisted(&mut self, test: &Test) {
    self.test_id = Some(test.id.clone());
    self.title = test.title.clone();
    self.questions = test.questions.clone();
    self.snapshot = test
      .questions
      .iter()
      .map(|q| StoredQuestion { id: q.id.clone(), answer_ids: test.stored_answer_ids(q) })
      .collect();
  }

  pub fn set_title(&mut self, title: &str) {
    self.title = title.to_string();
  }

  /// Replace the question with the same id in place, or append it.
  pub fn upsert_question(&mut self, question: Question) {
    match self.questions.iter_mut().find(|q| q.id == question.id) {
      Some(slot) => *slot = question,
      None => self.questions.push(question),
    }
  }

  /// Drop a question from the live list. The snapshot is left alone.
  pub fn remove_question(&mut self, id: &str) -> bool {
    let before = self.questions.len();
    self.questions.retain(|q| q.id != id);
    self.questions.len() != before
  }

  pub fn question(&self, id: &str) -> Option<&Question> {
    self.questions.iter().find(|q| q.id == id)
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn questions(&self) -> &[Question] {
    &self.questions
  }

  pub fn snapshot(&self) -> &[StoredQuestion] {
    &self.snapshot
  }

  pub fn test_id(&self) -> Option<&str> {
    self.test_id.as_deref()
  }

  pub fn is_edit(&self) -> bool {
    self.test_id.is_some()
  }

  pub fn validate(&self) -> Vec<DraftIssue> {
    let mut issues = Vec::new();
    if self.title.trim().is_empty() {
      issues.push(DraftIssue::EmptyTitle);
    }
    if self.questions.is_empty() {
      issues.push(DraftIssue::NoQuestions);
    }
    for q in &self.questions {
      if q.title.trim().is_empty() {
        issues.push(DraftIssue::EmptyQuestionTitle(q.id.clone()));
      }
    }
    issues
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Answers, TextAnswer};
  use chrono::Utc;

  fn text_q(id: &str, title: &str) -> Question {
    Question {
      id: id.into(),
      title: title.into(),
      answers: Answers::Text(TextAnswer { id: format!("{id}-a"), text: "x".into() }),
    }
  }

  fn persisted() -> Test {
    Test {
      id: "t1".into(),
      title: "History".into(),
      created: Utc::now(),
      updated: Utc::now(),
      questions: vec![text_q("A", "one"), text_q("B", "two")],
      stored_answers: Default::default(),
    }
  }

  #[test]
  fn load_sets_title_questions_and_snapshot() {
    let draft = TestDraft::from_persisted(&persisted());
    assert!(draft.is_edit());
    assert_eq!(draft.test_id(), Some("t1"));
    assert_eq!(draft.title(), "History");
    let ids: Vec<_> = draft.snapshot().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B"]);
    assert_eq!(draft.snapshot()[0].answer_ids, vec!["A-a".to_string()]);
  }

  #[test]
  fn invented_text_answer_is_not_in_the_snapshot() {
    let record: crate::domain::TestRecord = serde_json::from_value(serde_json::json!({
      "id": "t1", "title": "Half saved",
      "created": "2024-03-01T10:00:00Z", "updated": "2024-03-01T10:00:00Z",
      "questions": [{"id": "Q", "title": "Answer me", "type": "text", "answers": []}]
    }))
    .unwrap();
    let draft = TestDraft::from_persisted(&Test::from(record));
    assert_eq!(draft.questions()[0].answers.len(), 1);
    assert_eq!(draft.snapshot(), &[StoredQuestion { id: "Q".into(), answer_ids: vec![] }]);
  }

  #[test]
  fn remove_keeps_snapshot() {
    let mut draft = TestDraft::from_persisted(&persisted());
    assert!(draft.remove_question("B"));
    assert!(!draft.remove_question("B"));
    assert_eq!(draft.questions().len(), 1);
    assert_eq!(draft.snapshot().len(), 2);
  }

  #[test]
  fn upsert_replaces_in_place_or_appends() {
    let mut draft = TestDraft::from_persisted(&persisted());
    draft.upsert_question(text_q("A", "renamed"));
    draft.upsert_question(text_q("C", "three"));
    let titles: Vec<_> = draft.questions().iter().map(|q| q.title.as_str()).collect();
    assert_eq!(titles, vec!["renamed", "two", "three"]);
  }

  #[test]
  fn validate_reports_empty_parts() {
    let mut draft = TestDraft::new();
    assert_eq!(draft.validate(), vec![DraftIssue::EmptyTitle, DraftIssue::NoQuestions]);
    draft.set_title("Quiz");
    draft.upsert_question(text_q("A", "  "));
    assert_eq!(draft.validate(), vec![DraftIssue::EmptyQuestionTitle("A".into())]);
  }
}
