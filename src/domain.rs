//! Domain models: question kinds, typed answer variants, questions and persisted tests.
//!
//! The remote API speaks a flat `Answer` shape for every question kind. In memory we keep
//! answers as a tagged union (`Answers`) so that every consumer has to say what it does
//! with each kind.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Fresh locally generated id (UUID v4).
pub fn new_id() -> String {
  Uuid::new_v4().to_string()
}

/// What kind of question is asked?
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
  /// Free text; exactly one correct answer.
  #[default]
  Text,
  /// Pick one or more of the listed options.
  Choice,
  /// Pair each statement with its target.
  Match,
}

impl QuestionKind {
  pub fn as_str(self) -> &'static str {
    match self {
      QuestionKind::Text => "text",
      QuestionKind::Choice => "choice",
      QuestionKind::Match => "match",
    }
  }
}

/// Flat answer record as exchanged with the remote API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
  pub id: String,
  #[serde(default)]
  pub text: String,
  #[serde(default)]
  pub sub_text: Option<String>,
  #[serde(default)]
  pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnswer {
  pub id: String,
  pub text: String,
}

impl TextAnswer {
  pub fn blank() -> Self {
    Self { id: new_id(), text: String::new() }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceAnswer {
  pub id: String,
  pub text: String,
  pub is_correct: bool,
}

/// One row of a matching question: `statement` (left) goes with `target` (right).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
  pub id: String,
  pub statement: String,
  pub target: String,
}

/// Answer variants of one question, keyed by question kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "variants", rename_all = "snake_case")]
pub enum Answers {
  Text(TextAnswer),
  Choice(Vec<ChoiceAnswer>),
  Match(Vec<MatchPair>),
}

impl Answers {
  pub fn kind(&self) -> QuestionKind {
    match self {
      Answers::Text(_) => QuestionKind::Text,
      Answers::Choice(_) => QuestionKind::Choice,
      Answers::Match(_) => QuestionKind::Match,
    }
  }

  /// Ids of every variant, in order.
  pub fn ids(&self) -> Vec<&str> {
    match self {
      Answers::Text(a) => vec![a.id.as_str()],
      Answers::Choice(items) => items.iter().map(|a| a.id.as_str()).collect(),
      Answers::Match(items) => items.iter().map(|a| a.id.as_str()).collect(),
    }
  }

  pub fn len(&self) -> usize {
    match self {
      Answers::Text(_) => 1,
      Answers::Choice(items) => items.len(),
      Answers::Match(items) => items.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Build the typed variants from flat wire answers.
  ///
  /// A text question keeps only its first answer; a missing one is replaced by a fresh
  /// blank answer so the "exactly one" shape always holds.
  pub fn from_wire(kind: QuestionKind, answers: Vec<Answer>) -> Self {
    match kind {
      QuestionKind::Text => {
        if answers.len() > 1 {
          warn!(target: "quizdraft", count = answers.len(), "Text question carries several answers; keeping the first");
        }
        let answer = answers
          .into_iter()
          .next()
          .map(|a| TextAnswer { id: a.id, text: a.text })
          .unwrap_or_else(TextAnswer::blank);
        Answers::Text(answer)
      }
      QuestionKind::Choice => Answers::Choice(
        answers
          .into_iter()
          .map(|a| ChoiceAnswer { id: a.id, text: a.text, is_correct: a.is_correct })
          .collect(),
      ),
      QuestionKind::Match => Answers::Match(
        answers
          .into_iter()
          .map(|a| MatchPair { id: a.id, statement: a.text, target: a.sub_text.unwrap_or_default() })
          .collect(),
      ),
    }
  }

  /// Flatten into wire answers.
  pub fn to_wire(&self) -> Vec<Answer> {
    match self {
      Answers::Text(a) => vec![Answer {
        id: a.id.clone(),
        text: a.text.clone(),
        sub_text: None,
        is_correct: true,
      }],
      Answers::Choice(items) => items
        .iter()
        .map(|a| Answer { id: a.id.clone(), text: a.text.clone(), sub_text: None, is_correct: a.is_correct })
        .collect(),
      Answers::Match(items) => items
        .iter()
        .map(|a| Answer {
          id: a.id.clone(),
          text: a.statement.clone(),
          sub_text: Some(a.target.clone()),
          is_correct: true,
        })
        .collect(),
    }
  }
}

/// A question owned by a draft or by a persisted test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
  pub id: String,
  pub title: String,
  pub answers: Answers,
}

impl Question {
  pub fn kind(&self) -> QuestionKind {
    self.answers.kind()
  }
}

/// Question shape on the wire: `{id, title, type, answers: [...]}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuestionRecord {
  pub id: String,
  pub title: String,
  #[serde(rename = "type")]
  pub kind: QuestionKind,
  #[serde(default)]
  pub answers: Vec<Answer>,
}

impl From<QuestionRecord> for Question {
  fn from(r: QuestionRecord) -> Self {
    Question { id: r.id, title: r.title, answers: Answers::from_wire(r.kind, r.answers) }
  }
}

impl From<&Question> for QuestionRecord {
  fn from(q: &Question) -> Self {
    QuestionRecord { id: q.id.clone(), title: q.title.clone(), kind: q.kind(), answers: q.answers.to_wire() }
  }
}

/// A test as stored by the remote API. Read-only on this side.
#[derive(Clone, Debug)]
pub struct Test {
  pub id: String,
  pub title: String,
  pub created: DateTime<Utc>,
  pub updated: DateTime<Utc>,
  pub questions: Vec<Question>,
  /// Answer ids per question id exactly as the remote store returned them. The typed
  /// `Answers` may differ: a text question drops extra answers and invents a blank one
  /// when none is stored.
  pub stored_answers: HashMap<String, Vec<String>>,
}

impl Test {
  /// Answer ids the remote store holds for `question`. Tests built in memory have no
  /// wire record, so their typed answers count as stored.
  pub fn stored_answer_ids(&self, question: &Question) -> Vec<String> {
    match self.stored_answers.get(&question.id) {
      Some(ids) => ids.clone(),
      None => question.answers.ids().into_iter().map(str::to_string).collect(),
    }
  }
}

/// Test shape on the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestRecord {
  pub id: String,
  pub title: String,
  pub created: DateTime<Utc>,
  pub updated: DateTime<Utc>,
  #[serde(default)]
  pub questions: Vec<QuestionRecord>,
}

impl From<TestRecord> for Test {
  fn from(r: TestRecord) -> Self {
    let stored_answers = r
      .questions
      .iter()
      .map(|q| (q.id.clone(), q.answers.iter().map(|a| a.id.clone()).collect()))
      .collect();
    Test {
      id: r.id,
      title: r.title,
      created: r.created,
      updated: r.updated,
      questions: r.questions.into_iter().map(Question::from).collect(),
      stored_answers,
    }
  }
}

impl From<&Test> for TestRecord {
  fn from(t: &Test) -> Self {
    TestRecord {
      id: t.id.clone(),
      title: t.title.clone(),
      created: t.created,
      updated: t.updated,
      questions: t.questions.iter().map(QuestionRecord::from).collect(),
    }
  }
}
