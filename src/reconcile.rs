//! Reconciliation of a test draft with the remote store.
//!
//! `plan` is a pure set-diff keyed by id: a question (or answer) is persisted when its id
//! is present in the draft's snapshot, which holds the ids the remote store returned. `execute` issues the planned calls. Sibling calls
//! are in flight together; a child is only issued once its parent exists remotely.
//! Nothing is rolled back: every call ends up in the `SyncReport`.

use std::collections::HashSet;

use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::config::DeletionPolicy;
use crate::domain::{Answer, Question, QuestionKind};
use crate::draft::{StoredQuestion, TestDraft};
use crate::error::ApiError;
use crate::remote::{AnswerBody, QuestionBody, QuizRemote};

/// Create a new remote entity, or update the one with this id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
  Create,
  Update(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerPlan {
  pub action: Action,
  pub answer: Answer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionPlan {
  pub action: Action,
  /// Draft-side id; equals the remote id for updates.
  pub local_id: String,
  pub title: String,
  pub kind: QuestionKind,
  pub answers: Vec<AnswerPlan>,
  /// Persisted answers that are gone from the question.
  pub deleted_answers: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncPlan {
  pub title: String,
  /// `Create` for a new test, `Update(test_id)` for an edited one. Always issued.
  pub test: Action,
  pub deleted_questions: Vec<String>,
  pub questions: Vec<QuestionPlan>,
}

impl SyncPlan {
  /// Number of remote calls the plan issues when nothing fails.
  pub fn call_count(&self) -> usize {
    1 + self.deleted_questions.len()
      + self
        .questions
        .iter()
        .map(|q| 1 + q.answers.len() + q.deleted_answers.len())
        .sum::<usize>()
  }
}

/// Compute the calls needed to bring the remote store in line with `draft`.
pub fn plan(draft: &TestDraft, policy: DeletionPolicy) -> SyncPlan {
  let snapshot = draft.snapshot();
  let current = draft.questions();

  let test = match draft.test_id() {
    Some(id) => Action::Update(id.to_string()),
    None => Action::Create,
  };

  let look_for_deletions = match policy {
    DeletionPolicy::SetDifference => true,
    DeletionPolicy::LengthGated => !snapshot.is_empty() && snapshot.len() > current.len(),
  };
  let current_ids: HashSet<&str> = current.iter().map(|q| q.id.as_str()).collect();
  let deleted_questions = if look_for_deletions {
    snapshot
      .iter()
      .filter(|q| !current_ids.contains(q.id.as_str()))
      .map(|q| q.id.clone())
      .collect()
  } else {
    Vec::new()
  };

  let questions = current
    .iter()
    .map(|q| plan_question(q, snapshot.iter().find(|s| s.id == q.id)))
    .collect();

  SyncPlan { title: draft.title().to_string(), test, deleted_questions, questions }
}

fn plan_question(question: &Question, persisted: Option<&StoredQuestion>) -> QuestionPlan {
  let answers = question.answers.to_wire();
  let Some(persisted) = persisted else {
    return QuestionPlan {
      action: Action::Create,
      local_id: question.id.clone(),
      title: question.title.clone(),
      kind: question.kind(),
      answers: answers.into_iter().map(|answer| AnswerPlan { action: Action::Create, answer }).collect(),
      deleted_answers: Vec::new(),
    };
  };

  let known: HashSet<&str> = persisted.answer_ids.iter().map(String::as_str).collect();
  let live: HashSet<&str> = answers.iter().map(|a| a.id.as_str()).collect();
  let deleted_answers = persisted
    .answer_ids
    .iter()
    .filter(|id| !live.contains(id.as_str()))
    .cloned()
    .collect();
  let answers = answers
    .into_iter()
    .map(|answer| {
      let action = if known.contains(answer.id.as_str()) { Action::Update(answer.id.clone()) } else { Action::Create };
      AnswerPlan { action, answer }
    })
    .collect();

  QuestionPlan {
    action: Action::Update(question.id.clone()),
    local_id: question.id.clone(),
    title: question.title.clone(),
    kind: question.kind(),
    answers,
    deleted_answers,
  }
}

/// One remote call issued by a sync.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SyncOp {
  CreateTest,
  UpdateTest { test_id: String },
  DeleteQuestion { question_id: String },
  CreateQuestion { local_id: String },
  UpdateQuestion { question_id: String },
  DeleteAnswer { answer_id: String },
  CreateAnswer { local_id: String },
  UpdateAnswer { answer_id: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum OpStatus {
  Done,
  Failed(String),
  /// Not issued because its parent failed.
  Skipped(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OpOutcome {
  pub op: SyncOp,
  pub status: OpStatus,
}

impl OpOutcome {
  fn from_result<T>(op: SyncOp, result: &Result<T, ApiError>) -> Self {
    let status = match result {
      Ok(_) => OpStatus::Done,
      Err(e) => {
        error!(target: "sync", ?op, error = %e, "Remote call failed");
        OpStatus::Failed(e.to_string())
      }
    };
    Self { op, status }
  }

  fn skipped(op: SyncOp, reason: &str) -> Self {
    Self { op, status: OpStatus::Skipped(reason.to_string()) }
  }
}

/// Result of a sync: the remote test id (when known) and the fate of every call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
  pub test_id: Option<String>,
  pub outcomes: Vec<OpOutcome>,
}

impl SyncReport {
  pub fn is_success(&self) -> bool {
    self.outcomes.iter().all(|o| o.status == OpStatus::Done)
  }

  pub fn done_count(&self) -> usize {
    self.outcomes.iter().filter(|o| o.status == OpStatus::Done).count()
  }

  pub fn failures(&self) -> impl Iterator<Item = &OpOutcome> {
    self.outcomes.iter().filter(|o| matches!(o.status, OpStatus::Failed(_)))
  }

  pub fn skipped_count(&self) -> usize {
    self.outcomes.iter().filter(|o| matches!(o.status, OpStatus::Skipped(_))).count()
  }
}

/// Plan and execute in one go.
pub async fn sync(draft: &TestDraft, remote: &dyn QuizRemote, policy: DeletionPolicy) -> SyncReport {
  execute(&plan(draft, policy), remote).await
}

#[instrument(level = "info", skip_all, fields(questions = plan.questions.len(), deletions = plan.deleted_questions.len()))]
pub async fn execute(plan: &SyncPlan, remote: &dyn QuizRemote) -> SyncReport {
  let report = match &plan.test {
    Action::Create => {
      // The new test id parents every question, so this call goes first.
      let created = remote.create_test(&plan.title).await;
      let mut outcomes = vec![OpOutcome::from_result(SyncOp::CreateTest, &created)];
      match created {
        Ok(test_id) => {
          outcomes.extend(run_questions(plan, &test_id, remote).await);
          SyncReport { test_id: Some(test_id), outcomes }
        }
        Err(_) => {
          for q in &plan.questions {
            outcomes.push(OpOutcome::skipped(
              SyncOp::CreateQuestion { local_id: q.local_id.clone() },
              "test was not created",
            ));
          }
          SyncReport { test_id: None, outcomes }
        }
      }
    }
    Action::Update(test_id) => {
      let title = async {
        let result = remote.update_test(test_id, &plan.title).await;
        OpOutcome::from_result(SyncOp::UpdateTest { test_id: test_id.clone() }, &result)
      };
      let deletions = join_all(plan.deleted_questions.iter().map(|id| async move {
        let result = remote.delete_question(id).await;
        OpOutcome::from_result(SyncOp::DeleteQuestion { question_id: id.clone() }, &result)
      }));
      let (title, deletions, questions) = futures::join!(title, deletions, run_questions(plan, test_id, remote));

      let mut outcomes = vec![title];
      outcomes.extend(deletions);
      outcomes.extend(questions);
      SyncReport { test_id: Some(test_id.clone()), outcomes }
    }
  };

  if report.is_success() {
    info!(target: "sync", test_id = ?report.test_id, calls = report.outcomes.len(), "Test synced");
  } else {
    warn!(
      target: "sync",
      test_id = ?report.test_id,
      planned = plan.call_count(),
      done = report.done_count(),
      failed = report.failures().count(),
      skipped = report.skipped_count(),
      "Test synced partially"
    );
  }
  report
}

async fn run_questions(plan: &SyncPlan, test_id: &str, remote: &dyn QuizRemote) -> Vec<OpOutcome> {
  join_all(plan.questions.iter().map(|q| run_question(q, test_id, remote)))
    .await
    .into_iter()
    .flatten()
    .collect()
}

async fn run_question(plan: &QuestionPlan, test_id: &str, remote: &dyn QuizRemote) -> Vec<OpOutcome> {
  let body = QuestionBody { test_guid: test_id.to_string(), title: plan.title.clone(), kind: plan.kind };
  let (op, result) = match &plan.action {
    Action::Create => (
      SyncOp::CreateQuestion { local_id: plan.local_id.clone() },
      remote.create_question(&body).await,
    ),
    Action::Update(id) => (
      SyncOp::UpdateQuestion { question_id: id.clone() },
      remote.update_question(id, &body).await.map(|_| id.clone()),
    ),
  };
  let mut outcomes = vec![OpOutcome::from_result(op, &result)];

  let question_id = match result {
    Ok(id) => id,
    Err(_) => {
      for a in &plan.answers {
        outcomes.push(OpOutcome::skipped(answer_op(a), "question was not saved"));
      }
      for id in &plan.deleted_answers {
        outcomes.push(OpOutcome::skipped(SyncOp::DeleteAnswer { answer_id: id.clone() }, "question was not saved"));
      }
      return outcomes;
    }
  };

  let question_id = question_id.as_str();
  let writes = join_all(plan.answers.iter().map(|a| async move {
    let body = AnswerBody::new(question_id, &a.answer);
    let result = match &a.action {
      Action::Create => remote.create_answer(&body).await.map(|_| ()),
      Action::Update(id) => remote.update_answer(id, &body).await,
    };
    OpOutcome::from_result(answer_op(a), &result)
  }));
  let deletes = join_all(plan.deleted_answers.iter().map(|id| async move {
    let result = remote.delete_answer(id).await;
    OpOutcome::from_result(SyncOp::DeleteAnswer { answer_id: id.clone() }, &result)
  }));
  let (writes, deletes) = futures::join!(writes, deletes);
  outcomes.extend(writes);
  outcomes.extend(deletes);
  outcomes
}

fn answer_op(a: &AnswerPlan) -> SyncOp {
  match &a.action {
    Action::Create => SyncOp::CreateAnswer { local_id: a.answer.id.clone() },
    Action::Update(id) => SyncOp::UpdateAnswer { answer_id: id.clone() },
  }
}
