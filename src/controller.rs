//! Presentation controller: all state of one open editor frontend.
//!
//! One controller per WebSocket connection. It owns the view flags (current page,
//! question drawer, info modal), the test draft and the question editor, and turns
//! client messages into state changes and remote calls. Nothing here is shared, so no
//! locking is involved.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::DeletionPolicy;
use crate::draft::TestDraft;
use crate::editor::QuestionEditor;
use crate::export::Exporter;
use crate::logic;
use crate::protocol::{ClientWsMessage, DraftOut, EditorOut, ServerWsMessage, TestSummary, ViewOut};
use crate::reconcile;
use crate::remote::QuizRemote;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "name", content = "testId", rename_all = "snake_case")]
pub enum Page {
  #[default]
  Home,
  Create,
  Edit(String),
  View(String),
}

#[derive(Clone, Debug, Default)]
pub struct ViewState {
  pub page: Page,
  pub signed_in: bool,
  pub info_modal_open: bool,
}

pub struct Controller {
  remote: Arc<dyn QuizRemote>,
  exporter: Exporter,
  shuffle: bool,
  policy: DeletionPolicy,
  view: ViewState,
  draft: Option<TestDraft>,
  editor: QuestionEditor,
  tests: Vec<TestSummary>,
}

impl Controller {
  pub fn new(remote: Arc<dyn QuizRemote>, exporter: Exporter, shuffle: bool, policy: DeletionPolicy) -> Self {
    Self {
      remote,
      exporter,
      shuffle,
      policy,
      view: ViewState::default(),
      draft: None,
      editor: QuestionEditor::new(),
      tests: Vec::new(),
    }
  }

  pub fn view(&self) -> ViewOut {
    ViewOut {
      page: self.view.page.clone(),
      signed_in: self.view.signed_in,
      drawer_open: self.editor.is_open(),
      info_modal_open: self.view.info_modal_open,
      draft: self.draft.as_ref().map(DraftOut::from),
      editor: self.editor.is_open().then(|| EditorOut::from(&self.editor)),
    }
  }

  fn render(&self) -> ServerWsMessage {
    ServerWsMessage::View { view: self.view() }
  }

  fn error(message: impl Into<String>) -> ServerWsMessage {
    ServerWsMessage::Error { message: message.into() }
  }

  /// Drop the draft and the drawer and go back to the test list.
  fn go_home(&mut self) {
    self.draft = None;
    self.editor.close();
    self.view.page = Page::Home;
  }

  #[instrument(level = "info", skip(self, msg), fields(kind = msg.kind()))]
  pub async fn handle(&mut self, msg: ClientWsMessage) -> ServerWsMessage {
    match msg {
      ClientWsMessage::Ping => ServerWsMessage::Pong,

      ClientWsMessage::SignIn { credential } => match self.remote.sign_in(&credential).await {
        Ok(access_token) => {
          self.view.signed_in = true;
          info!(target: "editor", "Signed in");
          ServerWsMessage::SignedIn { access_token }
        }
        Err(e) => Self::error(format!("Sign-in failed: {e}")),
      },
      ClientWsMessage::Authenticate { access_token } => {
        self.remote.set_access_token(Some(access_token));
        self.view.signed_in = true;
        self.render()
      }
      ClientWsMessage::SignOut => {
        self.remote.set_access_token(None);
        self.go_home();
        self.tests.clear();
        self.view = ViewState::default();
        self.render()
      }

      ClientWsMessage::ListTests => match logic::list_summaries(self.remote.as_ref()).await {
        Ok(tests) => {
          self.go_home();
          self.tests = tests;
          ServerWsMessage::Tests { tests: self.tests.clone() }
        }
        Err(e) => Self::error(format!("Could not load tests: {e}")),
      },
      ClientWsMessage::OpenTest { test_id } => match logic::fetch_test(self.remote.as_ref(), &test_id).await {
        Ok(test) => {
          self.view.page = Page::View(test_id);
          ServerWsMessage::Test { test }
        }
        Err(e) => Self::error(format!("Could not load test {test_id}: {e}")),
      },
      ClientWsMessage::DeleteTest { test_id } => match self.remote.delete_test(&test_id).await {
        Ok(()) => {
          info!(target: "editor", %test_id, "Test deleted");
          self.tests.retain(|t| t.id != test_id);
          ServerWsMessage::Tests { tests: self.tests.clone() }
        }
        Err(e) => Self::error(format!("Could not delete test {test_id}: {e}")),
      },
      ClientWsMessage::ExportTest { test_id } => {
        match logic::export_text(self.remote.as_ref(), &self.exporter, self.shuffle, &test_id).await {
          Ok(text) => ServerWsMessage::Export { text },
          Err(e) => Self::error(format!("Could not export test {test_id}: {e}")),
        }
      }

      ClientWsMessage::StartCreate => {
        self.editor.close();
        self.draft = Some(TestDraft::new());
        self.view.page = Page::Create;
        self.render()
      }
      ClientWsMessage::StartEdit { test_id } => match self.remote.get_test(&test_id).await {
        Ok(test) => {
          self.editor.close();
          self.draft = Some(TestDraft::from_persisted(&test));
          self.view.page = Page::Edit(test_id);
          self.render()
        }
        Err(e) => Self::error(format!("Could not load test {test_id}: {e}")),
      },
      ClientWsMessage::Leave => {
        self.go_home();
        self.render()
      }
      ClientWsMessage::ShowInfo => {
        self.view.info_modal_open = true;
        self.render()
      }
      ClientWsMessage::HideInfo => {
        self.view.info_modal_open = false;
        self.render()
      }

      ClientWsMessage::ExportDraft => match self.draft.as_ref() {
        Some(draft) => {
          let text = self.exporter.export_draft(draft, logic::shuffler(self.shuffle).as_mut());
          ServerWsMessage::Export { text }
        }
        None => Self::error("No test is being edited"),
      },
      ClientWsMessage::SaveTest => self.save_test().await,

      other => self.edit(other),
    }
  }

  /// Messages that only touch the draft or the question drawer.
  fn edit(&mut self, msg: ClientWsMessage) -> ServerWsMessage {
    let Some(draft) = self.draft.as_mut() else {
      return Self::error("No test is being edited");
    };

    match msg {
      ClientWsMessage::SetTitle { title } => draft.set_title(&title),
      ClientWsMessage::RemoveQuestion { question_id } => {
        draft.remove_question(&question_id);
      }
      ClientWsMessage::OpenQuestion { question_id: None } => self.editor.open(None),
      ClientWsMessage::OpenQuestion { question_id: Some(id) } => match draft.question(&id) {
        Some(q) => self.editor.open(Some(q)),
        None => return Self::error(format!("Unknown question {id}")),
      },
      ClientWsMessage::SaveQuestion => {
        if let Some(id) = self.editor.save(draft) {
          let answers = draft.question(&id).map_or(0, |q| q.answers.len());
          info!(target: "editor", question_id = %id, answers, "Question saved into draft");
        }
      }
      ClientWsMessage::CloseQuestion => self.editor.close(),
      drawer if !self.editor.is_open() => {
        warn!(target: "editor", kind = drawer.kind(), "Drawer message while drawer is closed");
        return Self::error("No question is open");
      }
      ClientWsMessage::SetQuestionTitle { title } => self.editor.set_title(&title),
      ClientWsMessage::ChangeType { kind } => self.editor.change_kind(kind),
      ClientWsMessage::AddVariant => {
        self.editor.add_variant();
      }
      ClientWsMessage::UpdateVariant { variant_id, field, value } => {
        self.editor.update_variant(&variant_id, field, &value);
      }
      ClientWsMessage::SetTextAnswer { text } => self.editor.set_text_answer(&text),
      ClientWsMessage::ToggleCorrect { variant_id } => {
        self.editor.toggle_correct(&variant_id);
      }
      ClientWsMessage::RemoveVariant { variant_id } => {
        self.editor.remove_variant(&variant_id);
      }
      other => return Self::error(format!("Unexpected message {}", other.kind())),
    }
    self.render()
  }

  async fn save_test(&mut self) -> ServerWsMessage {
    let Some(draft) = self.draft.as_ref() else {
      return Self::error("No test is being edited");
    };
    let issues = draft.validate();
    if !issues.is_empty() {
      return ServerWsMessage::Invalid { issues };
    }

    info!(target: "editor", edit = draft.is_edit(), questions = draft.questions().len(), "Saving test");
    let report = reconcile::sync(draft, self.remote.as_ref(), self.policy).await;
    info!(target: "editor", test_id = ?report.test_id, success = report.is_success(), "Test saved");
    self.go_home();
    ServerWsMessage::Saved { report }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Answers, Question, Test, TextAnswer};
  use crate::remote::fake::{Call, RecordingRemote};
  use crate::variants::VariantField;
  use chrono::Utc;

  fn controller(remote: Arc<RecordingRemote>) -> Controller {
    Controller::new(remote, Exporter::default(), false, DeletionPolicy::SetDifference)
  }

  fn stored_test() -> Test {
    Test {
      id: "T".into(),
      title: "Stored".into(),
      created: Utc::now(),
      updated: Utc::now(),
      questions: vec![Question {
        id: "Q".into(),
        title: "2+2, quickly".into(),
        answers: Answers::Text(TextAnswer { id: "A".into(), text: "4".into() }),
      }],
      stored_answers: Default::default(),
    }
  }

  fn view(msg: ServerWsMessage) -> ViewOut {
    match msg {
      ServerWsMessage::View { view } => view,
      other => panic!("expected view, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn create_flow_ends_with_sync_and_home() {
    let remote = Arc::new(RecordingRemote::new());
    let mut c = controller(remote.clone());

    c.handle(ClientWsMessage::StartCreate).await;
    c.handle(ClientWsMessage::SetTitle { title: "Quiz".into() }).await;
    let v = view(c.handle(ClientWsMessage::OpenQuestion { question_id: None }).await);
    assert!(v.drawer_open);

    c.handle(ClientWsMessage::SetQuestionTitle { title: "Pick one".into() }).await;
    c.handle(ClientWsMessage::ChangeType { kind: crate::domain::QuestionKind::Choice }).await;
    let v = view(c.handle(ClientWsMessage::AddVariant).await);
    let first = v.editor.unwrap().choice[0].id.clone();
    c.handle(ClientWsMessage::UpdateVariant { variant_id: first.clone(), field: VariantField::Text, value: "A".into() })
      .await;
    c.handle(ClientWsMessage::ToggleCorrect { variant_id: first }).await;

    let v = view(c.handle(ClientWsMessage::SaveQuestion).await);
    assert!(!v.drawer_open);
    assert_eq!(v.draft.unwrap().questions.len(), 1);

    let saved = c.handle(ClientWsMessage::SaveTest).await;
    let ServerWsMessage::Saved { report } = saved else { panic!("expected saved") };
    assert!(report.is_success());
    assert_eq!(c.view().page, Page::Home);
    assert!(c.view().draft.is_none());
    assert!(remote.calls().contains(&Call::CreateTest("Quiz".into())));
  }

  #[tokio::test]
  async fn empty_draft_is_not_saved() {
    let remote = Arc::new(RecordingRemote::new());
    let mut c = controller(remote.clone());
    c.handle(ClientWsMessage::StartCreate).await;
    let reply = c.handle(ClientWsMessage::SaveTest).await;
    assert!(matches!(reply, ServerWsMessage::Invalid { ref issues } if issues.len() == 2));
    assert!(remote.calls().is_empty());
    assert_eq!(c.view().page, Page::Create);
  }

  #[tokio::test]
  async fn edit_flow_deletes_removed_question() {
    let remote = Arc::new(RecordingRemote::new().with_test(stored_test()));
    let mut c = controller(remote.clone());

    let v = view(c.handle(ClientWsMessage::StartEdit { test_id: "T".into() }).await);
    assert_eq!(v.page, Page::Edit("T".into()));
    c.handle(ClientWsMessage::RemoveQuestion { question_id: "Q".into() }).await;
    c.handle(ClientWsMessage::OpenQuestion { question_id: None }).await;
    c.handle(ClientWsMessage::SetQuestionTitle { title: "New".into() }).await;
    c.handle(ClientWsMessage::SetTextAnswer { text: "yes".into() }).await;
    c.handle(ClientWsMessage::SaveQuestion).await;
    c.handle(ClientWsMessage::SaveTest).await;

    let calls = remote.calls();
    assert!(calls.contains(&Call::DeleteQuestion("Q".into())));
    assert!(calls.contains(&Call::UpdateTest("T".into(), "Stored".into())));
    assert!(calls.iter().any(|call| matches!(call, Call::CreateQuestion(b) if b.title == "New")));
  }

  #[tokio::test]
  async fn drawer_messages_need_an_open_drawer() {
    let mut c = controller(Arc::new(RecordingRemote::new()));
    assert!(matches!(c.handle(ClientWsMessage::AddVariant).await, ServerWsMessage::Error { .. }));
    c.handle(ClientWsMessage::StartCreate).await;
    assert!(matches!(c.handle(ClientWsMessage::AddVariant).await, ServerWsMessage::Error { .. }));
    assert!(matches!(
      c.handle(ClientWsMessage::OpenQuestion { question_id: Some("nope".into()) }).await,
      ServerWsMessage::Error { .. }
    ));
  }

  #[tokio::test]
  async fn export_and_delete_from_the_list() {
    let remote = Arc::new(RecordingRemote::new().with_test(stored_test()));
    let mut c = controller(remote.clone());

    let ServerWsMessage::Tests { tests } = c.handle(ClientWsMessage::ListTests).await else { panic!("tests") };
    assert_eq!(tests.len(), 1);

    let ServerWsMessage::Export { text } = c.handle(ClientWsMessage::ExportTest { test_id: "T".into() }).await else {
      panic!("export")
    };
    assert!(text.contains("1. 2+2 quickly\n\n4\n\n"));

    let ServerWsMessage::Tests { tests } = c.handle(ClientWsMessage::DeleteTest { test_id: "T".into() }).await else {
      panic!("tests")
    };
    assert!(tests.is_empty());
  }

  #[tokio::test]
  async fn unsaved_draft_can_be_exported() {
    let mut c = controller(Arc::new(RecordingRemote::new()));
    assert!(matches!(c.handle(ClientWsMessage::ExportDraft).await, ServerWsMessage::Error { .. }));

    c.handle(ClientWsMessage::StartCreate).await;
    c.handle(ClientWsMessage::SetTitle { title: "Draft".into() }).await;
    let ServerWsMessage::Export { text } = c.handle(ClientWsMessage::ExportDraft).await else { panic!("export") };
    assert_eq!(text, "Test title: Draft\nNumber of questions: 0\nQuestions:\n");
  }

  #[tokio::test]
  async fn sign_in_and_info_modal_flags() {
    let remote = Arc::new(RecordingRemote::new());
    let mut c = controller(remote.clone());
    let reply = c.handle(ClientWsMessage::SignIn { credential: "g".into() }).await;
    assert!(matches!(reply, ServerWsMessage::SignedIn { ref access_token } if access_token == "token-for-g"));
    assert!(c.view().signed_in);

    assert!(view(c.handle(ClientWsMessage::ShowInfo).await).info_modal_open);
    assert!(!view(c.handle(ClientWsMessage::HideInfo).await).info_modal_open);

    let v = view(c.handle(ClientWsMessage::SignOut).await);
    assert!(!v.signed_in);
    assert_eq!(remote.token(), None);
  }

  #[tokio::test]
  async fn partially_failed_save_still_goes_home() {
    let remote = Arc::new(
      RecordingRemote::new()
        .with_test(stored_test())
        .fail_when(|c| matches!(c, Call::UpdateAnswer(..))),
    );
    let mut c = controller(remote.clone());
    c.handle(ClientWsMessage::StartEdit { test_id: "T".into() }).await;
    c.handle(ClientWsMessage::OpenQuestion { question_id: Some("Q".into()) }).await;
    c.handle(ClientWsMessage::SetTextAnswer { text: "four".into() }).await;
    c.handle(ClientWsMessage::SaveQuestion).await;

    let ServerWsMessage::Saved { report } = c.handle(ClientWsMessage::SaveTest).await else { panic!("saved") };
    assert!(!report.is_success());
    assert_eq!(report.failures().count(), 1);
    assert_eq!(report.test_id.as_deref(), Some("T"));
    assert_eq!(c.view().page, Page::Home);
    assert!(c.view().draft.is_none());
  }

  /// Collects everything the fmt layer writes.
  #[derive(Clone, Default)]
  struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

  impl std::io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
      Ok(())
    }
  }

  #[tokio::test]
  async fn sign_in_secrets_stay_out_of_logs() {
    let out = Captured::default();
    let writer = out.clone();
    let subscriber = tracing_subscriber::fmt()
      .with_max_level(tracing::Level::TRACE)
      .with_ansi(false)
      .with_writer(move || writer.clone())
      .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut c = controller(Arc::new(RecordingRemote::new()));
    c.handle(ClientWsMessage::SignIn { credential: "idp-credential-123".into() }).await;
    c.handle(ClientWsMessage::Authenticate { access_token: "bearer-token-456".into() }).await;
    c.handle(ClientWsMessage::AddVariant).await;

    let logs = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
    assert!(logs.contains("Signed in"));
    assert!(logs.contains("sign_in"));
    assert!(!logs.contains("idp-credential-123"));
    assert!(!logs.contains("bearer-token-456"));
  }
}
