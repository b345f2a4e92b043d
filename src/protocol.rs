//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::controller::Page;
use crate::domain::{ChoiceAnswer, MatchPair, QuestionKind, QuestionRecord, Test, TestRecord, TextAnswer};
use crate::draft::{DraftIssue, TestDraft};
use crate::editor::QuestionEditor;
use crate::reconcile::SyncReport;
use crate::variants::VariantField;

/// Messages the editor frontend sends over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    SignIn {
        credential: String,
    },
    Authenticate {
        #[serde(rename = "accessToken")]
        access_token: String,
    },
    SignOut,
    ListTests,
    OpenTest {
        #[serde(rename = "testId")]
        test_id: String,
    },
    DeleteTest {
        #[serde(rename = "testId")]
        test_id: String,
    },
    ExportTest {
        #[serde(rename = "testId")]
        test_id: String,
    },
    StartCreate,
    StartEdit {
        #[serde(rename = "testId")]
        test_id: String,
    },
    SetTitle {
        title: String,
    },
    /// Open the question drawer; no id means a new question.
    OpenQuestion {
        #[serde(rename = "questionId", default)]
        question_id: Option<String>,
    },
    SetQuestionTitle {
        title: String,
    },
    ChangeType {
        kind: QuestionKind,
    },
    AddVariant,
    UpdateVariant {
        #[serde(rename = "variantId")]
        variant_id: String,
        field: VariantField,
        value: String,
    },
    SetTextAnswer {
        text: String,
    },
    ToggleCorrect {
        #[serde(rename = "variantId")]
        variant_id: String,
    },
    RemoveVariant {
        #[serde(rename = "variantId")]
        variant_id: String,
    },
    SaveQuestion,
    CloseQuestion,
    RemoveQuestion {
        #[serde(rename = "questionId")]
        question_id: String,
    },
    /// Export the draft being edited, saved or not.
    ExportDraft,
    SaveTest,
    /// Navigate away from the editor, discarding the draft.
    Leave,
    ShowInfo,
    HideInfo,
}

impl ClientWsMessage {
    /// The `type` tag. Safe to log: sign-in messages carry secrets in their payload.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientWsMessage::Ping => "ping",
            ClientWsMessage::SignIn { .. } => "sign_in",
            ClientWsMessage::Authenticate { .. } => "authenticate",
            ClientWsMessage::SignOut => "sign_out",
            ClientWsMessage::ListTests => "list_tests",
            ClientWsMessage::OpenTest { .. } => "open_test",
            ClientWsMessage::DeleteTest { .. } => "delete_test",
            ClientWsMessage::ExportTest { .. } => "export_test",
            ClientWsMessage::StartCreate => "start_create",
            ClientWsMessage::StartEdit { .. } => "start_edit",
            ClientWsMessage::SetTitle { .. } => "set_title",
            ClientWsMessage::OpenQuestion { .. } => "open_question",
            ClientWsMessage::SetQuestionTitle { .. } => "set_question_title",
            ClientWsMessage::ChangeType { .. } => "change_type",
            ClientWsMessage::AddVariant => "add_variant",
            ClientWsMessage::UpdateVariant { .. } => "update_variant",
            ClientWsMessage::SetTextAnswer { .. } => "set_text_answer",
            ClientWsMessage::ToggleCorrect { .. } => "toggle_correct",
            ClientWsMessage::RemoveVariant { .. } => "remove_variant",
            ClientWsMessage::SaveQuestion => "save_question",
            ClientWsMessage::CloseQuestion => "close_question",
            ClientWsMessage::RemoveQuestion { .. } => "remove_question",
            ClientWsMessage::ExportDraft => "export_draft",
            ClientWsMessage::SaveTest => "save_test",
            ClientWsMessage::Leave => "leave",
            ClientWsMessage::ShowInfo => "show_info",
            ClientWsMessage::HideInfo => "hide_info",
        }
    }
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    SignedIn {
        #[serde(rename = "accessToken")]
        access_token: String,
    },
    View {
        view: ViewOut,
    },
    Tests {
        tests: Vec<TestSummary>,
    },
    Test {
        test: TestRecord,
    },
    Export {
        text: String,
    },
    Saved {
        report: SyncReport,
    },
    Invalid {
        issues: Vec<DraftIssue>,
    },
    Error {
        message: String,
    },
}

/// Everything the frontend needs to render the current page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewOut {
    pub page: Page,
    pub signed_in: bool,
    pub drawer_open: bool,
    pub info_modal_open: bool,
    pub draft: Option<DraftOut>,
    pub editor: Option<EditorOut>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftOut {
    pub test_id: Option<String>,
    pub title: String,
    pub questions: Vec<QuestionRecord>,
}

impl From<&TestDraft> for DraftOut {
    fn from(d: &TestDraft) -> Self {
        DraftOut {
            test_id: d.test_id().map(str::to_string),
            title: d.title().to_string(),
            questions: d.questions().iter().map(QuestionRecord::from).collect(),
        }
    }
}

/// The question drawer. All three stores are sent so switching tabs needs no round trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOut {
    pub editing_id: Option<String>,
    pub title: String,
    pub kind: QuestionKind,
    pub text_answer: TextAnswer,
    pub choice: Vec<ChoiceAnswer>,
    pub matching: Vec<MatchPair>,
}

impl From<&QuestionEditor> for EditorOut {
    fn from(e: &QuestionEditor) -> Self {
        EditorOut {
            editing_id: e.editing_id().map(str::to_string),
            title: e.title().to_string(),
            kind: e.kind(),
            text_answer: e.stores().text.answer().clone(),
            choice: e.stores().choice.items().to_vec(),
            matching: e.stores().matching.items().to_vec(),
        }
    }
}

/// One card of the home list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DD`
    pub created: String,
    pub updated: String,
    pub question_count: usize,
}

impl From<&Test> for TestSummary {
    fn from(t: &Test) -> Self {
        TestSummary {
            id: t.id.clone(),
            title: t.title.clone(),
            created: t.created.format("%Y-%m-%d").to_string(),
            updated: t.updated.format("%Y-%m-%d").to_string(),
            question_count: t.questions.len(),
        }
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub token: String,
}
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOut {
    pub access_token: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}
