//! The remote test store as seen by the editor: one resource per entity, bearer auth.
//!
//! `ApiClient` is the HTTP implementation; tests use the recording fake in `fake`.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Answer, QuestionKind, Test};
use crate::error::ApiError;

/// Body of `POST /question` and `PUT /question/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBody {
  pub test_guid: String,
  pub title: String,
  #[serde(rename = "type")]
  pub kind: QuestionKind,
}

/// Body of `POST /answer` and `PUT /answer/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerBody {
  pub question_guid: String,
  pub text: String,
  pub sub_text: Option<String>,
  pub is_correct: bool,
}

impl AnswerBody {
  pub fn new(question_id: &str, answer: &Answer) -> Self {
    Self {
      question_guid: question_id.to_string(),
      text: answer.text.clone(),
      sub_text: answer.sub_text.clone(),
      is_correct: answer.is_correct,
    }
  }
}

#[async_trait]
pub trait QuizRemote: Send + Sync {
  /// Exchange an identity-provider credential for an access token and keep it for
  /// subsequent calls.
  async fn sign_in(&self, credential: &str) -> Result<String, ApiError>;
  /// Use (or forget) an access token obtained earlier.
  fn set_access_token(&self, token: Option<String>);

  async fn list_tests(&self) -> Result<Vec<Test>, ApiError>;
  async fn get_test(&self, id: &str) -> Result<Test, ApiError>;
  async fn create_test(&self, title: &str) -> Result<String, ApiError>;
  async fn update_test(&self, id: &str, title: &str) -> Result<String, ApiError>;
  async fn delete_test(&self, id: &str) -> Result<(), ApiError>;

  async fn create_question(&self, body: &QuestionBody) -> Result<String, ApiError>;
  async fn update_question(&self, id: &str, body: &QuestionBody) -> Result<String, ApiError>;
  async fn delete_question(&self, id: &str) -> Result<(), ApiError>;

  async fn create_answer(&self, body: &AnswerBody) -> Result<String, ApiError>;
  async fn update_answer(&self, id: &str, body: &AnswerBody) -> Result<(), ApiError>;
  async fn delete_answer(&self, id: &str) -> Result<(), ApiError>;
}
