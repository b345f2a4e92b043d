//! HTTP client for the remote test store.
//!
//! One resource per entity (`/test`, `/question`, `/answer`), JSON bodies, bearer auth.
//! Calls are instrumented and log paths, statuses and latencies, never tokens or bodies.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::config::ApiConfig;
use crate::domain::{Test, TestRecord};
use crate::error::ApiError;
use crate::remote::{AnswerBody, QuestionBody, QuizRemote};

#[derive(Deserialize)]
struct IdOut {
  id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenOut {
  access_token: String,
}

#[derive(Serialize)]
struct TitleIn<'a> {
  title: &'a str,
}

/// Cheap to clone; clones made with `session()` get their own token slot.
#[derive(Clone, Debug)]
pub struct ApiClient {
  client: reqwest::Client,
  base_url: String,
  user_agent: String,
  default_token: Option<String>,
  token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
  pub fn new(cfg: &ApiConfig) -> Result<Self, ApiError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      base_url: cfg.base_url.trim_end_matches('/').to_string(),
      user_agent: cfg.user_agent.clone(),
      default_token: cfg.access_token.clone(),
      token: Arc::new(RwLock::new(cfg.access_token.clone())),
    })
  }

  /// Same connection pool, separate sign-in state.
  pub fn session(&self) -> Self {
    Self { token: Arc::new(RwLock::new(self.default_token.clone())), ..self.clone() }
  }

  /// Session that acts with the given token (e.g. forwarded from an incoming request).
  pub fn with_token(&self, token: Option<String>) -> Self {
    let session = self.session();
    if token.is_some() {
      session.set_access_token(token);
    }
    session
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  fn current_token(&self) -> Option<String> {
    self.token.read().ok().and_then(|t| t.clone())
  }

  fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
    let token = self.current_token().ok_or(ApiError::MissingToken)?;
    Ok(self.client.request(method, self.url(path)).header(USER_AGENT, &self.user_agent).bearer_auth(token))
  }

  async fn execute(&self, req: RequestBuilder, path: &str) -> Result<Response, ApiError> {
    let start = std::time::Instant::now();
    let res = req.send().await?;
    let status = res.status();
    debug!(target: "quizdraft", %path, status = status.as_u16(), elapsed = ?start.elapsed(), "Remote call finished");
    match status {
      s if s.is_success() => Ok(res),
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized),
      StatusCode::NOT_FOUND => Err(ApiError::NotFound(path.to_string())),
      s => {
        let body = res.text().await.unwrap_or_default();
        error!(target: "quizdraft", %path, status = s.as_u16(), "Remote call rejected");
        Err(ApiError::Status { status: s.as_u16(), body })
      }
    }
  }

  async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder, path: &str) -> Result<T, ApiError> {
    let res = self.execute(req, path).await?;
    let bytes = res.bytes().await?;
    Ok(serde_json::from_slice::<T>(&bytes)?)
  }

  async fn send_empty(&self, req: RequestBuilder, path: &str) -> Result<(), ApiError> {
    self.execute(req, path).await.map(|_| ())
  }
}

#[async_trait]
impl QuizRemote for ApiClient {
  #[instrument(level = "info", skip(self, credential))]
  async fn sign_in(&self, credential: &str) -> Result<String, ApiError> {
    let path = "/auth";
    let req = self
      .client
      .get(self.url(path))
      .header(USER_AGENT, &self.user_agent)
      .query(&[("token", credential)]);
    let out: TokenOut = self.send_json(req, path).await?;
    self.set_access_token(Some(out.access_token.clone()));
    Ok(out.access_token)
  }

  fn set_access_token(&self, token: Option<String>) {
    if let Ok(mut slot) = self.token.write() {
      *slot = token;
    }
  }

  #[instrument(level = "info", skip(self))]
  async fn list_tests(&self) -> Result<Vec<Test>, ApiError> {
    let path = "/test";
    let records: Vec<TestRecord> = self.send_json(self.request(Method::GET, path)?, path).await?;
    Ok(records.into_iter().map(Test::from).collect())
  }

  #[instrument(level = "info", skip(self))]
  async fn get_test(&self, id: &str) -> Result<Test, ApiError> {
    let path = format!("/test/{id}");
    let record: TestRecord = self.send_json(self.request(Method::GET, &path)?, &path).await?;
    Ok(record.into())
  }

  #[instrument(level = "info", skip(self, title), fields(title_len = title.len()))]
  async fn create_test(&self, title: &str) -> Result<String, ApiError> {
    let path = "/test";
    let req = self.request(Method::POST, path)?.json(&TitleIn { title });
    let out: IdOut = self.send_json(req, path).await?;
    Ok(out.id)
  }

  #[instrument(level = "info", skip(self, title), fields(title_len = title.len()))]
  async fn update_test(&self, id: &str, title: &str) -> Result<String, ApiError> {
    let path = format!("/test/{id}");
    let req = self.request(Method::PUT, &path)?.json(&TitleIn { title });
    let out: IdOut = self.send_json(req, &path).await?;
    Ok(out.id)
  }

  #[instrument(level = "info", skip(self))]
  async fn delete_test(&self, id: &str) -> Result<(), ApiError> {
    let path = format!("/test/{id}");
    self.send_empty(self.request(Method::DELETE, &path)?, &path).await
  }

  #[instrument(level = "info", skip(self, body), fields(test = %body.test_guid))]
  async fn create_question(&self, body: &QuestionBody) -> Result<String, ApiError> {
    let path = "/question";
    let out: IdOut = self.send_json(self.request(Method::POST, path)?.json(body), path).await?;
    Ok(out.id)
  }

  #[instrument(level = "info", skip(self, body))]
  async fn update_question(&self, id: &str, body: &QuestionBody) -> Result<String, ApiError> {
    let path = format!("/question/{id}");
    let out: IdOut = self.send_json(self.request(Method::PUT, &path)?.json(body), &path).await?;
    Ok(out.id)
  }

  #[instrument(level = "info", skip(self))]
  async fn delete_question(&self, id: &str) -> Result<(), ApiError> {
    let path = format!("/question/{id}");
    self.send_empty(self.request(Method::DELETE, &path)?, &path).await
  }

  #[instrument(level = "info", skip(self, body), fields(question = %body.question_guid))]
  async fn create_answer(&self, body: &AnswerBody) -> Result<String, ApiError> {
    let path = "/answer";
    let out: IdOut = self.send_json(self.request(Method::POST, path)?.json(body), path).await?;
    Ok(out.id)
  }

  #[instrument(level = "info", skip(self, body))]
  async fn update_answer(&self, id: &str, body: &AnswerBody) -> Result<(), ApiError> {
    let path = format!("/answer/{id}");
    self.send_empty(self.request(Method::PUT, &path)?.json(body), &path).await
  }

  #[instrument(level = "info", skip(self))]
  async fn delete_answer(&self, id: &str) -> Result<(), ApiError> {
    let path = format!("/answer/{id}");
    self.send_empty(self.request(Method::DELETE, &path)?, &path).await
  }
}
