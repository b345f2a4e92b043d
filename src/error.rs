//! Errors raised while talking to the remote test store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  /// Connection, timeout or body transfer failure.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("not signed in: no access token")]
  MissingToken,

  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  /// Any other non-2xx answer.
  #[error("HTTP {status}: {body}")]
  Status { status: u16, body: String },

  #[error("unexpected response body: {0}")]
  Decode(String),
}

impl From<serde_json::Error> for ApiError {
  fn from(e: serde_json::Error) -> Self {
    ApiError::Decode(e.to_string())
  }
}
