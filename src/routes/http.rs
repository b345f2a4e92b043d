//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; the caller's bearer token is forwarded to the
//! remote test store and never logged.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::domain::TestRecord;
use crate::error::ApiError;
use crate::logic::*;
use crate::protocol::*;
use crate::remote::QuizRemote;
use crate::state::AppState;
use crate::util::{bearer_token, trunc_for_log};

/// Remote failures as HTTP answers: auth problems stay 401, missing tests stay 404,
/// anything else upstream is a bad gateway.
pub struct HttpError(ApiError);

impl From<ApiError> for HttpError {
  fn from(e: ApiError) -> Self {
    HttpError(e)
  }
}

impl IntoResponse for HttpError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      ApiError::MissingToken | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Transport(_) | ApiError::Status { .. } | ApiError::Decode(_) => StatusCode::BAD_GATEWAY,
    };
    let message = self.0.to_string();
    warn!(target: "quizdraft", status = status.as_u16(), error = %trunc_for_log(&message, 200), "HTTP request failed");
    (status, Json(ErrorOut { message })).into_response()
  }
}

type HttpResult<T> = Result<T, HttpError>;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, q))]
pub async fn http_auth(
  State(state): State<Arc<AppState>>,
  Query(q): Query<AuthQuery>,
) -> HttpResult<Json<AuthOut>> {
  let access_token = state.api.session().sign_in(&q.token).await?;
  info!(target: "quizdraft", "HTTP sign-in succeeded");
  Ok(Json(AuthOut { access_token }))
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_list_tests(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
) -> HttpResult<Json<Vec<TestSummary>>> {
  let api = state.api_for(bearer_token(&headers));
  Ok(Json(list_summaries(&api).await?))
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_get_test(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> HttpResult<Json<TestRecord>> {
  let api = state.api_for(bearer_token(&headers));
  Ok(Json(fetch_test(&api, &id).await?))
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_delete_test(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> HttpResult<StatusCode> {
  let api = state.api_for(bearer_token(&headers));
  api.delete_test(&id).await?;
  info!(target: "quizdraft", %id, "HTTP test deleted");
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_export_test(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> HttpResult<impl IntoResponse> {
  let api = state.api_for(bearer_token(&headers));
  let text = export_text(&api, &state.exporter, state.config.export.shuffle, &id).await?;
  Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}
