//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Every variant renders as `{"error": "<message>"}`. Store failures are
/// logged with their source; the client only sees the context message.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("method not allowed")]
  MethodNotAllowed,

  #[error("{context}: {source}")]
  Store {
    context: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Adapter for `map_err` on store calls.
  pub fn store<E>(context: &'static str) -> impl FnOnce(E) -> ApiError
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| ApiError::Store { context, source: Box::new(e) }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self { ApiError::Validation(r.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(r: PathRejection) -> Self { ApiError::Validation(r.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { ApiError::Validation(r.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, self.to_string()),
      ApiError::Store { context, source } => {
        tracing::error!(error = %source, "{context}");
        (StatusCode::INTERNAL_SERVER_ERROR, (*context).to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
