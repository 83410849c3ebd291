//! Handler for `GET /health`.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
  pub status:    &'static str,
  pub service:   &'static str,
  pub timestamp: DateTime<Utc>,
}

/// Liveness probe; answers whenever the process is serving.
pub async fn handler() -> Json<HealthResponse> {
  Json(HealthResponse {
    status:    "healthy",
    service:   "whatif",
    timestamp: Utc::now(),
  })
}
