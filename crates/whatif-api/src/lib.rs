//! JSON REST API for whatif.
//!
//! Exposes an axum [`Router`] backed by any [`whatif_core::store::RealityStore`].
//! Tracing layers, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET`  | `/health` | [`health::handler`] |
//! | `POST` | `/realities` | [`realities::create`] |
//! | `GET`  | `/realities/{user_session}` | [`realities::list`] |
//! | `POST` | `/trees` | [`trees::save`] |
//! | `GET`  | `/trees/share/{share_token}` | [`trees::view_shared`] |
//! | `GET`  | `/stats/{user_session}` | [`stats::handler`] |
//! | `POST` | `/ai/enhance-reality` | [`enhance::handler`] |

pub mod analytics;
pub mod enhance;
pub mod error;
pub mod health;
pub mod realities;
pub mod stats;
pub mod trees;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use whatif_core::{generator::Generator, store::RealityStore};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Settings the handlers need at request time.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Externally reachable base URL, used to build share links.
  pub public_url: String,
}

impl ApiConfig {
  pub fn share_url(&self, token: &str) -> String {
    format!("{}/trees/share/{token}", self.public_url.trim_end_matches('/'))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers. Nothing in it is mutable
/// apart from what the store itself guards.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:     Arc<S>,
  pub generator: Arc<Generator>,
  pub config:    Arc<ApiConfig>,
}

impl<S> AppState<S> {
  pub fn new(store: S, generator: Generator, config: ApiConfig) -> Self {
    Self {
      store:     Arc::new(store),
      generator: Arc::new(generator),
      config:    Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: RealityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/health", get(health::handler))
    // Realities
    .route("/realities", post(realities::create::<S>))
    .route("/realities/{user_session}", get(realities::list::<S>))
    // Trees
    .route("/trees", post(trees::save::<S>))
    .route("/trees/share/{share_token}", get(trees::view_shared::<S>))
    // Stats
    .route("/stats/{user_session}", get(stats::handler::<S>))
    // Enhancement
    .route("/ai/enhance-reality", post(enhance::handler::<S>))
    .fallback(not_found)
    .method_not_allowed_fallback(method_not_allowed)
    .with_state(state)
}

async fn not_found() -> ApiError { ApiError::NotFound("no such route".to_owned()) }

async fn method_not_allowed() -> ApiError { ApiError::MethodNotAllowed }
