//! Handlers for `/trees` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/trees` | Body: [`SaveBody`]; `makePublic` mints a share token |
//! | `GET`  | `/trees/share/:share_token` | 404 unless public; counts a view |

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;
use whatif_core::{
  analytics::event_type,
  session::session_or_new,
  store::RealityStore,
  tree::{NewTree, SharedTree},
};

use crate::{AppState, analytics, error::ApiError};

// ─── Save ─────────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /trees`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBody {
  /// Stored verbatim. Required; `null` counts as missing.
  pub tree_data:    Option<Value>,
  pub user_session: Option<String>,
  #[serde(default)]
  pub make_public:  bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
  pub success:      bool,
  pub tree_id:      Uuid,
  pub user_session: String,
  /// `null` for private trees.
  pub share_token:  Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub share_url:    Option<String>,
}

/// `POST /trees`
pub async fn save<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<SaveBody>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError>
where
  S: RealityStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Json(body) = body?;
  let tree_data = body
    .tree_data
    .ok_or_else(|| ApiError::Validation("treeData is required".to_owned()))?;
  let session = session_or_new(body.user_session.as_deref());

  let tree = state
    .store
    .save_tree(NewTree {
      user_session: session.clone(),
      tree_data,
      make_public: body.make_public,
    })
    .await
    .map_err(ApiError::store("failed to save tree"))?;

  analytics::record(
    &*state.store,
    &session,
    event_type::SAVE_TREE,
    json!({ "treeId": tree.id, "isPublic": tree.is_public }),
  )
  .await;

  let share_url = tree.share_token.as_deref().map(|t| state.config.share_url(t));
  Ok(Json(SaveResponse {
    success: true,
    tree_id: tree.id,
    user_session: session,
    share_token: tree.share_token,
    share_url,
  }))
}

// ─── View shared ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SharedTreeResponse {
  pub tree: SharedTree,
}

/// `GET /trees/share/:share_token`
///
/// The owner's session is deliberately left out of the response.
pub async fn view_shared<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<String>, PathRejection>,
) -> Result<Json<SharedTreeResponse>, ApiError>
where
  S: RealityStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Path(share_token) = path?;
  let tree = state
    .store
    .view_shared_tree(&share_token)
    .await
    .map_err(ApiError::store("failed to fetch shared tree"))?
    .ok_or_else(|| ApiError::NotFound("shared tree not found".to_owned()))?;

  Ok(Json(SharedTreeResponse { tree: SharedTree::from(tree) }))
}
