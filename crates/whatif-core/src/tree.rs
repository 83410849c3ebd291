//! Reality trees, client-assembled graphs the server stores verbatim.
//!
//! A tree is private or public. Public trees carry a share token and count
//! their views; there is no way back from public to private.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input to [`RealityStore::save_tree`](crate::store::RealityStore::save_tree).
#[derive(Debug, Clone)]
pub struct NewTree {
  pub user_session: String,
  /// Opaque to the server; the client owns its schema.
  pub tree_data:    serde_json::Value,
  /// If `true`, the store mints a fresh share token.
  pub make_public:  bool,
}

/// A persisted tree.
///
/// `share_token.is_some() == is_public` holds for every stored row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealityTree {
  pub id:           Uuid,
  pub user_session: String,
  pub tree_data:    serde_json::Value,
  pub share_token:  Option<String>,
  pub is_public:    bool,
  pub view_count:   u64,
  pub created_at:   DateTime<Utc>,
}

/// The view of a tree handed out through its share token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedTree {
  pub id:         Uuid,
  pub tree_data:  serde_json::Value,
  /// Count after this read was recorded.
  pub view_count: u64,
  pub created_at: DateTime<Utc>,
}

impl From<RealityTree> for SharedTree {
  fn from(t: RealityTree) -> Self {
    SharedTree {
      id:         t.id,
      tree_data:  t.tree_data,
      view_count: t.view_count,
      created_at: t.created_at,
    }
  }
}
