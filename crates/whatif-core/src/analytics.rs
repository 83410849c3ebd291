//! Analytics events: an append-only usage log.
//!
//! Nothing reads individual events back; they only feed the per-session
//! counters in [`SessionStats`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known `event_type` tags. The column itself is free-form.
pub mod event_type {
  pub const CREATE_REALITY: &str = "create_reality";
  pub const SAVE_TREE: &str = "save_tree";
  pub const ENHANCE_REALITY: &str = "enhance_reality";
}

/// Input to [`RealityStore::record_event`](crate::store::RealityStore::record_event).
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub user_session: String,
  pub event_type:   String,
  pub event_data:   serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
  /// Assigned by the store; strictly increasing.
  pub id:           i64,
  pub user_session: String,
  pub event_type:   String,
  pub event_data:   serde_json::Value,
  pub timestamp:    DateTime<Utc>,
}

// ─── Session statistics ──────────────────────────────────────────────────────

/// Row counts for one session across all three tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
  pub realities:    u64,
  pub trees:        u64,
  pub interactions: u64,
}

impl SessionStats {
  /// `floor(realities * 1.7 + interactions * 0.3)`
  pub fn diversity_score(&self) -> u64 {
    (self.realities as f64 * 1.7 + self.interactions as f64 * 0.3).floor() as u64
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn diversity_score_floors() {
    let stats = SessionStats { realities: 3, trees: 0, interactions: 5 };
    assert_eq!(stats.diversity_score(), 6);
  }

  #[test]
  fn diversity_score_ignores_trees() {
    let stats = SessionStats { realities: 0, trees: 40, interactions: 0 };
    assert_eq!(stats.diversity_score(), 0);

    let stats = SessionStats { realities: 10, trees: 1, interactions: 10 };
    assert_eq!(stats.diversity_score(), 20);
  }
}
