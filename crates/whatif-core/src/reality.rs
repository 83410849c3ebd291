//! Reality types: generated alternative-history records and their outcomes.
//!
//! A reality is created once per generation request and never updated.
//! Outcomes only exist nested inside a reality.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// One branch of a reality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
  pub id:           Uuid,
  /// Display label, e.g. `"Path 2"`.
  pub title:        String,
  pub description:  String,
  /// In `[0.0, 1.0)`.
  pub probability:  f64,
  /// In `1..=10`.
  pub impact:       u8,
  pub consequences: Vec<String>,
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// The generated content of a reality, before it is assigned an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealityDraft {
  pub title:       String,
  pub description: String,
  /// Two to four entries for anything the generator produced normally.
  pub outcomes:    Vec<Outcome>,
  /// In `[0.2, 0.9)`.
  pub probability: f64,
  /// In `3..=10`.
  pub impact:      u8,
}

// ─── Persisted reality ───────────────────────────────────────────────────────

/// Input to [`RealityStore::insert_reality`](crate::store::RealityStore::insert_reality).
#[derive(Debug, Clone)]
pub struct NewReality {
  pub user_session:   String,
  /// The verbatim phrase the reality was generated from.
  pub original_event: String,
  pub draft:          RealityDraft,
}

/// A persisted reality. The store assigns `id`, `created_at` and
/// `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reality {
  pub id:                Uuid,
  pub user_session:      String,
  pub title:             String,
  pub description:       String,
  pub original_event:    String,
  pub outcomes:          Vec<Outcome>,
  pub probability_score: f64,
  pub impact_score:      u8,
  pub created_at:        DateTime<Utc>,
  /// Equal to `created_at`; no operation mutates a reality.
  pub updated_at:        DateTime<Utc>,
}
