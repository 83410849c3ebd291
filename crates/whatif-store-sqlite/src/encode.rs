//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed microsecond
//! precision, so string order matches time order. Structured fields
//! (outcomes, tree data, event data) are stored as compact JSON. UUIDs are
//! stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;
use whatif_core::{
  analytics::AnalyticsEvent,
  reality::{Outcome, Reality},
  tree::RealityTree,
};

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time, truncated to what [`encode_dt`] preserves.
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  let micros = now.timestamp_micros();
  DateTime::from_timestamp_micros(micros).unwrap_or(now)
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

pub fn encode_outcomes(outcomes: &[Outcome]) -> Result<String> {
  Ok(serde_json::to_string(outcomes)?)
}

/// Lenient: a missing or corrupt column decodes to no outcomes.
pub fn decode_outcomes(reality_id: &str, s: Option<&str>) -> Vec<Outcome> {
  let Some(s) = s else { return Vec::new() };
  match serde_json::from_str(s) {
    Ok(outcomes) => outcomes,
    Err(e) => {
      tracing::warn!(reality_id, error = %e, "undecodable outcomes column");
      Vec::new()
    }
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `realities` row.
pub struct RawReality {
  pub id:                String,
  pub user_session:      String,
  pub title:             String,
  pub description:       String,
  pub original_event:    String,
  pub outcomes:          Option<String>,
  pub probability_score: f64,
  pub impact_score:      i64,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawReality {
  pub const COLUMNS: &'static str = "id, user_session, title, description, original_event, \
     outcomes, probability_score, impact_score, created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawReality {
      id:                row.get(0)?,
      user_session:      row.get(1)?,
      title:             row.get(2)?,
      description:       row.get(3)?,
      original_event:    row.get(4)?,
      outcomes:          row.get(5)?,
      probability_score: row.get(6)?,
      impact_score:      row.get(7)?,
      created_at:        row.get(8)?,
      updated_at:        row.get(9)?,
    })
  }

  pub fn into_reality(self) -> Result<Reality> {
    let outcomes = decode_outcomes(&self.id, self.outcomes.as_deref());
    Ok(Reality {
      id: decode_uuid(&self.id)?,
      user_session: self.user_session,
      title: self.title,
      description: self.description,
      original_event: self.original_event,
      outcomes,
      probability_score: self.probability_score,
      impact_score: self.impact_score.clamp(0, u8::MAX as i64) as u8,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `reality_trees` row.
pub struct RawTree {
  pub id:           String,
  pub user_session: String,
  pub tree_data:    String,
  pub share_token:  Option<String>,
  pub is_public:    bool,
  pub view_count:   i64,
  pub created_at:   String,
}

impl RawTree {
  pub const COLUMNS: &'static str =
    "id, user_session, tree_data, share_token, is_public, view_count, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawTree {
      id:           row.get(0)?,
      user_session: row.get(1)?,
      tree_data:    row.get(2)?,
      share_token:  row.get(3)?,
      is_public:    row.get(4)?,
      view_count:   row.get(5)?,
      created_at:   row.get(6)?,
    })
  }

  pub fn into_tree(self) -> Result<RealityTree> {
    Ok(RealityTree {
      id:           decode_uuid(&self.id)?,
      user_session: self.user_session,
      tree_data:    serde_json::from_str(&self.tree_data)?,
      share_token:  self.share_token,
      is_public:    self.is_public,
      view_count:   self.view_count.max(0) as u64,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from an `analytics` row.
pub struct RawEvent {
  pub id:           i64,
  pub user_session: String,
  pub event_type:   String,
  pub event_data:   String,
  pub timestamp:    String,
}

impl RawEvent {
  pub const COLUMNS: &'static str = "id, user_session, event_type, event_data, timestamp";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawEvent {
      id:           row.get(0)?,
      user_session: row.get(1)?,
      event_type:   row.get(2)?,
      event_data:   row.get(3)?,
      timestamp:    row.get(4)?,
    })
  }

  pub fn into_event(self) -> Result<AnalyticsEvent> {
    Ok(AnalyticsEvent {
      id:           self.id,
      user_session: self.user_session,
      event_type:   self.event_type,
      event_data:   serde_json::from_str(&self.event_data)?,
      timestamp:    decode_dt(&self.timestamp)?,
    })
  }
}
