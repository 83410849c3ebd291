//! [`SqliteStore`], the SQLite implementation of [`RealityStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use whatif_core::{
  analytics::{AnalyticsEvent, NewEvent, SessionStats},
  reality::{NewReality, Reality},
  store::RealityStore,
  tree::{NewTree, RealityTree},
};

use crate::{
  Error, Result,
  encode::{RawEvent, RawReality, RawTree, encode_dt, encode_outcomes, encode_uuid, now},
  schema::SCHEMA,
};

/// How many fresh tokens to try before giving up on a public save.
const SHARE_TOKEN_ATTEMPTS: u32 = 3;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A whatif store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Overwrite a reality's raw `outcomes` column. Test-only hook for
  /// exercising the lenient decode path.
  #[cfg(test)]
  pub(crate) async fn corrupt_outcomes(&self, id: Uuid, raw: Option<&str>) -> Result<()> {
    let id_str = encode_uuid(id);
    let raw = raw.map(str::to_owned);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE realities SET outcomes = ?2 WHERE id = ?1",
          rusqlite::params![id_str, raw],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a tree, drawing share tokens from `mint` until one is unique.
  pub(crate) async fn save_tree_minting<F>(
    &self,
    input: NewTree,
    mut mint: F,
  ) -> Result<RealityTree>
  where
    F: FnMut() -> String + Send + 'static,
  {
    let id           = Uuid::new_v4();
    let created_at   = now();
    let id_str       = encode_uuid(id);
    let session      = input.user_session.clone();
    let tree_json    = serde_json::to_string(&input.tree_data)?;
    let at_str       = encode_dt(created_at);
    let make_public  = input.make_public;

    let share_token: Option<Option<String>> = self
      .conn
      .call(move |conn| {
        for _ in 0..SHARE_TOKEN_ATTEMPTS {
          let token = make_public.then(&mut mint);
          let inserted = conn.execute(
            "INSERT INTO reality_trees (
               id, user_session, tree_data, share_token, is_public, view_count, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
            rusqlite::params![id_str, session, tree_json, token, make_public, at_str],
          );
          match inserted {
            Ok(_) => return Ok(Some(token)),
            // Only a token can collide; a private insert has nothing to retry.
            Err(e) if make_public && is_constraint_violation(&e) => {
              tracing::debug!("share token collided, retrying");
              continue;
            }
            Err(e) => return Err(e.into()),
          }
        }
        Ok(None)
      })
      .await?;

    let share_token = share_token.ok_or(Error::ShareTokenExhausted(SHARE_TOKEN_ATTEMPTS))?;

    Ok(RealityTree {
      id,
      user_session: input.user_session,
      tree_data: input.tree_data,
      is_public: share_token.is_some(),
      share_token,
      view_count: 0,
      created_at,
    })
  }

  /// Fetch one tree by id regardless of visibility, without counting a view.
  pub async fn get_tree(&self, id: Uuid) -> Result<Option<RealityTree>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawTree> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM reality_trees WHERE id = ?1", RawTree::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawTree::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawTree::into_tree).transpose()
  }

  /// Every analytics event recorded for `session`, oldest first.
  pub async fn events_for_session(&self, session: &str) -> Result<Vec<AnalyticsEvent>> {
    let session = session.to_owned();
    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM analytics WHERE user_session = ?1 ORDER BY id",
          RawEvent::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![session], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawEvent::into_event).collect()
  }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation)
}

// ─── RealityStore impl ───────────────────────────────────────────────────────

impl RealityStore for SqliteStore {
  type Error = Error;

  // ── Realities ─────────────────────────────────────────────────────────────

  async fn insert_reality(&self, input: NewReality) -> Result<Reality> {
    let created_at = now();
    let draft = input.draft;
    let reality = Reality {
      id:                Uuid::new_v4(),
      user_session:      input.user_session,
      title:             draft.title,
      description:       draft.description,
      original_event:    input.original_event,
      outcomes:          draft.outcomes,
      probability_score: draft.probability,
      impact_score:      draft.impact,
      created_at,
      updated_at:        created_at,
    };

    let id_str         = encode_uuid(reality.id);
    let session        = reality.user_session.clone();
    let title          = reality.title.clone();
    let description    = reality.description.clone();
    let original_event = reality.original_event.clone();
    let outcomes_json  = encode_outcomes(&reality.outcomes)?;
    let probability    = reality.probability_score;
    let impact         = i64::from(reality.impact_score);
    let at_str         = encode_dt(created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO realities (
             id, user_session, title, description, original_event,
             outcomes, probability_score, impact_score, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
          rusqlite::params![
            id_str,
            session,
            title,
            description,
            original_event,
            outcomes_json,
            probability,
            impact,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(reality)
  }

  async fn list_realities(&self, session: &str, limit: u32, offset: u32) -> Result<Vec<Reality>> {
    let session = session.to_owned();

    let raws: Vec<RawReality> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM realities
           WHERE user_session = ?1
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?2 OFFSET ?3",
          RawReality::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![session, limit, offset], RawReality::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReality::into_reality).collect()
  }

  // ── Trees ─────────────────────────────────────────────────────────────────

  async fn save_tree(&self, input: NewTree) -> Result<RealityTree> {
    self
      .save_tree_minting(input, || Uuid::new_v4().simple().to_string())
      .await
  }

  async fn view_shared_tree(&self, share_token: &str) -> Result<Option<RealityTree>> {
    let token = share_token.to_owned();

    // Increment and read back in one statement so concurrent viewers each
    // observe their own post-increment count.
    let raw: Option<RawTree> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "UPDATE reality_trees
           SET view_count = view_count + 1
           WHERE share_token = ?1 AND is_public = 1
           RETURNING {}",
          RawTree::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![token], RawTree::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTree::into_tree).transpose()
  }

  // ── Analytics ─────────────────────────────────────────────────────────────

  async fn record_event(&self, input: NewEvent) -> Result<AnalyticsEvent> {
    let timestamp  = now();
    let session    = input.user_session.clone();
    let event_type = input.event_type.clone();
    let data_json  = serde_json::to_string(&input.event_data)?;
    let at_str     = encode_dt(timestamp);

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO analytics (user_session, event_type, event_data, timestamp)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![session, event_type, data_json, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(AnalyticsEvent {
      id,
      user_session: input.user_session,
      event_type: input.event_type,
      event_data: input.event_data,
      timestamp,
    })
  }

  // ── Stats ─────────────────────────────────────────────────────────────────

  async fn session_stats(&self, session: &str) -> Result<SessionStats> {
    let session = session.to_owned();

    let (realities, trees, interactions): (i64, i64, i64) = self
      .conn
      .call(move |conn| {
        let count = |table: &str| -> rusqlite::Result<i64> {
          conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE user_session = ?1"),
            rusqlite::params![session],
            |r| r.get(0),
          )
        };
        Ok((count("realities")?, count("reality_trees")?, count("analytics")?))
      })
      .await?;

    Ok(SessionStats {
      realities:    realities as u64,
      trees:        trees as u64,
      interactions: interactions as u64,
    })
  }
}
