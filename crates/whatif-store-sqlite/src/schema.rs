//! SQL schema for the whatif SQLite store.
//!
//! Executed once at connection startup. The three tables are independent;
//! there are no foreign keys between them.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Realities are written once and never updated.
-- updated_at mirrors created_at and is kept for forward compatibility.
CREATE TABLE IF NOT EXISTS realities (
    id                TEXT PRIMARY KEY,
    user_session      TEXT NOT NULL,
    title             TEXT NOT NULL,
    description       TEXT NOT NULL,
    original_event    TEXT NOT NULL,
    outcomes          TEXT,            -- JSON array of outcomes
    probability_score REAL NOT NULL,
    impact_score      INTEGER NOT NULL,
    created_at        TEXT NOT NULL,   -- RFC 3339 UTC, fixed micro precision
    updated_at        TEXT NOT NULL
);

-- share_token is non-NULL exactly when is_public = 1.
CREATE TABLE IF NOT EXISTS reality_trees (
    id           TEXT PRIMARY KEY,
    user_session TEXT NOT NULL,
    tree_data    TEXT NOT NULL,        -- opaque client JSON
    share_token  TEXT UNIQUE,
    is_public    INTEGER NOT NULL DEFAULT 0,
    view_count   INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL,
    CHECK ((share_token IS NULL) = (is_public = 0))
);

-- Append-only.
CREATE TABLE IF NOT EXISTS analytics (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    user_session TEXT NOT NULL,
    event_type   TEXT NOT NULL,
    event_data   TEXT NOT NULL DEFAULT '{}',
    timestamp    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS realities_session_idx ON realities(user_session, created_at);
CREATE INDEX IF NOT EXISTS trees_session_idx     ON reality_trees(user_session);
CREATE INDEX IF NOT EXISTS analytics_session_idx ON analytics(user_session);

PRAGMA user_version = 1;
";
