//! Error type for `whatif-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Every freshly minted share token collided with an existing one.
  #[error("could not mint a unique share token after {0} attempts")]
  ShareTokenExhausted(u32),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
