//! Error types for `whatif-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("template pool {0:?} is empty")]
  EmptyPool(&'static str),

  #[error("description template {0:?} lacks the {{event}} placeholder")]
  MissingPlaceholder(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
