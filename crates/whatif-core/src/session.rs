//! Session identifiers.
//!
//! A session is an unauthenticated grouping key. Clients may supply their
//! own; otherwise the server mints one.

use uuid::Uuid;

/// Mint a fresh session id of the form `session_<32 hex chars>`.
pub fn new_session_id() -> String {
  format!("session_{}", Uuid::new_v4().simple())
}

/// Return the trimmed session if it is non-empty, else mint a new one.
pub fn session_or_new(supplied: Option<&str>) -> String {
  match supplied.map(str::trim) {
    Some(s) if !s.is_empty() => s.to_owned(),
    _ => new_session_id(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minted_sessions_are_distinct() {
    let a = new_session_id();
    let b = new_session_id();
    assert!(a.starts_with("session_"));
    assert_eq!(a.len(), "session_".len() + 32);
    assert_ne!(a, b);
  }

  #[test]
  fn supplied_session_is_kept() {
    assert_eq!(session_or_new(Some("  abc ")), "abc");
    assert!(session_or_new(Some("   ")).starts_with("session_"));
    assert!(session_or_new(None).starts_with("session_"));
  }
}
