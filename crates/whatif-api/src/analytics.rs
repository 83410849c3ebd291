//! Best-effort analytics sink.
//!
//! A failed write is logged and dropped. The action that triggered the
//! event has already succeeded and must not be affected.

use serde_json::Value;
use whatif_core::{analytics::NewEvent, store::RealityStore};

/// Append an analytics event, swallowing any store error.
pub async fn record<S>(store: &S, session: &str, event_type: &str, event_data: Value)
where
  S: RealityStore,
{
  let input = NewEvent {
    user_session: session.to_owned(),
    event_type: event_type.to_owned(),
    event_data,
  };
  if let Err(e) = store.record_event(input).await {
    tracing::warn!(session, event_type, error = %e, "dropping analytics event");
  }
}
