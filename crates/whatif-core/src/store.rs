//! The `RealityStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `whatif-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.
//! The three tables behind it are independent: no method touches more than
//! one of them in a single write.

use std::future::Future;

use crate::{
  analytics::{AnalyticsEvent, NewEvent, SessionStats},
  reality::{NewReality, Reality},
  tree::{NewTree, RealityTree},
};

/// Abstraction over a whatif store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RealityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Realities ─────────────────────────────────────────────────────────

  /// Persist a generated reality. The store assigns its id and timestamps.
  fn insert_reality(
    &self,
    input: NewReality,
  ) -> impl Future<Output = Result<Reality, Self::Error>> + Send + '_;

  /// Up to `limit` realities for `session`, newest first, skipping `offset`.
  ///
  /// A row whose outcomes cannot be decoded is returned with an empty
  /// `outcomes` list rather than failing the whole read.
  fn list_realities<'a>(
    &'a self,
    session: &'a str,
    limit: u32,
    offset: u32,
  ) -> impl Future<Output = Result<Vec<Reality>, Self::Error>> + Send + 'a;

  // ── Trees ─────────────────────────────────────────────────────────────

  /// Persist a tree, minting a unique share token if `make_public` is set.
  fn save_tree(
    &self,
    input: NewTree,
  ) -> impl Future<Output = Result<RealityTree, Self::Error>> + Send + '_;

  /// Resolve a share token to its public tree, incrementing the view count.
  ///
  /// Returns `None` for unknown tokens and for trees that are not public.
  /// The returned tree carries the post-increment count.
  fn view_shared_tree<'a>(
    &'a self,
    share_token: &'a str,
  ) -> impl Future<Output = Result<Option<RealityTree>, Self::Error>> + Send + 'a;

  // ── Analytics ─────────────────────────────────────────────────────────

  /// Append an analytics event.
  fn record_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<AnalyticsEvent, Self::Error>> + Send + '_;

  // ── Stats ─────────────────────────────────────────────────────────────

  /// Count realities, trees and analytics events recorded for `session`.
  fn session_stats<'a>(
    &'a self,
    session: &'a str,
  ) -> impl Future<Output = Result<SessionStats, Self::Error>> + Send + 'a;
}
