//! The `RegistryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `boardroom-store-sqlite`). The matching, merging and reconciliation code
//! in this crate depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  change::{ChangeEvent, HistoricalDirectorRecord},
  identity::{Background, Identity, IdentityKind, NewIdentity},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`RegistryStore::find_identities`] and
/// [`RegistryStore::update_primary_id`].
///
/// A row matches when its kind equals `kind` and any of
/// `canonical_name == canonical_name`, `display_name == display_name` or
/// `alias_name == display_name` holds. When `birth_year` is set the row's
/// birth year must also equal it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityQuery {
  pub kind:           IdentityKind,
  pub canonical_name: String,
  pub display_name:   String,
  pub birth_year:     Option<i32>,
}

impl IdentityQuery {
  /// Match on name and birth year.
  pub fn with_birth_year(
    kind: IdentityKind,
    canonical_name: impl Into<String>,
    display_name: impl Into<String>,
    birth_year: i32,
  ) -> Self {
    Self {
      kind,
      canonical_name: canonical_name.into(),
      display_name: display_name.into(),
      birth_year: Some(birth_year),
    }
  }

  /// Match on name alone.
  ///
  /// Legacy records carry no birth year. This widens the match set: two
  /// different people with the same name fall into one group.
  pub fn name_only(
    kind: IdentityKind,
    canonical_name: impl Into<String>,
    display_name: impl Into<String>,
  ) -> Self {
    Self {
      kind,
      canonical_name: canonical_name.into(),
      display_name: display_name.into(),
      birth_year: None,
    }
  }

  /// Whether `identity` satisfies this query.
  pub fn matches(&self, identity: &Identity) -> bool {
    let name_hit = identity.canonical_name == self.canonical_name
      || identity.display_name == self.display_name
      || identity.alias_name.as_deref() == Some(self.display_name.as_str());

    identity.kind == self.kind
      && name_hit
      && self.birth_year.is_none_or(|y| identity.birth_year == Some(y))
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a registry backend.
///
/// Every method is a single atomic statement against the backend. Upserts
/// rely on insert-or-update by unique key rather than read-then-write, so
/// each call is safe to retry.
pub trait RegistryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identities ────────────────────────────────────────────────────────

  /// All identity rows matching `query`, oldest (`secondary_id`) first.
  fn find_identities<'a>(
    &'a self,
    query: &'a IdentityQuery,
  ) -> impl Future<Output = Result<Vec<Identity>, Self::Error>> + Send + 'a;

  /// Persist a new identity row and return it with its assigned
  /// `secondary_id`. `primary_id` starts unset.
  fn insert_identity(
    &self,
    identity: NewIdentity,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  /// Point every row matching `query` at `primary_id`. Returns the number
  /// of rows updated.
  fn update_primary_id<'a>(
    &'a self,
    query: &'a IdentityQuery,
    primary_id: i64,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Every identity row, oldest first.
  fn fetch_all_identities(
    &self,
  ) -> impl Future<Output = Result<Vec<Identity>, Self::Error>> + Send + '_;

  // ── Backgrounds ───────────────────────────────────────────────────────

  /// Merge `background` into the row keyed by `primary_id`, creating it if
  /// needed. Fields that are `None` keep their stored value.
  fn upsert_background(
    &self,
    primary_id: i64,
    background: Background,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_background(
    &self,
    primary_id: i64,
  ) -> impl Future<Output = Result<Option<Background>, Self::Error>> + Send + '_;

  // ── Change events ─────────────────────────────────────────────────────

  /// Insert or update a change event and return its row id.
  ///
  /// Events with a `source_id` replace the existing row for that source;
  /// events without one are always inserted.
  fn upsert_change_event(
    &self,
    event: ChangeEvent,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  fn fetch_all_change_events(
    &self,
  ) -> impl Future<Output = Result<Vec<ChangeEvent>, Self::Error>> + Send + '_;

  // ── Historical import ─────────────────────────────────────────────────

  fn fetch_historical_records(
    &self,
  ) -> impl Future<Output = Result<Vec<HistoricalDirectorRecord>, Self::Error>>
  + Send
  + '_;
}
