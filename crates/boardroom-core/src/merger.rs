//! Assigning permanent ids and merging identity groups.
//!
//! The merge is a flat representative-pointer scheme: the oldest matching
//! row is the representative and every matching row is pointed at it. A row
//! inserted for a new affiliation joins the group on the next resolution
//! that matches it, not immediately.

use tracing::{debug, info};

use crate::{
  Error, Result,
  identity::{Background, Identity, NewIdentity},
  store::{IdentityQuery, RegistryStore},
};

/// Outcome of [`resolve_identity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityResolution {
  /// The `secondary_id` of the group's representative.
  pub permanent_id: i64,
  /// The row inserted for the candidate, if one was.
  pub inserted:     Option<Identity>,
}

/// Assign a permanent id to `candidate` given the rows `query` matched.
///
/// - With matches, the first match's `secondary_id` is the permanent id and
///   every row matching `query` is pointed at it. The candidate is inserted
///   only when no match already covers its affiliation.
/// - Without matches, the candidate is inserted and becomes its own
///   representative.
///
/// When `background` is given it is merged for the permanent id whether or
/// not a row was inserted. Store failures propagate unchanged.
pub async fn resolve_identity<S: RegistryStore>(
  store: &S,
  query: &IdentityQuery,
  candidate: NewIdentity,
  matches: &[Identity],
  background: Option<&Background>,
) -> Result<IdentityResolution> {
  let resolution = match matches.first() {
    Some(representative) => {
      let permanent_id = representative.secondary_id;
      let updated = store
        .update_primary_id(query, permanent_id)
        .await
        .map_err(Error::write)?;
      debug!(permanent_id, updated, "pointed group at representative");

      let affiliation_known = matches
        .iter()
        .any(|m| m.affiliation_code == candidate.affiliation_code);

      let inserted = if affiliation_known {
        None
      } else {
        let row = store.insert_identity(candidate).await.map_err(Error::write)?;
        info!(
          permanent_id,
          secondary_id = row.secondary_id,
          affiliation = row.affiliation_code.as_deref().unwrap_or_default(),
          "added affiliation to existing identity",
        );
        Some(row)
      };

      IdentityResolution { permanent_id, inserted }
    }
    None => {
      let row = store.insert_identity(candidate).await.map_err(Error::write)?;
      info!(
        secondary_id = row.secondary_id,
        name = %row.canonical_name,
        "inserted new identity",
      );
      IdentityResolution { permanent_id: row.secondary_id, inserted: Some(row) }
    }
  };

  if let Some(background) = background {
    merge_background(store, resolution.permanent_id, background).await?;
  }

  Ok(resolution)
}

/// Merge biography fields into the background keyed by `permanent_id`.
pub async fn merge_background<S: RegistryStore>(
  store: &S,
  permanent_id: i64,
  background: &Background,
) -> Result<()> {
  store
    .upsert_background(permanent_id, background.clone())
    .await
    .map_err(Error::write)
}
