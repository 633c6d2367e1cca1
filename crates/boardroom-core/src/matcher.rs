//! Locating the identity rows a name belongs to.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
  Error, Result,
  identity::Identity,
  name::{normalize, titled},
  store::{IdentityQuery, RegistryStore},
};

/// Identity rows matching `query`, oldest first.
///
/// The first element is the group's representative. Results are re-sorted
/// by `secondary_id` so the choice does not depend on backend ordering.
pub async fn find_matches<S: RegistryStore>(
  store: &S,
  query: &IdentityQuery,
) -> Result<Vec<Identity>> {
  if query.birth_year.is_none() {
    debug!(name = %query.canonical_name, "matching on name alone");
  }

  let mut matches = store.find_identities(query).await.map_err(Error::lookup)?;
  matches.sort_by_key(|i| i.secondary_id);
  Ok(matches)
}

// ─── Structural name test ────────────────────────────────────────────────────

/// The normalized names a record answers to.
///
/// A record with a title is tested both as its bare name and as
/// `title + " " + name`; an identity answers to its canonical, display and
/// alias names. Two sets match when they share any element.
#[derive(Debug, Clone, Default)]
pub struct NameKeys(HashSet<String>);

impl NameKeys {
  /// The two forms of a titled name.
  pub fn forms(title: Option<&str>, name: &str) -> Self {
    Self::from_names([name.to_owned(), titled(title, name)])
  }

  /// Every name an identity row answers to.
  pub fn of_identity(identity: &Identity) -> Self {
    Self::from_names(identity.names().map(str::to_owned))
  }

  fn from_names(names: impl IntoIterator<Item = String>) -> Self {
    Self(
      names
        .into_iter()
        .map(|n| normalize(&n))
        .filter(|n| !n.is_empty())
        .collect(),
    )
  }

  pub fn matches(&self, other: &NameKeys) -> bool {
    !self.0.is_disjoint(&other.0)
  }
}

// ─── Representative resolution ───────────────────────────────────────────────

/// Follow `primary_id` pointers from `start` until they stop moving.
///
/// Merges across passes can leave chains (a row pointing at a row that
/// points elsewhere). The walk ends at a row pointing at itself, a row with
/// no pointer, a row whose pointer names an id missing from `identities`,
/// or the first repeated id. The result is always a row of `identities`;
/// a `start` that is not one yields `None`.
pub fn resolve_representative(
  identities: &HashMap<i64, Identity>,
  start: Option<i64>,
) -> Option<i64> {
  let mut current = start.filter(|id| identities.contains_key(id))?;
  let mut seen = HashSet::from([current]);

  while let Some(next) = identities.get(&current).and_then(|row| row.primary_id) {
    if !identities.contains_key(&next) || !seen.insert(next) {
      break;
    }
    current = next;
  }
  Some(current)
}
