//! Identity rows and the biography attached to them.
//!
//! The same person may own several identity rows, one per affiliation. Rows
//! that denote the same person point at one representative row through
//! `primary_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Whether an identity row describes a person or a listed company.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IdentityKind {
  Person,
  Company,
}

/// A persisted identity row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  /// Assigned by the store at creation; never reused.
  pub secondary_id:     i64,
  /// The representative row's `secondary_id`, or `None` if never merged.
  pub primary_id:       Option<i64>,
  pub kind:             IdentityKind,
  /// The name as scraped, honorifics included.
  pub display_name:     String,
  /// Title-stripped, normalized name.
  pub canonical_name:   String,
  pub alias_name:       Option<String>,
  pub salutation:       Option<String>,
  /// Stock or company code of the affiliation this row represents.
  pub affiliation_code: Option<String>,
  pub birth_year:       Option<i32>,
  pub gender:           Option<String>,
  pub nationality:      Option<String>,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

impl Identity {
  /// All the names this row answers to.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    [
      Some(self.canonical_name.as_str()),
      Some(self.display_name.as_str()),
      self.alias_name.as_deref(),
    ]
    .into_iter()
    .flatten()
  }
}

/// Input to [`crate::store::RegistryStore::insert_identity`].
/// Ids and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIdentity {
  pub kind:             IdentityKind,
  pub display_name:     String,
  pub canonical_name:   String,
  pub alias_name:       Option<String>,
  pub salutation:       Option<String>,
  pub affiliation_code: Option<String>,
  pub birth_year:       Option<i32>,
  pub gender:           Option<String>,
  pub nationality:      Option<String>,
}

impl NewIdentity {
  /// A person candidate with every optional field unset.
  pub fn person(display_name: impl Into<String>) -> Self {
    Self::new(IdentityKind::Person, display_name)
  }

  /// A company candidate with every optional field unset.
  pub fn company(display_name: impl Into<String>) -> Self {
    Self::new(IdentityKind::Company, display_name)
  }

  fn new(kind: IdentityKind, display_name: impl Into<String>) -> Self {
    let display_name = display_name.into();
    Self {
      kind,
      canonical_name: display_name.clone(),
      display_name,
      alias_name: None,
      salutation: None,
      affiliation_code: None,
      birth_year: None,
      gender: None,
      nationality: None,
    }
  }
}

/// Free-text biography fields, keyed by permanent id.
///
/// Stores merge these per field: `Some` overwrites, `None` leaves the stored
/// value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
  pub qualification:          Option<String>,
  pub working_experience:     Option<String>,
  pub directorships:          Option<String>,
  pub family_relationship:    Option<String>,
  pub conflict_of_interest:   Option<String>,
  pub interest_in_securities: Option<String>,
}

impl Background {
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Overlay `newer` onto `self`, field by field.
  pub fn merge(&mut self, newer: Background) {
    fn take(slot: &mut Option<String>, value: Option<String>) {
      if value.is_some() {
        *slot = value;
      }
    }
    take(&mut self.qualification, newer.qualification);
    take(&mut self.working_experience, newer.working_experience);
    take(&mut self.directorships, newer.directorships);
    take(&mut self.family_relationship, newer.family_relationship);
    take(&mut self.conflict_of_interest, newer.conflict_of_interest);
    take(&mut self.interest_in_securities, newer.interest_in_securities);
  }
}
