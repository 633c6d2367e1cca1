//! Boardroom change events and the historical director dataset.

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ─── Sentinel ────────────────────────────────────────────────────────────────

/// The historical dataset writes 1900-01-01 where an event does not apply.
pub const SENTINEL_YMD: (i32, u32, u32) = (1900, 1, 1);

/// Whether `date` is the "no such event" placeholder.
pub fn is_sentinel(date: NaiveDate) -> bool {
  (date.year(), date.month(), date.day()) == SENTINEL_YMD
}

/// `date` with the placeholder filtered out.
pub fn real_date(date: Option<NaiveDate>) -> Option<NaiveDate> {
  date.filter(|d| !is_sentinel(*d))
}

// ─── Change type ─────────────────────────────────────────────────────────────

/// The portal's "Type of change" field. Display strings match the portal.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ChangeType {
  Appointment,
  Resignation,
  Retirement,
  #[serde(rename = "Cessation of Office")]
  #[strum(serialize = "Cessation of Office")]
  CessationOfOffice,
  #[serde(rename = "Vacation Of Office")]
  #[strum(serialize = "Vacation Of Office")]
  VacationOfOffice,
  Others,
}

impl ChangeType {
  /// Every type that ends a directorship.
  pub fn is_departure(self) -> bool { !matches!(self, Self::Appointment) }
}

// ─── ChangeEvent ─────────────────────────────────────────────────────────────

/// One boardroom change. Events parsed from an announcement carry its
/// `source_id`; events synthesized by reconciliation carry none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
  pub source_id:         Option<i64>,
  pub company_name:      Option<String>,
  pub affiliation_code:  Option<String>,
  pub person_name:       String,
  pub person_title:      Option<String>,
  pub person_birth_year: Option<i32>,
  pub gender:            Option<String>,
  pub nationality:       Option<String>,
  pub date_announced:    Option<NaiveDate>,
  pub date_of_change:    Option<NaiveDate>,
  pub designation:       Option<String>,
  pub previous_position: Option<String>,
  pub remarks:           Option<String>,
  pub directorate:       Option<String>,
  pub change_type:       ChangeType,
  /// Permanent id of the person this change concerns.
  pub related_identity:  Option<i64>,
}

impl ChangeEvent {
  /// Convenience constructor with all optional fields unset.
  pub fn new(person_name: impl Into<String>, change_type: ChangeType) -> Self {
    Self {
      source_id: None,
      company_name: None,
      affiliation_code: None,
      person_name: person_name.into(),
      person_title: None,
      person_birth_year: None,
      gender: None,
      nationality: None,
      date_announced: None,
      date_of_change: None,
      designation: None,
      previous_position: None,
      remarks: None,
      directorate: None,
      change_type,
      related_identity: None,
    }
  }
}

// ─── Historical import ───────────────────────────────────────────────────────

/// A row of the historical director dataset. Read-only.
///
/// `appointment_date` and `resignation_date` may hold the sentinel
/// (see [`is_sentinel`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalDirectorRecord {
  pub affiliation_code: Option<String>,
  pub company_name:     Option<String>,
  pub title:            Option<String>,
  pub director_name:    String,
  pub appointment_date: Option<NaiveDate>,
  pub resignation_date: Option<NaiveDate>,
  pub designation:      Option<String>,
  pub birth_date:       Option<NaiveDate>,
  pub gender:           Option<String>,
  pub nationality:      Option<String>,
}

impl HistoricalDirectorRecord {
  pub fn birth_year(&self) -> Option<i32> {
    real_date(self.birth_date).map(|d| d.year())
  }
}
