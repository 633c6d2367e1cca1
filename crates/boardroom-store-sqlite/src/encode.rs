//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`, and enums as their display strings.

use boardroom_core::{
  change::{ChangeEvent, ChangeType, HistoricalDirectorRecord},
  identity::{Identity, IdentityKind},
};
use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: Option<NaiveDate>) -> Option<String> {
  d.map(|d| d.format(DATE_FORMAT).to_string())
}

pub fn decode_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.map(|s| {
    NaiveDate::parse_from_str(&s, DATE_FORMAT)
      .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
  })
  .transpose()
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_kind(s: &str) -> Result<IdentityKind> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown identity kind: {s:?}")))
}

pub fn decode_change_type(s: &str) -> Result<ChangeType> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown change type: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawIdentity::from_row`].
pub const IDENTITY_COLUMNS: &str = "secondary_id, primary_id, kind, display_name, canonical_name,
  alias_name, salutation, affiliation_code, birth_year, gender, nationality,
  created_at, updated_at";

/// Values read directly from an `identities` row.
pub struct RawIdentity {
  pub secondary_id:     i64,
  pub primary_id:       Option<i64>,
  pub kind:             String,
  pub display_name:     String,
  pub canonical_name:   String,
  pub alias_name:       Option<String>,
  pub salutation:       Option<String>,
  pub affiliation_code: Option<String>,
  pub birth_year:       Option<i32>,
  pub gender:           Option<String>,
  pub nationality:      Option<String>,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawIdentity {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      secondary_id:     row.get(0)?,
      primary_id:       row.get(1)?,
      kind:             row.get(2)?,
      display_name:     row.get(3)?,
      canonical_name:   row.get(4)?,
      alias_name:       row.get(5)?,
      salutation:       row.get(6)?,
      affiliation_code: row.get(7)?,
      birth_year:       row.get(8)?,
      gender:           row.get(9)?,
      nationality:      row.get(10)?,
      created_at:       row.get(11)?,
      updated_at:       row.get(12)?,
    })
  }

  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      secondary_id:     self.secondary_id,
      primary_id:       self.primary_id,
      kind:             decode_kind(&self.kind)?,
      display_name:     self.display_name,
      canonical_name:   self.canonical_name,
      alias_name:       self.alias_name,
      salutation:       self.salutation,
      affiliation_code: self.affiliation_code,
      birth_year:       self.birth_year,
      gender:           self.gender,
      nationality:      self.nationality,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawChangeEvent::from_row`].
pub const EVENT_COLUMNS: &str = "source_id, company_name, affiliation_code, person_name,
  person_title, person_birth_year, gender, nationality, date_announced,
  date_of_change, designation, previous_position, remarks, directorate,
  change_type, related_identity";

/// Values read directly from a `change_events` row.
pub struct RawChangeEvent {
  pub source_id:         Option<i64>,
  pub company_name:      Option<String>,
  pub affiliation_code:  Option<String>,
  pub person_name:       String,
  pub person_title:      Option<String>,
  pub person_birth_year: Option<i32>,
  pub gender:            Option<String>,
  pub nationality:       Option<String>,
  pub date_announced:    Option<String>,
  pub date_of_change:    Option<String>,
  pub designation:       Option<String>,
  pub previous_position: Option<String>,
  pub remarks:           Option<String>,
  pub directorate:       Option<String>,
  pub change_type:       String,
  pub related_identity:  Option<i64>,
}

impl RawChangeEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      source_id:         row.get(0)?,
      company_name:      row.get(1)?,
      affiliation_code:  row.get(2)?,
      person_name:       row.get(3)?,
      person_title:      row.get(4)?,
      person_birth_year: row.get(5)?,
      gender:            row.get(6)?,
      nationality:       row.get(7)?,
      date_announced:    row.get(8)?,
      date_of_change:    row.get(9)?,
      designation:       row.get(10)?,
      previous_position: row.get(11)?,
      remarks:           row.get(12)?,
      directorate:       row.get(13)?,
      change_type:       row.get(14)?,
      related_identity:  row.get(15)?,
    })
  }

  pub fn into_event(self) -> Result<ChangeEvent> {
    Ok(ChangeEvent {
      source_id:         self.source_id,
      company_name:      self.company_name,
      affiliation_code:  self.affiliation_code,
      person_name:       self.person_name,
      person_title:      self.person_title,
      person_birth_year: self.person_birth_year,
      gender:            self.gender,
      nationality:       self.nationality,
      date_announced:    decode_date(self.date_announced)?,
      date_of_change:    decode_date(self.date_of_change)?,
      designation:       self.designation,
      previous_position: self.previous_position,
      remarks:           self.remarks,
      directorate:       self.directorate,
      change_type:       decode_change_type(&self.change_type)?,
      related_identity:  self.related_identity,
    })
  }
}

/// Values read directly from a `historical_directors` row.
pub struct RawHistorical {
  pub affiliation_code: Option<String>,
  pub company_name:     Option<String>,
  pub title:            Option<String>,
  pub director_name:    String,
  pub appointment_date: Option<String>,
  pub resignation_date: Option<String>,
  pub designation:      Option<String>,
  pub birth_date:       Option<String>,
  pub gender:           Option<String>,
  pub nationality:      Option<String>,
}

impl RawHistorical {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      affiliation_code: row.get(0)?,
      company_name:     row.get(1)?,
      title:            row.get(2)?,
      director_name:    row.get(3)?,
      appointment_date: row.get(4)?,
      resignation_date: row.get(5)?,
      designation:      row.get(6)?,
      birth_date:       row.get(7)?,
      gender:           row.get(8)?,
      nationality:      row.get(9)?,
    })
  }

  pub fn into_record(self) -> Result<HistoricalDirectorRecord> {
    Ok(HistoricalDirectorRecord {
      affiliation_code: self.affiliation_code,
      company_name:     self.company_name,
      title:            self.title,
      director_name:    self.director_name,
      appointment_date: decode_date(self.appointment_date)?,
      resignation_date: decode_date(self.resignation_date)?,
      designation:      self.designation,
      birth_date:       decode_date(self.birth_date)?,
      gender:           self.gender,
      nationality:      self.nationality,
    })
  }
}
