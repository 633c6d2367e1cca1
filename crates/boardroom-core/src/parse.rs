//! Turning field-tagged announcement records into typed candidates.
//!
//! The fetcher hands over each announcement as the ordered `(label, value)`
//! pairs of its detail tables. Extraction from HTML happens upstream.

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  change::{ChangeEvent, ChangeType},
  identity::{Background, NewIdentity},
};

/// One announcement as delivered by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnnouncement {
  /// The portal's announcement id; unique per announcement.
  pub source_id: i64,
  pub fields:    Vec<(String, String)>,
}

/// Everything one announcement says, ready for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnnouncement {
  pub event:      ChangeEvent,
  pub person:     NewIdentity,
  pub company:    Option<NewIdentity>,
  pub background: Background,
}

/// Turns a raw announcement into typed candidates.
pub trait AnnouncementParser {
  fn parse(&self, raw: &RawAnnouncement) -> Result<ParsedAnnouncement>;
}

// ─── Labels ──────────────────────────────────────────────────────────────────

const DATE_ANNOUNCED: &str = "Date Announced";
const DATE_OF_CHANGE: &str = "Date of change";
const TYPE_OF_CHANGE: &str = "Type of change";
const AGE: &str = "Age";
const MAX_AGE: u8 = 150;

const QUALIFICATIONS: &str = "Qualifications";
const WORKING_EXPERIENCE: &str = "Working experience and occupation";
const DIRECTORSHIPS: &str = "Directorships in public companies and listed issuers (if any)";
const DIRECTORSHIPS_OLD: &str = "Directorship of public companies (if any)";
const FAMILY_RELATIONSHIP: &str =
  "Family relationship with any director and/or major shareholder of the listed issuer";
const CONFLICT_OF_INTEREST: &str =
  "Any conflict of interests that he/she has with the listed issuer";
const INTEREST_IN_SECURITIES: &str =
  "Details of any interest in the securities of the listed issuer or its subsidiaries";

const DATE_LAYOUTS: &[&str] = &["%d %b %Y", "%d/%b/%Y", "%d/%m/%Y", "%Y-%m-%d"];

// ─── FieldParser ─────────────────────────────────────────────────────────────

/// Reads the portal's boardroom-change form by label.
///
/// Labels compare case-insensitively after cleaning; the first non-empty
/// value for a label wins. A value of `nil` counts as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldParser;

impl AnnouncementParser for FieldParser {
  fn parse(&self, raw: &RawAnnouncement) -> Result<ParsedAnnouncement> {
    let fields = Fields(&raw.fields);

    let type_text = fields.get(TYPE_OF_CHANGE).ok_or(Error::MissingField(TYPE_OF_CHANGE))?;
    let change_type: ChangeType = type_text
      .parse()
      .map_err(|_| Error::UnknownChangeType(type_text.clone()))?;

    let person_name = fields
      .get("Name")
      .map(|n| n.to_uppercase())
      .ok_or(Error::MissingField("Name"))?;

    let date_of_change = fields.date(DATE_OF_CHANGE)?;
    let date_announced = fields.date(DATE_ANNOUNCED)?.or(date_of_change);

    let mut designation = fields.get("New Position");
    let mut previous_position = fields.get("Previous Position");
    if designation.is_none() {
      let listed = fields.get("Designation");
      if change_type == ChangeType::Appointment {
        designation = listed;
      } else if previous_position.is_none() {
        previous_position = listed;
      }
    }

    let affiliation_code = fields
      .get("Stock Code")
      .or_else(|| fields.get("Stock Name"))
      .map(|c| c.to_uppercase());
    let company_name = fields.get("Company Name").map(|c| c.to_uppercase());

    let birth_year = match (fields.age()?, date_announced) {
      (Some(age), Some(announced)) => announced.year().checked_sub(age),
      _ => None,
    };
    let gender = fields
      .get("Gender")
      .and_then(|g| g.chars().next())
      .map(|c| c.to_uppercase().collect::<String>());
    let nationality = fields.get("Nationality").map(|n| n.to_uppercase());

    let event = ChangeEvent {
      source_id: Some(raw.source_id),
      company_name: company_name.clone(),
      affiliation_code: affiliation_code.clone(),
      person_name: person_name.clone(),
      person_title: None,
      person_birth_year: birth_year,
      gender: gender.clone(),
      nationality: nationality.clone(),
      date_announced,
      date_of_change,
      designation,
      previous_position,
      remarks: fields.get("Remarks"),
      directorate: fields.get("Directorate"),
      change_type,
      related_identity: None,
    };

    let mut person = NewIdentity::person(person_name);
    person.affiliation_code = affiliation_code.clone();
    person.birth_year = birth_year;
    person.gender = gender;
    person.nationality = nationality;

    let company = company_name.map(|name| {
      let mut company = NewIdentity::company(name);
      company.affiliation_code = affiliation_code;
      company
    });

    let background = Background {
      qualification:          fields.get(QUALIFICATIONS),
      working_experience:     fields.get(WORKING_EXPERIENCE),
      directorships:          fields.get(DIRECTORSHIPS).or_else(|| fields.get(DIRECTORSHIPS_OLD)),
      family_relationship:    fields.get(FAMILY_RELATIONSHIP),
      conflict_of_interest:   fields.get(CONFLICT_OF_INTEREST),
      interest_in_securities: fields.get(INTEREST_IN_SECURITIES),
    };

    Ok(ParsedAnnouncement { event, person, company, background })
  }
}

// ─── Field lookup ────────────────────────────────────────────────────────────

struct Fields<'a>(&'a [(String, String)]);

impl Fields<'_> {
  fn get(&self, label: &str) -> Option<String> {
    self
      .0
      .iter()
      .filter(|(l, _)| clean(l).eq_ignore_ascii_case(label))
      .map(|(_, v)| clean(v))
      .find(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nil"))
  }

  fn date(&self, label: &'static str) -> Result<Option<NaiveDate>> {
    self
      .get(label)
      .map(|value| parse_date(&value).ok_or(Error::InvalidDate { label, value }))
      .transpose()
  }

  /// Age in whole years, at most [`MAX_AGE`].
  fn age(&self) -> Result<Option<i32>> {
    self
      .get(AGE)
      .map(|value| match value.parse::<u8>() {
        Ok(age) if age <= MAX_AGE => Ok(i32::from(age)),
        _ => Err(Error::InvalidNumber { label: AGE, value }),
      })
      .transpose()
  }
}

/// Strip colons, turn non-breaking spaces into spaces and trim.
fn clean(s: &str) -> String {
  s.replace(':', "").replace('\u{a0}', " ").trim().to_owned()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
  DATE_LAYOUTS
    .iter()
    .find_map(|layout| NaiveDate::parse_from_str(s, layout).ok())
}
