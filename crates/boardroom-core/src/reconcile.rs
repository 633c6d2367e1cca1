//! Backfilling change events from the historical director dataset.
//!
//! The historical import predates the announcement scraper. For every
//! historical appointment or resignation that no change event covers, a
//! synthetic event is inserted. The check is re-derived from the store on
//! each run, so running twice inserts nothing the second time.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::{
  Error, Result,
  change::{ChangeEvent, ChangeType, HistoricalDirectorRecord, real_date},
  identity::Identity,
  matcher::{NameKeys, resolve_representative},
  store::RegistryStore,
};

/// Counters for one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
  pub examined:              usize,
  /// Records no identity could be found for.
  pub unresolved:            usize,
  pub appointments_inserted: usize,
  pub resignations_inserted: usize,
  /// Synthetic events whose upsert failed; retried on the next run.
  pub failed:                usize,
}

/// Which events an existing change-event set already covers for one
/// historical record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Coverage {
  appointment: bool,
  resignation: bool,
  affiliation: bool,
}

/// A change event paired with its precomputed name forms.
struct KnownEvent {
  event: ChangeEvent,
  keys:  NameKeys,
}

impl KnownEvent {
  fn new(event: ChangeEvent) -> Self {
    let keys = NameKeys::forms(event.person_title.as_deref(), &event.person_name);
    Self { event, keys }
  }
}

/// Drives reconciliation over one store.
pub struct GapReconciler<'a, S> {
  store: &'a S,
}

impl<'a, S: RegistryStore> GapReconciler<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Reconcile every historical record, one at a time.
  ///
  /// Failing to load the inputs aborts the run with [`Error::Lookup`]. A
  /// failed insert for one record is logged and the run moves on.
  pub async fn run(&self) -> Result<ReconcileReport> {
    let historical = self
      .store
      .fetch_historical_records()
      .await
      .map_err(Error::lookup)?;
    let mut identities = self
      .store
      .fetch_all_identities()
      .await
      .map_err(Error::lookup)?;
    let events = self
      .store
      .fetch_all_change_events()
      .await
      .map_err(Error::lookup)?;

    identities.sort_by_key(|i| i.secondary_id);
    let identity_keys: Vec<(NameKeys, &Identity)> = identities
      .iter()
      .map(|i| (NameKeys::of_identity(i), i))
      .collect();
    let by_id: HashMap<i64, Identity> = identities
      .iter()
      .map(|i| (i.secondary_id, i.clone()))
      .collect();
    let mut known: Vec<KnownEvent> = events.into_iter().map(KnownEvent::new).collect();

    info!(
      historical = historical.len(),
      identities = identities.len(),
      events = known.len(),
      "starting gap reconciliation",
    );

    let mut report = ReconcileReport::default();
    for record in &historical {
      report.examined += 1;

      let record_keys = NameKeys::forms(record.title.as_deref(), &record.director_name);
      let Some((keys, identity)) = identity_keys.iter().find(|(keys, _)| keys.matches(&record_keys))
      else {
        warn!(director = %record.director_name, "no identity found for historical record");
        report.unresolved += 1;
        continue;
      };

      let related = resolve_representative(&by_id, identity.primary_id);
      let coverage = coverage(record, keys, &known);

      for synthetic in synthesize(record, coverage, related) {
        let change_type = synthetic.change_type;
        match self.store.upsert_change_event(synthetic.clone()).await {
          Ok(_) => {
            info!(
              affiliation = record.affiliation_code.as_deref().unwrap_or_default(),
              director = %record.director_name,
              date = ?synthetic.date_of_change,
              %change_type,
              "inserted missing change event",
            );
            match change_type {
              ChangeType::Appointment => report.appointments_inserted += 1,
              _ => report.resignations_inserted += 1,
            }
            known.push(KnownEvent::new(synthetic));
          }
          Err(e) => {
            error!(
              director = %record.director_name,
              %change_type,
              error = %e,
              "failed to insert change event",
            );
            report.failed += 1;
          }
        }
      }
    }

    info!(?report, "gap reconciliation finished");
    Ok(report)
  }
}

/// Check the events naming `identity_keys` against one historical record.
fn coverage(
  record: &HistoricalDirectorRecord,
  identity_keys: &NameKeys,
  known: &[KnownEvent],
) -> Coverage {
  let mut coverage = Coverage::default();

  let same_affiliation = known.iter().filter(|k| {
    k.keys.matches(identity_keys)
      && same_code(&k.event.affiliation_code, &record.affiliation_code)
  });

  for KnownEvent { event, .. } in same_affiliation {
    coverage.affiliation = true;
    let on = |date: Option<NaiveDate>| date.is_some() && event.date_of_change == date;
    if event.change_type.is_departure() {
      coverage.resignation |= on(record.resignation_date);
    } else {
      coverage.appointment |= on(record.appointment_date);
    }
  }

  // A name match under another company covers neither event.
  if !coverage.affiliation {
    coverage.appointment = false;
    coverage.resignation = false;
  }
  coverage
}

fn same_code(a: &Option<String>, b: &Option<String>) -> bool {
  a.as_deref().unwrap_or_default().trim() == b.as_deref().unwrap_or_default().trim()
}

/// The synthetic events still missing for `record`.
fn synthesize(
  record: &HistoricalDirectorRecord,
  coverage: Coverage,
  related: Option<i64>,
) -> Vec<ChangeEvent> {
  let mut missing = Vec::new();

  match real_date(record.appointment_date) {
    Some(date) if !coverage.appointment => {
      let mut event = base_event(record, ChangeType::Appointment, date, related);
      event.designation = record.designation.clone();
      missing.push(event);
    }
    Some(_) => {}
    None => skipped(record, "appointment", record.appointment_date),
  }

  match real_date(record.resignation_date) {
    Some(date) if !coverage.resignation => {
      let mut event = base_event(record, ChangeType::Resignation, date, related);
      event.previous_position = record.designation.clone();
      missing.push(event);
    }
    Some(_) => {}
    None => skipped(record, "resignation", record.resignation_date),
  }

  missing
}

fn skipped(record: &HistoricalDirectorRecord, what: &str, date: Option<NaiveDate>) {
  if date.is_some() {
    debug!(director = %record.director_name, what, "placeholder date, not an event");
  }
}

fn base_event(
  record: &HistoricalDirectorRecord,
  change_type: ChangeType,
  date: NaiveDate,
  related: Option<i64>,
) -> ChangeEvent {
  let mut event = ChangeEvent::new(record.director_name.clone(), change_type);
  event.company_name = record.company_name.clone();
  event.affiliation_code = record.affiliation_code.clone();
  event.person_title = record.title.clone();
  event.person_birth_year = record.birth_year();
  event.gender = record.gender.clone();
  event.nationality = record.nationality.clone();
  event.date_announced = Some(date);
  event.date_of_change = Some(date);
  event.related_identity = related;
  event
}
