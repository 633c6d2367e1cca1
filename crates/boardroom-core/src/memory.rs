//! In-memory [`RegistryStore`] for unit tests.

use std::sync::{
  Mutex,
  atomic::{AtomicBool, Ordering},
};

use chrono::Utc;
use thiserror::Error;

use crate::{
  change::{ChangeEvent, HistoricalDirectorRecord},
  identity::{Background, Identity, NewIdentity},
  store::{IdentityQuery, RegistryStore},
};

#[derive(Debug, Error)]
#[error("injected failure: {0}")]
pub struct MemoryError(&'static str);

#[derive(Default)]
struct Tables {
  identities:  Vec<Identity>,
  backgrounds: Vec<(i64, Background)>,
  events:      Vec<ChangeEvent>,
  historical:  Vec<HistoricalDirectorRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
  tables:            Mutex<Tables>,
  reverse_order:     AtomicBool,
  fail_event_writes: AtomicBool,
}

impl MemoryStore {
  /// Return `find_identities` results newest first, as a careless backend
  /// might.
  pub fn reverse_order(&self, on: bool) {
    self.reverse_order.store(on, Ordering::SeqCst);
  }

  pub fn fail_event_writes(&self, on: bool) {
    self.fail_event_writes.store(on, Ordering::SeqCst);
  }

  pub fn add_historical(&self, record: HistoricalDirectorRecord) {
    self.lock().historical.push(record);
  }

  pub fn add_identity(&self, identity: Identity) {
    self.lock().identities.push(identity);
  }

  pub fn identities(&self) -> Vec<Identity> { self.lock().identities.clone() }

  pub fn events(&self) -> Vec<ChangeEvent> { self.lock().events.clone() }

  fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
    self.tables.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl RegistryStore for MemoryStore {
  type Error = MemoryError;

  async fn find_identities(&self, query: &IdentityQuery) -> Result<Vec<Identity>, MemoryError> {
    let mut found: Vec<Identity> = self
      .lock()
      .identities
      .iter()
      .filter(|i| query.matches(i))
      .cloned()
      .collect();
    if self.reverse_order.load(Ordering::SeqCst) {
      found.reverse();
    }
    Ok(found)
  }

  async fn insert_identity(&self, identity: NewIdentity) -> Result<Identity, MemoryError> {
    let mut tables = self.lock();
    let now = Utc::now();
    let secondary_id = tables.identities.iter().map(|i| i.secondary_id).max().unwrap_or(0) + 1;
    let row = Identity {
      secondary_id,
      primary_id: None,
      kind: identity.kind,
      display_name: identity.display_name,
      canonical_name: identity.canonical_name,
      alias_name: identity.alias_name,
      salutation: identity.salutation,
      affiliation_code: identity.affiliation_code,
      birth_year: identity.birth_year,
      gender: identity.gender,
      nationality: identity.nationality,
      created_at: now,
      updated_at: now,
    };
    tables.identities.push(row.clone());
    Ok(row)
  }

  async fn update_primary_id(
    &self,
    query: &IdentityQuery,
    primary_id: i64,
  ) -> Result<usize, MemoryError> {
    let mut updated = 0;
    for row in self.lock().identities.iter_mut().filter(|i| query.matches(i)) {
      row.primary_id = Some(primary_id);
      row.updated_at = Utc::now();
      updated += 1;
    }
    Ok(updated)
  }

  async fn fetch_all_identities(&self) -> Result<Vec<Identity>, MemoryError> {
    Ok(self.identities())
  }

  async fn upsert_background(
    &self,
    primary_id: i64,
    background: Background,
  ) -> Result<(), MemoryError> {
    let mut tables = self.lock();
    match tables.backgrounds.iter_mut().find(|(id, _)| *id == primary_id) {
      Some((_, stored)) => stored.merge(background),
      None => tables.backgrounds.push((primary_id, background)),
    }
    Ok(())
  }

  async fn get_background(&self, primary_id: i64) -> Result<Option<Background>, MemoryError> {
    Ok(
      self
        .lock()
        .backgrounds
        .iter()
        .find(|(id, _)| *id == primary_id)
        .map(|(_, b)| b.clone()),
    )
  }

  async fn upsert_change_event(&self, event: ChangeEvent) -> Result<i64, MemoryError> {
    if self.fail_event_writes.load(Ordering::SeqCst) {
      return Err(MemoryError("change event write"));
    }
    let mut tables = self.lock();
    let existing = event
      .source_id
      .and_then(|sid| tables.events.iter().position(|e| e.source_id == Some(sid)));
    let index = match existing {
      Some(index) => {
        tables.events[index] = event;
        index
      }
      None => {
        tables.events.push(event);
        tables.events.len() - 1
      }
    };
    Ok(index as i64 + 1)
  }

  async fn fetch_all_change_events(&self) -> Result<Vec<ChangeEvent>, MemoryError> {
    Ok(self.events())
  }

  async fn fetch_historical_records(&self) -> Result<Vec<HistoricalDirectorRecord>, MemoryError> {
    Ok(self.lock().historical.clone())
  }
}
