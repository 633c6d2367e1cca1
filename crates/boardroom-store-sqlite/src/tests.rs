//! Integration tests for `SqliteStore` against an in-memory database.

use boardroom_core::{
  change::{ChangeEvent, ChangeType, HistoricalDirectorRecord},
  identity::{Background, IdentityKind, NewIdentity},
  ingest::ingest_batch,
  parse::{FieldParser, RawAnnouncement},
  reconcile::{GapReconciler, ReconcileReport},
  store::{IdentityQuery, RegistryStore},
};
use chrono::NaiveDate;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn person(name: &str, year: Option<i32>, code: &str) -> NewIdentity {
  let mut identity = NewIdentity::person(name);
  identity.birth_year = year;
  identity.affiliation_code = Some(code.into());
  identity
}

fn historical(name: &str, code: &str) -> HistoricalDirectorRecord {
  HistoricalDirectorRecord {
    affiliation_code: Some(code.into()),
    company_name:     Some(format!("{code} BERHAD")),
    title:            None,
    director_name:    name.into(),
    appointment_date: None,
    resignation_date: None,
    designation:      Some("Independent Director".into()),
    birth_date:       None,
    gender:           Some("M".into()),
    nationality:      Some("MALAYSIA".into()),
  }
}

// ─── Identities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_assigns_increasing_ids_without_a_pointer() {
  let s = store().await;
  let a = s.insert_identity(person("LIM KOK WAH", Some(1960), "A")).await.unwrap();
  let b = s.insert_identity(person("LIM KOK WAH", Some(1960), "B")).await.unwrap();

  assert!(b.secondary_id > a.secondary_id);
  assert_eq!(a.primary_id, None);

  let all = s.fetch_all_identities().await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all[0].secondary_id, a.secondary_id);
  assert_eq!(all[0].canonical_name, "LIM KOK WAH");
  assert_eq!(all[0].kind, IdentityKind::Person);
}

#[tokio::test]
async fn find_respects_kind_and_birth_year() {
  let s = store().await;
  s.insert_identity(person("LIM KOK WAH", Some(1960), "A")).await.unwrap();
  s.insert_identity(person("LIM KOK WAH", Some(1975), "B")).await.unwrap();
  s.insert_identity(NewIdentity::company("LIM KOK WAH")).await.unwrap();

  let born_1960 =
    IdentityQuery::with_birth_year(IdentityKind::Person, "LIM KOK WAH", "LIM KOK WAH", 1960);
  let found = s.find_identities(&born_1960).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].affiliation_code.as_deref(), Some("A"));

  let any_year = IdentityQuery::name_only(IdentityKind::Person, "LIM KOK WAH", "LIM KOK WAH");
  let found = s.find_identities(&any_year).await.unwrap();
  assert_eq!(found.len(), 2);
  assert!(found[0].secondary_id < found[1].secondary_id);
}

#[tokio::test]
async fn find_matches_display_and_alias_names() {
  let s = store().await;
  let mut aliased = person("Dato' Lim Kok Wah", None, "A");
  aliased.canonical_name = "LIM KOK WAH".into();
  aliased.alias_name = Some("KW LIM".into());
  s.insert_identity(aliased).await.unwrap();

  let by_alias = IdentityQuery::name_only(IdentityKind::Person, "UNRELATED", "KW LIM");
  assert_eq!(s.find_identities(&by_alias).await.unwrap().len(), 1);

  let by_display = IdentityQuery::name_only(IdentityKind::Person, "UNRELATED", "Dato' Lim Kok Wah");
  assert_eq!(s.find_identities(&by_display).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_primary_id_points_every_match() {
  let s = store().await;
  let first = s.insert_identity(person("LIM KOK WAH", Some(1960), "A")).await.unwrap();
  s.insert_identity(person("LIM KOK WAH", Some(1960), "B")).await.unwrap();
  s.insert_identity(person("TAN AH KOW", Some(1960), "A")).await.unwrap();

  let query =
    IdentityQuery::with_birth_year(IdentityKind::Person, "LIM KOK WAH", "LIM KOK WAH", 1960);
  let updated = s.update_primary_id(&query, first.secondary_id).await.unwrap();
  assert_eq!(updated, 2);

  let all = s.fetch_all_identities().await.unwrap();
  assert_eq!(all[0].primary_id, Some(first.secondary_id));
  assert_eq!(all[1].primary_id, Some(first.secondary_id));
  assert_eq!(all[2].primary_id, None);
}

// ─── Backgrounds ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn background_fields_merge_individually() {
  let s = store().await;
  let id = s
    .insert_identity(person("LIM KOK WAH", None, "A"))
    .await
    .unwrap()
    .secondary_id;

  assert_eq!(s.get_background(id).await.unwrap(), None);

  s.upsert_background(id, Background {
    qualification: Some("LLB".into()),
    working_experience: Some("Partner".into()),
    ..Default::default()
  })
  .await
  .unwrap();
  s.upsert_background(id, Background {
    working_experience: Some("Senior partner".into()),
    directorships: Some("Foo Berhad".into()),
    ..Default::default()
  })
  .await
  .unwrap();

  let merged = s.get_background(id).await.unwrap().unwrap();
  assert_eq!(merged.qualification.as_deref(), Some("LLB"));
  assert_eq!(merged.working_experience.as_deref(), Some("Senior partner"));
  assert_eq!(merged.directorships.as_deref(), Some("Foo Berhad"));
  assert_eq!(merged.family_relationship, None);
}

// ─── Change events ───────────────────────────────────────────────────────────

#[tokio::test]
async fn events_upsert_by_source_id() {
  let s = store().await;
  let mut event = ChangeEvent::new("LIM KOK WAH", ChangeType::CessationOfOffice);
  event.source_id = Some(42);
  event.date_of_change = Some(ymd(2024, 5, 2));

  let first = s.upsert_change_event(event.clone()).await.unwrap();
  event.remarks = Some("Amended".into());
  let second = s.upsert_change_event(event).await.unwrap();
  assert_eq!(first, second);

  let events = s.fetch_all_change_events().await.unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].change_type, ChangeType::CessationOfOffice);
  assert_eq!(events[0].date_of_change, Some(ymd(2024, 5, 2)));
  assert_eq!(events[0].remarks.as_deref(), Some("Amended"));
}

#[tokio::test]
async fn events_without_source_id_are_always_inserted() {
  let s = store().await;
  let event = ChangeEvent::new("LIM KOK WAH", ChangeType::Resignation);
  let a = s.upsert_change_event(event.clone()).await.unwrap();
  let b = s.upsert_change_event(event).await.unwrap();

  assert_ne!(a, b);
  assert_eq!(s.fetch_all_change_events().await.unwrap().len(), 2);
}

#[tokio::test]
async fn event_related_to_unknown_identity_is_rejected() {
  let s = store().await;
  let mut event = ChangeEvent::new("LIM KOK WAH", ChangeType::Appointment);
  event.related_identity = Some(999);
  assert!(s.upsert_change_event(event).await.is_err());
}

// ─── Historical import ───────────────────────────────────────────────────────

#[tokio::test]
async fn historical_import_keeps_placeholder_dates() {
  let s = store().await;
  let mut record = historical("LIM KOK WAH", "A");
  record.appointment_date = Some(ymd(2010, 3, 1));
  record.resignation_date = Some(ymd(1900, 1, 1));
  record.birth_date = Some(ymd(1960, 7, 14));

  let written = s
    .import_historical(vec![record.clone(), historical("TAN AH KOW", "B")])
    .await
    .unwrap();
  assert_eq!(written, 2);

  let records = s.fetch_historical_records().await.unwrap();
  assert_eq!(records[0], record);
  assert_eq!(records[0].birth_year(), Some(1960));
  assert_eq!(records[1].director_name, "TAN AH KOW");
}

// ─── End to end ──────────────────────────────────────────────────────────────

fn announcement(source_id: i64, name: &str, code: &str, date: &str) -> RawAnnouncement {
  RawAnnouncement {
    source_id,
    fields: [
      ("Company Name", format!("{code} Berhad")),
      ("Stock Code", code.to_owned()),
      ("Date Announced", date.to_owned()),
      ("Date of change", date.to_owned()),
      ("Designation", "Independent Director".to_owned()),
      ("Type of change", "Appointment".to_owned()),
      ("Name", name.to_owned()),
      ("Age", "65".to_owned()),
      ("Qualifications", "Bachelor of Laws".to_owned()),
    ]
    .into_iter()
    .map(|(l, v)| (l.to_owned(), v))
    .collect(),
  }
}

#[tokio::test]
async fn ingest_then_reconcile_fills_only_the_gap() {
  let s = store().await;

  let report = ingest_batch(&s, &FieldParser, &[
    announcement(1, "Dato' Lim Kok Wah", "ACME", "15 Oct 2025"),
    announcement(2, "Lim Kok Wah", "BETA", "20 Oct 2025"),
  ])
  .await
  .unwrap();
  assert_eq!(report.ingested, 2);

  let people: Vec<_> = s
    .fetch_all_identities()
    .await
    .unwrap()
    .into_iter()
    .filter(|i| i.kind == IdentityKind::Person)
    .collect();
  assert_eq!(people.len(), 2);
  let permanent_id = people[0].secondary_id;
  assert_eq!(people[0].primary_id, Some(permanent_id));
  assert_eq!(people[0].salutation.as_deref(), Some("DATO'"));

  let mut record = historical("LIM KOK WAH", "ACME");
  record.title = Some("DATO'".into());
  record.appointment_date = Some(ymd(2025, 10, 15));
  record.resignation_date = Some(ymd(2026, 3, 1));
  s.import_historical(vec![record, historical("NOBODY KNOWN", "ACME")])
    .await
    .unwrap();

  let report = GapReconciler::new(&s).run().await.unwrap();
  assert_eq!(report, ReconcileReport {
    examined:              2,
    unresolved:            1,
    appointments_inserted: 0,
    resignations_inserted: 1,
    failed:                0,
  });

  let events = s.fetch_all_change_events().await.unwrap();
  assert_eq!(events.len(), 3);
  let synthetic = &events[2];
  assert_eq!(synthetic.source_id, None);
  assert_eq!(synthetic.change_type, ChangeType::Resignation);
  assert_eq!(synthetic.date_of_change, Some(ymd(2026, 3, 1)));
  assert_eq!(synthetic.related_identity, Some(permanent_id));

  let again = GapReconciler::new(&s).run().await.unwrap();
  assert_eq!(again.resignations_inserted + again.appointments_inserted, 0);
  assert_eq!(s.fetch_all_change_events().await.unwrap().len(), 3);
}

#[tokio::test]
async fn dangling_pointer_does_not_block_synthesis() {
  let s = store().await;
  s.insert_identity(person("LIM KOK WAH", Some(1960), "ACME")).await.unwrap();
  let query = IdentityQuery::name_only(IdentityKind::Person, "LIM KOK WAH", "LIM KOK WAH");
  s.update_primary_id(&query, 999).await.unwrap();

  let mut record = historical("LIM KOK WAH", "ACME");
  record.appointment_date = Some(ymd(2019, 6, 3));
  s.import_historical(vec![record]).await.unwrap();

  let report = GapReconciler::new(&s).run().await.unwrap();
  assert_eq!(report.appointments_inserted, 1);
  assert_eq!(report.failed, 0);

  let events = s.fetch_all_change_events().await.unwrap();
  assert_eq!(events[0].related_identity, None);
}
