//! The announcement path: attach each parsed announcement to an identity and
//! persist its change event.

use tracing::{info, warn};

use crate::{
  Error, Result,
  identity::{IdentityKind, NewIdentity},
  matcher::find_matches,
  merger::resolve_identity,
  name::{normalize, split_title},
  parse::{AnnouncementParser, ParsedAnnouncement, RawAnnouncement},
  store::{IdentityQuery, RegistryStore},
};

/// Result of ingesting one announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
  /// Permanent id of the person the announcement concerns.
  pub permanent_id:      i64,
  pub company_id:        Option<i64>,
  /// Row id of the upserted change event.
  pub event_id:          i64,
  /// Whether a new identity row was created for the person.
  pub inserted_identity: bool,
}

/// Counters for [`ingest_batch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
  pub ingested: usize,
  /// Announcements the parser rejected.
  pub skipped:  usize,
}

/// Resolve the person (and company) behind `parsed` and upsert its event.
///
/// The event is stored with the person's bare name, the stripped title and
/// the permanent id.
pub async fn ingest_announcement<S: RegistryStore>(
  store: &S,
  parsed: ParsedAnnouncement,
) -> Result<IngestOutcome> {
  let ParsedAnnouncement { mut event, mut person, company, background } = parsed;

  let split = split_title(&person.display_name);
  person.canonical_name = split.name.clone();
  person.salutation = split.title.clone();

  let query = match person.birth_year {
    Some(year) => IdentityQuery::with_birth_year(
      IdentityKind::Person,
      &split.name,
      &person.display_name,
      year,
    ),
    None => IdentityQuery::name_only(IdentityKind::Person, &split.name, &person.display_name),
  };
  let matches = find_matches(store, &query).await?;
  let resolution = resolve_identity(store, &query, person, &matches, Some(&background)).await?;

  let company_id = match company {
    Some(company) => Some(register_company(store, company).await?),
    None => None,
  };

  event.person_title = split.title;
  event.person_name = split.name;
  event.related_identity = Some(resolution.permanent_id);
  let source_id = event.source_id;
  let event_id = store.upsert_change_event(event).await.map_err(Error::write)?;

  info!(
    source_id,
    permanent_id = resolution.permanent_id,
    event_id,
    "ingested announcement",
  );

  Ok(IngestOutcome {
    permanent_id: resolution.permanent_id,
    company_id,
    event_id,
    inserted_identity: resolution.inserted.is_some(),
  })
}

/// Find or create the company identity; companies have no birth year.
async fn register_company<S: RegistryStore>(store: &S, mut company: NewIdentity) -> Result<i64> {
  company.canonical_name = normalize(&company.display_name);
  let query = IdentityQuery::name_only(
    IdentityKind::Company,
    &company.canonical_name,
    &company.display_name,
  );
  let matches = find_matches(store, &query).await?;
  let resolution = resolve_identity(store, &query, company, &matches, None).await?;
  Ok(resolution.permanent_id)
}

/// Parse and ingest `raws` in order.
///
/// Announcements the parser rejects are logged and skipped. A store failure
/// stops the batch so no later announcement is ingested ahead of it.
pub async fn ingest_batch<S, P>(
  store: &S,
  parser: &P,
  raws: &[RawAnnouncement],
) -> Result<IngestReport>
where
  S: RegistryStore,
  P: AnnouncementParser,
{
  let mut report = IngestReport::default();
  for raw in raws {
    let parsed = match parser.parse(raw) {
      Ok(parsed) => parsed,
      Err(e) => {
        warn!(source_id = raw.source_id, error = %e, "skipping unparseable announcement");
        report.skipped += 1;
        continue;
      }
    };
    ingest_announcement(store, parsed).await?;
    report.ingested += 1;
  }
  Ok(report)
}
