//! [`SqliteStore`], the SQLite implementation of [`RegistryStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use boardroom_core::{
  change::{ChangeEvent, HistoricalDirectorRecord},
  identity::{Background, Identity, NewIdentity},
  store::{IdentityQuery, RegistryStore},
};

use crate::{
  Result,
  encode::{
    EVENT_COLUMNS, IDENTITY_COLUMNS, RawChangeEvent, RawHistorical, RawIdentity, encode_date,
    encode_dt,
  },
  schema::SCHEMA,
};

/// Name predicate shared by lookups and primary-id updates. Binds
/// `?1` kind, `?2` canonical name, `?3` display name, `?4` birth year.
const IDENTITY_MATCH: &str = "kind = ?1
  AND (canonical_name = ?2 OR display_name = ?3 OR alias_name = ?3)
  AND (?4 IS NULL OR birth_year = ?4)";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A boardroom registry backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests and dry runs.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load the historical director dataset in one transaction. Returns the
  /// number of rows written.
  pub async fn import_historical(&self, records: Vec<HistoricalDirectorRecord>) -> Result<usize> {
    let count = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO historical_directors (
               affiliation_code, company_name, title, director_name,
               appointment_date, resignation_date, designation, birth_date,
               gender, nationality
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          )?;
          for r in &records {
            stmt.execute(rusqlite::params![
              r.affiliation_code,
              r.company_name,
              r.title,
              r.director_name,
              encode_date(r.appointment_date),
              encode_date(r.resignation_date),
              r.designation,
              encode_date(r.birth_date),
              r.gender,
              r.nationality,
            ])?;
          }
        }
        tx.commit()?;
        Ok(records.len())
      })
      .await?;
    Ok(count)
  }
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = crate::Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn find_identities(&self, query: &IdentityQuery) -> Result<Vec<Identity>> {
    let kind      = query.kind.to_string();
    let canonical = query.canonical_name.clone();
    let display   = query.display_name.clone();
    let year      = query.birth_year;

    let raws: Vec<RawIdentity> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {IDENTITY_COLUMNS} FROM identities WHERE {IDENTITY_MATCH}
           ORDER BY secondary_id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![kind, canonical, display, year],
            RawIdentity::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIdentity::into_identity).collect()
  }

  async fn insert_identity(&self, identity: NewIdentity) -> Result<Identity> {
    let now    = Utc::now();
    let at_str = encode_dt(now);
    let kind   = identity.kind.to_string();
    let row    = identity.clone();

    let secondary_id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO identities (
             kind, display_name, canonical_name, alias_name, salutation,
             affiliation_code, birth_year, gender, nationality,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
          rusqlite::params![
            kind,
            row.display_name,
            row.canonical_name,
            row.alias_name,
            row.salutation,
            row.affiliation_code,
            row.birth_year,
            row.gender,
            row.nationality,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Identity {
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
    })
  }

  async fn update_primary_id(&self, query: &IdentityQuery, primary_id: i64) -> Result<usize> {
    let kind      = query.kind.to_string();
    let canonical = query.canonical_name.clone();
    let display   = query.display_name.clone();
    let year      = query.birth_year;
    let at_str    = encode_dt(Utc::now());

    let updated = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "UPDATE identities SET primary_id = ?5, updated_at = ?6 WHERE {IDENTITY_MATCH}"
        );
        Ok(conn.execute(
          &sql,
          rusqlite::params![kind, canonical, display, year, primary_id, at_str],
        )?)
      })
      .await?;
    Ok(updated)
  }

  async fn fetch_all_identities(&self) -> Result<Vec<Identity>> {
    let raws: Vec<RawIdentity> = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {IDENTITY_COLUMNS} FROM identities ORDER BY secondary_id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawIdentity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIdentity::into_identity).collect()
  }

  // ── Backgrounds ───────────────────────────────────────────────────────────

  async fn upsert_background(&self, primary_id: i64, background: Background) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO backgrounds (
             primary_id, qualification, working_experience, directorships,
             family_relationship, conflict_of_interest, interest_in_securities
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT(primary_id) DO UPDATE SET
             qualification          = COALESCE(excluded.qualification, backgrounds.qualification),
             working_experience     = COALESCE(excluded.working_experience, backgrounds.working_experience),
             directorships          = COALESCE(excluded.directorships, backgrounds.directorships),
             family_relationship    = COALESCE(excluded.family_relationship, backgrounds.family_relationship),
             conflict_of_interest   = COALESCE(excluded.conflict_of_interest, backgrounds.conflict_of_interest),
             interest_in_securities = COALESCE(excluded.interest_in_securities, backgrounds.interest_in_securities)",
          rusqlite::params![
            primary_id,
            background.qualification,
            background.working_experience,
            background.directorships,
            background.family_relationship,
            background.conflict_of_interest,
            background.interest_in_securities,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_background(&self, primary_id: i64) -> Result<Option<Background>> {
    let background = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT qualification, working_experience, directorships,
                    family_relationship, conflict_of_interest, interest_in_securities
             FROM backgrounds WHERE primary_id = ?1",
            rusqlite::params![primary_id],
            |row| {
              Ok(Background {
                qualification:          row.get(0)?,
                working_experience:     row.get(1)?,
                directorships:          row.get(2)?,
                family_relationship:    row.get(3)?,
                conflict_of_interest:   row.get(4)?,
                interest_in_securities: row.get(5)?,
              })
            },
          )
          .optional()?)
      })
      .await?;
    Ok(background)
  }

  // ── Change events ─────────────────────────────────────────────────────────

  async fn upsert_change_event(&self, event: ChangeEvent) -> Result<i64> {
    let change_type    = event.change_type.to_string();
    let date_announced = encode_date(event.date_announced);
    let date_of_change = encode_date(event.date_of_change);
    let at_str         = encode_dt(Utc::now());

    let event_id = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO change_events (
             source_id, company_name, affiliation_code, person_name,
             person_title, person_birth_year, gender, nationality,
             date_announced, date_of_change, designation, previous_position,
             remarks, directorate, change_type, related_identity, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
           ON CONFLICT(source_id) DO UPDATE SET
             company_name      = excluded.company_name,
             affiliation_code  = excluded.affiliation_code,
             person_name       = excluded.person_name,
             person_title      = excluded.person_title,
             person_birth_year = excluded.person_birth_year,
             gender            = excluded.gender,
             nationality       = excluded.nationality,
             date_announced    = excluded.date_announced,
             date_of_change    = excluded.date_of_change,
             designation       = excluded.designation,
             previous_position = excluded.previous_position,
             remarks           = excluded.remarks,
             directorate       = excluded.directorate,
             change_type       = excluded.change_type,
             related_identity  = excluded.related_identity
           RETURNING event_id",
          rusqlite::params![
            event.source_id,
            event.company_name,
            event.affiliation_code,
            event.person_name,
            event.person_title,
            event.person_birth_year,
            event.gender,
            event.nationality,
            date_announced,
            date_of_change,
            event.designation,
            event.previous_position,
            event.remarks,
            event.directorate,
            change_type,
            event.related_identity,
            at_str,
          ],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(event_id)
  }

  async fn fetch_all_change_events(&self) -> Result<Vec<ChangeEvent>> {
    let raws: Vec<RawChangeEvent> = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM change_events ORDER BY event_id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawChangeEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawChangeEvent::into_event).collect()
  }

  // ── Historical import ─────────────────────────────────────────────────────

  async fn fetch_historical_records(&self) -> Result<Vec<HistoricalDirectorRecord>> {
    let raws: Vec<RawHistorical> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT affiliation_code, company_name, title, director_name,
                  appointment_date, resignation_date, designation, birth_date,
                  gender, nationality
           FROM historical_directors ORDER BY record_id",
        )?;
        let rows = stmt
          .query_map([], RawHistorical::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistorical::into_record).collect()
  }
}
