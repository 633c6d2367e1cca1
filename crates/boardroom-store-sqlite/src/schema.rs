//! SQL schema for the boardroom SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per (person or company, affiliation). Rows denoting the same
-- entity share primary_id, the secondary_id of their representative.
-- (canonical_name, birth_year) is meant to identify a person but is not
-- enforced: each affiliation gets its own row.
CREATE TABLE IF NOT EXISTS identities (
    secondary_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    primary_id       INTEGER,
    kind             TEXT NOT NULL,   -- 'person' | 'company'
    display_name     TEXT NOT NULL,
    canonical_name   TEXT NOT NULL,
    alias_name       TEXT,
    salutation       TEXT,
    affiliation_code TEXT,
    birth_year       INTEGER,
    gender           TEXT,
    nationality      TEXT,
    created_at       TEXT NOT NULL,   -- RFC 3339 UTC
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS identities_canonical_idx ON identities(canonical_name, birth_year);
CREATE INDEX IF NOT EXISTS identities_display_idx   ON identities(display_name);
CREATE INDEX IF NOT EXISTS identities_alias_idx     ON identities(alias_name);

-- source_id is the announcement id; NULL for events synthesized from the
-- historical import, which SQLite lets repeat under UNIQUE.
CREATE TABLE IF NOT EXISTS change_events (
    event_id          INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id         INTEGER UNIQUE,
    company_name      TEXT,
    affiliation_code  TEXT,
    person_name       TEXT NOT NULL,
    person_title      TEXT,
    person_birth_year INTEGER,
    gender            TEXT,
    nationality       TEXT,
    date_announced    TEXT,            -- YYYY-MM-DD
    date_of_change    TEXT,
    designation       TEXT,
    previous_position TEXT,
    remarks           TEXT,
    directorate       TEXT,
    change_type       TEXT NOT NULL,   -- portal display string
    related_identity  INTEGER REFERENCES identities(secondary_id),
    created_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS change_events_affiliation_idx ON change_events(affiliation_code);

-- Keyed by the representative's secondary_id.
CREATE TABLE IF NOT EXISTS backgrounds (
    primary_id             INTEGER PRIMARY KEY REFERENCES identities(secondary_id),
    qualification          TEXT,
    working_experience     TEXT,
    directorships          TEXT,
    family_relationship    TEXT,
    conflict_of_interest   TEXT,
    interest_in_securities TEXT
);

-- Bulk import of the pre-scraper director dataset. Read-only to the
-- reconciler. 1900-01-01 in a date column means 'not applicable'.
CREATE TABLE IF NOT EXISTS historical_directors (
    record_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    affiliation_code TEXT,
    company_name     TEXT,
    title            TEXT,
    director_name    TEXT NOT NULL,
    appointment_date TEXT,
    resignation_date TEXT,
    designation      TEXT,
    birth_date       TEXT,
    gender           TEXT,
    nationality      TEXT
);

PRAGMA user_version = 1;
";
