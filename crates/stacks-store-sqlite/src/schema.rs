//! SQL schema for the Stacks SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS borrowers (
    borrower_id   TEXT PRIMARY KEY,
    usn           TEXT NOT NULL,
    name          TEXT NOT NULL,
    phone         TEXT NOT NULL DEFAULT '',
    registered_at TEXT NOT NULL,   -- RFC 3339 UTC, microsecond precision
    expires_at    TEXT
);

-- Enrollment codes are matched ignoring case and surrounding whitespace,
-- so they must also be unique that way.
CREATE UNIQUE INDEX IF NOT EXISTS borrowers_usn_idx
    ON borrowers(lower(trim(usn)));

CREATE TABLE IF NOT EXISTS copies (
    copy_id       TEXT PRIMARY KEY,
    serial_number TEXT NOT NULL UNIQUE,
    rack_number   TEXT NOT NULL DEFAULT '',
    title         TEXT NOT NULL,
    author        TEXT NOT NULL DEFAULT '',
    edition       INTEGER,
    publisher     TEXT,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS loans (
    loan_id     TEXT PRIMARY KEY,
    borrower_id TEXT NOT NULL REFERENCES borrowers(borrower_id),
    copy_id     TEXT NOT NULL REFERENCES copies(copy_id),
    issued_at   TEXT NOT NULL,
    due_at      TEXT NOT NULL,
    returned_at TEXT,               -- NULL while the loan is open
    late_fee    TEXT NOT NULL DEFAULT '0',
    CHECK (due_at >= issued_at)
);

-- At most one open loan per (borrower, copy).
CREATE UNIQUE INDEX IF NOT EXISTS loans_one_open_idx
    ON loans(borrower_id, copy_id) WHERE returned_at IS NULL;

CREATE INDEX IF NOT EXISTS loans_due_idx  ON loans(due_at);
CREATE INDEX IF NOT EXISTS loans_copy_idx ON loans(copy_id);

PRAGMA user_version = 1;
";
