//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that SQL string comparison orders them correctly. Fees are
//! stored as decimal strings. UUIDs are stored as hyphenated lowercase
//! strings.

use std::str::FromStr as _;

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use rust_decimal::Decimal;
use stacks_core::{
  borrower::Borrower,
  copy::BookCopy,
  loan::{Loan, LoanDetail},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Column lists ────────────────────────────────────────────────────────────

pub const BORROWER_COLUMNS: &str =
  "b.borrower_id, b.usn, b.name, b.phone, b.registered_at, b.expires_at";

pub const COPY_COLUMNS: &str = "c.copy_id, c.serial_number, c.rack_number, \
                                c.title, c.author, c.edition, c.publisher, \
                                c.created_at";

pub const LOAN_COLUMNS: &str = "l.loan_id, l.borrower_id, l.copy_id, \
                                l.issued_at, l.due_at, l.returned_at, \
                                l.late_fee";

const BORROWER_WIDTH: usize = 6;
const LOAN_WIDTH: usize = 7;

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Drop precision the column cannot hold, so values handed back to callers
/// equal what a later read returns.
pub fn to_stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Decimal ─────────────────────────────────────────────────────────────────

pub fn encode_fee(fee: Decimal) -> String { fee.to_string() }

pub fn decode_fee(s: &str) -> Result<Decimal> { Ok(Decimal::from_str(s)?) }

// ─── Constraint errors ───────────────────────────────────────────────────────

/// Whether `e` is a `UNIQUE` constraint (or unique index) violation.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from [`BORROWER_COLUMNS`].
pub struct RawBorrower {
  pub borrower_id:   String,
  pub usn:           String,
  pub name:          String,
  pub phone:         String,
  pub registered_at: String,
  pub expires_at:    Option<String>,
}

impl RawBorrower {
  /// Read the borrower columns starting at column `at`.
  pub fn from_row(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      borrower_id:   row.get(at)?,
      usn:           row.get(at + 1)?,
      name:          row.get(at + 2)?,
      phone:         row.get(at + 3)?,
      registered_at: row.get(at + 4)?,
      expires_at:    row.get(at + 5)?,
    })
  }

  pub fn into_borrower(self) -> Result<Borrower> {
    Ok(Borrower {
      borrower_id:   decode_uuid(&self.borrower_id)?,
      usn:           self.usn,
      name:          self.name,
      phone:         self.phone,
      registered_at: decode_dt(&self.registered_at)?,
      expires_at:    self.expires_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw values read from [`COPY_COLUMNS`].
pub struct RawCopy {
  pub copy_id:       String,
  pub serial_number: String,
  pub rack_number:   String,
  pub title:         String,
  pub author:        String,
  pub edition:       Option<u32>,
  pub publisher:     Option<String>,
  pub created_at:    String,
}

impl RawCopy {
  pub fn from_row(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      copy_id:       row.get(at)?,
      serial_number: row.get(at + 1)?,
      rack_number:   row.get(at + 2)?,
      title:         row.get(at + 3)?,
      author:        row.get(at + 4)?,
      edition:       row.get(at + 5)?,
      publisher:     row.get(at + 6)?,
      created_at:    row.get(at + 7)?,
    })
  }

  pub fn into_copy(self) -> Result<BookCopy> {
    Ok(BookCopy {
      copy_id:       decode_uuid(&self.copy_id)?,
      serial_number: self.serial_number,
      rack_number:   self.rack_number,
      title:         self.title,
      author:        self.author,
      edition:       self.edition,
      publisher:     self.publisher,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from [`LOAN_COLUMNS`].
pub struct RawLoan {
  pub loan_id:     String,
  pub borrower_id: String,
  pub copy_id:     String,
  pub issued_at:   String,
  pub due_at:      String,
  pub returned_at: Option<String>,
  pub late_fee:    String,
}

impl RawLoan {
  pub fn from_row(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      loan_id:     row.get(at)?,
      borrower_id: row.get(at + 1)?,
      copy_id:     row.get(at + 2)?,
      issued_at:   row.get(at + 3)?,
      due_at:      row.get(at + 4)?,
      returned_at: row.get(at + 5)?,
      late_fee:    row.get(at + 6)?,
    })
  }

  pub fn into_loan(self) -> Result<Loan> {
    Ok(Loan {
      loan_id:     decode_uuid(&self.loan_id)?,
      borrower_id: decode_uuid(&self.borrower_id)?,
      copy_id:     decode_uuid(&self.copy_id)?,
      issued_at:   decode_dt(&self.issued_at)?,
      due_at:      decode_dt(&self.due_at)?,
      returned_at: self.returned_at.as_deref().map(decode_dt).transpose()?,
      late_fee:    decode_fee(&self.late_fee)?,
    })
  }
}

/// A loan row joined with its borrower and copy, in the column order
/// `LOAN_COLUMNS, BORROWER_COLUMNS, COPY_COLUMNS`.
pub struct RawLoanDetail {
  pub loan:     RawLoan,
  pub borrower: RawBorrower,
  pub copy:     RawCopy,
}

impl RawLoanDetail {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      loan:     RawLoan::from_row(row, 0)?,
      borrower: RawBorrower::from_row(row, LOAN_WIDTH)?,
      copy:     RawCopy::from_row(row, LOAN_WIDTH + BORROWER_WIDTH)?,
    })
  }

  pub fn into_detail(self) -> Result<LoanDetail> {
    Ok(LoanDetail::new(
      self.loan.into_loan()?,
      self.borrower.into_borrower()?,
      self.copy.into_copy()?,
    ))
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_as_strings() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let b = a + chrono::Duration::microseconds(1);
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(encode_dt(a), "2024-01-01T09:00:00.000000Z");
  }

  #[test]
  fn timestamp_roundtrip_at_stored_precision() {
    let now = to_stored_precision(Utc::now());
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }

  #[test]
  fn fee_roundtrip() {
    let fee = Decimal::new(1250, 2);
    assert_eq!(decode_fee(&encode_fee(fee)).unwrap(), fee);
  }
}
