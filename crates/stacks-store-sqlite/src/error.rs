//! Error type for `stacks-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("decimal parse error: {0}")]
  Decimal(#[from] rust_decimal::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("a student with usn {0:?} already exists")]
  DuplicateUsn(String),

  #[error("a book with serial number {0:?} already exists")]
  DuplicateSerial(String),

  /// The partial unique index on open loans rejected an insert.
  #[error("borrower {borrower_id} already has an open loan of copy {copy_id}")]
  OpenLoanExists { borrower_id: Uuid, copy_id: Uuid },

  #[error("loan not found: {0}")]
  LoanNotFound(Uuid),

  #[error("loan {0} is already returned")]
  AlreadyReturned(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for stacks_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::DuplicateUsn(_)
      | Error::DuplicateSerial(_)
      | Error::OpenLoanExists { .. } => Self::Conflict(e.to_string()),
      Error::LoanNotFound(id) => Self::NotFound(format!("loan {id}")),
      Error::AlreadyReturned(_) => Self::InvalidState(e.to_string()),
      other => Self::store(other),
    }
  }
}
