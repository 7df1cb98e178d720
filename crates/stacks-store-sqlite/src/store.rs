//! [`SqliteStore`], the SQLite implementation of [`LendingStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, types::Value};
use rust_decimal::Decimal;
use uuid::Uuid;

use stacks_core::{
  borrower::{Borrower, NewBorrower},
  copy::{BookCopy, NewCopy},
  loan::{Loan, LoanDetail, LoanState, NewLoan},
  store::{LendingStore, LoanQuery},
};

use crate::{
  Error, Result,
  encode::{
    BORROWER_COLUMNS, COPY_COLUMNS, LOAN_COLUMNS, RawBorrower, RawCopy, RawLoan,
    RawLoanDetail, encode_dt, encode_fee, encode_uuid, is_unique_violation,
    to_stored_precision,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A lending store backed by a single SQLite file.
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

  /// Open an in-memory store, useful for testing.
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

  async fn loan_by_id(&self, id: Uuid) -> Result<Option<Loan>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawLoan> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {LOAN_COLUMNS} FROM loans l WHERE l.loan_id = ?1"),
            rusqlite::params![id_str],
            |row| RawLoan::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawLoan::into_loan).transpose()
  }
}

// ─── LendingStore impl ───────────────────────────────────────────────────────

impl LendingStore for SqliteStore {
  type Error = Error;

  // ── Borrowers ─────────────────────────────────────────────────────────────

  async fn add_borrower(&self, input: NewBorrower) -> Result<Borrower> {
    let borrower = Borrower {
      borrower_id:   Uuid::new_v4(),
      usn:           input.usn,
      name:          input.name,
      phone:         input.phone,
      registered_at: to_stored_precision(Utc::now()),
      expires_at:    input.expires_at.map(to_stored_precision),
    };

    let id_str      = encode_uuid(borrower.borrower_id);
    let usn         = borrower.usn.clone();
    let name        = borrower.name.clone();
    let phone       = borrower.phone.clone();
    let at_str      = encode_dt(borrower.registered_at);
    let expires_str = borrower.expires_at.map(encode_dt);

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO borrowers (borrower_id, usn, name, phone, registered_at, expires_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, usn, name, phone, at_str, expires_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateUsn(borrower.usn));
    }
    Ok(borrower)
  }

  async fn get_borrower(&self, id: Uuid) -> Result<Option<Borrower>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawBorrower> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {BORROWER_COLUMNS} FROM borrowers b WHERE b.borrower_id = ?1"),
            rusqlite::params![id_str],
            |row| RawBorrower::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBorrower::into_borrower).transpose()
  }

  async fn find_borrower_by_usn<'a>(&'a self, usn: &'a str) -> Result<Option<Borrower>> {
    let usn = usn.to_owned();

    let raw: Option<RawBorrower> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {BORROWER_COLUMNS} FROM borrowers b
               WHERE lower(trim(b.usn)) = lower(trim(?1))"
            ),
            rusqlite::params![usn],
            |row| RawBorrower::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBorrower::into_borrower).transpose()
  }

  // ── Copies ────────────────────────────────────────────────────────────────

  async fn add_copy(&self, input: NewCopy) -> Result<BookCopy> {
    let copy = BookCopy {
      copy_id:       Uuid::new_v4(),
      serial_number: input.serial_number,
      rack_number:   input.rack_number,
      title:         input.title,
      author:        input.author,
      edition:       input.edition,
      publisher:     input.publisher,
      created_at:    to_stored_precision(Utc::now()),
    };

    let id_str    = encode_uuid(copy.copy_id);
    let serial    = copy.serial_number.clone();
    let rack      = copy.rack_number.clone();
    let title     = copy.title.clone();
    let author    = copy.author.clone();
    let edition   = copy.edition;
    let publisher = copy.publisher.clone();
    let at_str    = encode_dt(copy.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO copies (
             copy_id, serial_number, rack_number, title, author,
             edition, publisher, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![id_str, serial, rack, title, author, edition, publisher, at_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateSerial(copy.serial_number));
    }
    Ok(copy)
  }

  async fn get_copy(&self, id: Uuid) -> Result<Option<BookCopy>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCopy> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COPY_COLUMNS} FROM copies c WHERE c.copy_id = ?1"),
            rusqlite::params![id_str],
            |row| RawCopy::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCopy::into_copy).transpose()
  }

  async fn find_copy_by_serial<'a>(&'a self, serial_number: &'a str) -> Result<Option<BookCopy>> {
    let serial = serial_number.to_owned();

    let raw: Option<RawCopy> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COPY_COLUMNS} FROM copies c WHERE c.serial_number = ?1"),
            rusqlite::params![serial],
            |row| RawCopy::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCopy::into_copy).transpose()
  }

  // ── Loans ─────────────────────────────────────────────────────────────────

  async fn insert_loan(&self, input: NewLoan) -> Result<Loan> {
    let loan = Loan {
      loan_id:     Uuid::new_v4(),
      borrower_id: input.borrower_id,
      copy_id:     input.copy_id,
      issued_at:   to_stored_precision(input.issued_at),
      due_at:      to_stored_precision(input.due_at),
      returned_at: None,
      late_fee:    Decimal::ZERO,
    };

    let id_str       = encode_uuid(loan.loan_id);
    let borrower_str = encode_uuid(loan.borrower_id);
    let copy_str     = encode_uuid(loan.copy_id);
    let issued_str   = encode_dt(loan.issued_at);
    let due_str      = encode_dt(loan.due_at);
    let fee_str      = encode_fee(loan.late_fee);

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO loans (loan_id, borrower_id, copy_id, issued_at, due_at, late_fee)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, borrower_str, copy_str, issued_str, due_str, fee_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      tracing::debug!(
        borrower_id = %loan.borrower_id,
        copy_id = %loan.copy_id,
        "open-loan index rejected insert"
      );
      return Err(Error::OpenLoanExists {
        borrower_id: loan.borrower_id,
        copy_id:     loan.copy_id,
      });
    }
    Ok(loan)
  }

  async fn get_loan(&self, id: Uuid) -> Result<Option<Loan>> { self.loan_by_id(id).await }

  async fn find_open_loan(&self, borrower_id: Uuid, copy_id: Uuid) -> Result<Option<Loan>> {
    let borrower_str = encode_uuid(borrower_id);
    let copy_str     = encode_uuid(copy_id);

    let raw: Option<RawLoan> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {LOAN_COLUMNS} FROM loans l
               WHERE l.borrower_id = ?1 AND l.copy_id = ?2 AND l.returned_at IS NULL"
            ),
            rusqlite::params![borrower_str, copy_str],
            |row| RawLoan::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawLoan::into_loan).transpose()
  }

  async fn close_loan(
    &self,
    id:          Uuid,
    returned_at: DateTime<Utc>,
    late_fee:    Decimal,
  ) -> Result<Loan> {
    let id_str       = encode_uuid(id);
    let returned_str = encode_dt(to_stored_precision(returned_at));
    let fee_str      = encode_fee(late_fee);

    // The update and the read-back share one transaction so the caller sees
    // exactly the row this call wrote.
    let (changed, raw): (usize, Option<RawLoan>) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE loans SET returned_at = ?2, late_fee = ?3
           WHERE loan_id = ?1 AND returned_at IS NULL",
          rusqlite::params![id_str, returned_str, fee_str],
        )?;
        let raw = tx
          .query_row(
            &format!("SELECT {LOAN_COLUMNS} FROM loans l WHERE l.loan_id = ?1"),
            rusqlite::params![id_str],
            |row| RawLoan::from_row(row, 0),
          )
          .optional()?;
        tx.commit()?;
        Ok((changed, raw))
      })
      .await?;

    match (changed, raw) {
      (_, None) => Err(Error::LoanNotFound(id)),
      (0, Some(_)) => Err(Error::AlreadyReturned(id)),
      (_, Some(raw)) => raw.into_loan(),
    }
  }

  async fn delete_loan(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM loans WHERE loan_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn list_loans<'a>(&'a self, query: &'a LoanQuery) -> Result<Vec<LoanDetail>> {
    // Build WHERE clause dynamically; `args` follows placeholder order.
    let mut conds: Vec<&'static str> = vec![];
    let mut args: Vec<Value> = vec![];

    if let Some(serial) = &query.serial_number {
      conds.push("c.serial_number = ?");
      args.push(Value::Text(serial.clone()));
    }
    if let Some(usn) = &query.usn {
      conds.push("b.usn = ?");
      args.push(Value::Text(usn.clone()));
    }
    if let Some(id) = query.borrower_id {
      conds.push("l.borrower_id = ?");
      args.push(Value::Text(encode_uuid(id)));
    }
    match query.state {
      Some(LoanState::Open) => conds.push("l.returned_at IS NULL"),
      Some(LoanState::Closed) => conds.push("l.returned_at IS NOT NULL"),
      None => {}
    }
    if let Some(before) = query.due_before {
      conds.push("l.due_at <= ?");
      args.push(Value::Text(encode_dt(before)));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    let sql = format!(
      "SELECT {LOAN_COLUMNS}, {BORROWER_COLUMNS}, {COPY_COLUMNS}
       FROM loans l
       JOIN borrowers b ON b.borrower_id = l.borrower_id
       JOIN copies    c ON c.copy_id     = l.copy_id
       {where_clause}
       ORDER BY l.issued_at, l.loan_id"
    );

    let raws: Vec<RawLoanDetail> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), RawLoanDetail::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLoanDetail::into_detail).collect()
  }
}
