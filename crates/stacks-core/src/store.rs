//! The `LendingStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `stacks-store-sqlite`).
//! The [`crate::Lending`] engine depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
  borrower::{Borrower, NewBorrower},
  copy::{BookCopy, NewCopy},
  loan::{Loan, LoanDetail, LoanState, NewLoan},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`LendingStore::list_loans`]. All filters are combined by
/// conjunction; an all-`None` query returns every loan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanQuery {
  /// Restrict to loans of the copy with this serial number.
  pub serial_number: Option<String>,
  /// Exact match on the borrower's enrollment code.
  pub usn:           Option<String>,
  pub borrower_id:   Option<Uuid>,
  pub state:         Option<LoanState>,
  /// Only loans due at or before this instant.
  pub due_before:    Option<DateTime<Utc>>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a lending store backend.
///
/// Backends must enforce the at-most-one-open-loan rule themselves: a
/// concurrent [`insert_loan`](Self::insert_loan) for a pair that already has an
/// open loan has to fail with an error that converts to
/// [`crate::Error::Conflict`], and [`close_loan`](Self::close_loan) must only
/// ever succeed once per loan.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait LendingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Borrowers ─────────────────────────────────────────────────────────

  fn add_borrower(
    &self,
    input: NewBorrower,
  ) -> impl Future<Output = Result<Borrower, Self::Error>> + Send + '_;

  fn get_borrower(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Borrower>, Self::Error>> + Send + '_;

  /// Look up a borrower by enrollment code, ignoring case and surrounding
  /// whitespace on both sides of the comparison.
  fn find_borrower_by_usn<'a>(
    &'a self,
    usn: &'a str,
  ) -> impl Future<Output = Result<Option<Borrower>, Self::Error>> + Send + 'a;

  // ── Copies ────────────────────────────────────────────────────────────

  fn add_copy(
    &self,
    input: NewCopy,
  ) -> impl Future<Output = Result<BookCopy, Self::Error>> + Send + '_;

  fn get_copy(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<BookCopy>, Self::Error>> + Send + '_;

  fn find_copy_by_serial<'a>(
    &'a self,
    serial_number: &'a str,
  ) -> impl Future<Output = Result<Option<BookCopy>, Self::Error>> + Send + 'a;

  // ── Loans ─────────────────────────────────────────────────────────────

  /// Persist a new open loan. The store assigns `loan_id`.
  fn insert_loan(
    &self,
    input: NewLoan,
  ) -> impl Future<Output = Result<Loan, Self::Error>> + Send + '_;

  fn get_loan(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Loan>, Self::Error>> + Send + '_;

  /// The open loan for `(borrower_id, copy_id)`, if any.
  fn find_open_loan(
    &self,
    borrower_id: Uuid,
    copy_id: Uuid,
  ) -> impl Future<Output = Result<Option<Loan>, Self::Error>> + Send + '_;

  /// Set `returned_at` and `late_fee` on an open loan and return the updated
  /// record. Fails if the loan is missing or already returned; never
  /// overwrites an existing return.
  fn close_loan(
    &self,
    id: Uuid,
    returned_at: DateTime<Utc>,
    late_fee: Decimal,
  ) -> impl Future<Output = Result<Loan, Self::Error>> + Send + '_;

  /// Hard-delete a loan in any state. Returns `false` if it did not exist.
  fn delete_loan(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Loans matching `query`, joined with their borrower and copy, ordered by
  /// issue time.
  fn list_loans<'a>(
    &'a self,
    query: &'a LoanQuery,
  ) -> impl Future<Output = Result<Vec<LoanDetail>, Self::Error>> + Send + 'a;
}
