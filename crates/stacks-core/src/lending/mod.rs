//! The lending transaction engine.
//!
//! [`Lending`] owns no state of its own beyond its collaborators: every rule
//! is evaluated against the injected [`LendingStore`], and "now" comes from
//! the injected [`Clock`].
//!
//! | Component | Entry points |
//! |-----------|--------------|
//! | Checkout | [`Lending::checkout`] |
//! | Return & fee | [`Lending::return_loan`] |
//! | Reminders | [`Lending::send_due_reminders`], [`Lending::send_reminders_for`] |
//! | Query | [`Lending::list`], [`Lending::search`], [`Lending::loan`] |

mod checkout;
mod query;
mod reminders;
mod returns;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use query::LoanSearch;
pub use reminders::{ReminderReport, ReminderTarget};

use crate::{
  Error, Result,
  borrower::{Borrower, NewBorrower},
  clock::{Clock, SystemClock},
  copy::{BookCopy, NewCopy},
  notify::Notifier,
  policy::LendingPolicy,
  store::LendingStore,
};

pub struct Lending<S, N> {
  store:    Arc<S>,
  notifier: N,
  policy:   LendingPolicy,
  clock:    Arc<dyn Clock>,
}

impl<S, N> Lending<S, N>
where
  S: LendingStore,
  N: Notifier,
{
  pub fn new(store: Arc<S>, notifier: N, policy: LendingPolicy) -> Self {
    Self { store, notifier, policy, clock: Arc::new(SystemClock) }
  }

  /// Replace the wall clock, e.g. with a [`crate::clock::ManualClock`].
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn notifier(&self) -> &N { &self.notifier }

  pub fn policy(&self) -> &LendingPolicy { &self.policy }

  fn now(&self) -> DateTime<Utc> { self.clock.now() }

  // ── Master records ────────────────────────────────────────────────────

  /// Register a borrower. `usn` and `name` must be non-blank; a `usn` that
  /// collides case-insensitively with an existing one is a conflict.
  pub async fn register_borrower(&self, mut input: NewBorrower) -> Result<Borrower> {
    input.usn = required("usn", &input.usn)?.to_owned();
    input.name = required("name", &input.name)?.to_owned();
    input.phone = input.phone.trim().to_owned();

    let borrower = self.store.add_borrower(input).await.map_err(from_store)?;
    tracing::info!(usn = %borrower.usn, borrower_id = %borrower.borrower_id, "borrower registered");
    Ok(borrower)
  }

  /// Register a physical copy. `serial_number` and `title` must be non-blank.
  pub async fn register_copy(&self, mut input: NewCopy) -> Result<BookCopy> {
    input.serial_number = required("serial_number", &input.serial_number)?.to_owned();
    input.title = required("title", &input.title)?.to_owned();

    let copy = self.store.add_copy(input).await.map_err(from_store)?;
    tracing::info!(serial = %copy.serial_number, copy_id = %copy.copy_id, "copy registered");
    Ok(copy)
  }

  pub async fn borrower(&self, id: Uuid) -> Result<Borrower> {
    self
      .store
      .get_borrower(id)
      .await
      .map_err(from_store)?
      .ok_or_else(|| Error::NotFound(format!("borrower {id}")))
  }

  pub async fn copy(&self, id: Uuid) -> Result<BookCopy> {
    self
      .store
      .get_copy(id)
      .await
      .map_err(from_store)?
      .ok_or_else(|| Error::NotFound(format!("copy {id}")))
  }

  // ── Administration ────────────────────────────────────────────────────

  /// Hard-delete a loan regardless of its state.
  pub async fn delete_loan(&self, id: Uuid) -> Result<()> {
    if !self.store.delete_loan(id).await.map_err(from_store)? {
      return Err(Error::NotFound(format!("loan {id}")));
    }
    tracing::info!(loan_id = %id, "loan deleted");
    Ok(())
  }
}

/// Convert a backend error into the engine's error.
fn from_store<E: Into<Error>>(e: E) -> Error { e.into() }

/// Trimmed `value`, or [`Error::InvalidInput`] naming `field` if blank.
fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
  let value = value.trim();
  if value.is_empty() {
    return Err(Error::InvalidInput(format!("{field} is required")));
  }
  Ok(value)
}

/// `Some(trimmed)` unless blank.
fn non_blank(value: Option<&str>) -> Option<String> {
  value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}
