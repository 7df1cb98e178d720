//! Loan, the lending transaction at the centre of the engine.
//!
//! A loan is created Open by checkout and closed exactly once by a return.
//! `returned_at` and `late_fee` are written together by that single
//! transition and never change afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{borrower::Borrower, copy::BookCopy};

// ─── State ───────────────────────────────────────────────────────────────────

/// Lifecycle state of a loan, derived from `returned_at`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LoanState {
  Open,
  Closed,
}

// ─── Loan ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
  pub loan_id:     Uuid,
  /// References the borrower by value; the loan does not own it.
  pub borrower_id: Uuid,
  pub copy_id:     Uuid,
  pub issued_at:   DateTime<Utc>,
  pub due_at:      DateTime<Utc>,
  pub returned_at: Option<DateTime<Utc>>,
  /// Computed once at return time; zero while the loan is open.
  pub late_fee:    Decimal,
}

impl Loan {
  pub fn state(&self) -> LoanState {
    if self.returned_at.is_some() {
      LoanState::Closed
    } else {
      LoanState::Open
    }
  }

  pub fn is_open(&self) -> bool { self.returned_at.is_none() }
}

/// Input to [`crate::store::LendingStore::insert_loan`]. The store assigns
/// `loan_id`; timestamps are decided by the engine.
#[derive(Debug, Clone)]
pub struct NewLoan {
  pub borrower_id: Uuid,
  pub copy_id:     Uuid,
  pub issued_at:   DateTime<Utc>,
  pub due_at:      DateTime<Utc>,
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// A loan joined with the borrower and copy it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDetail {
  #[serde(flatten)]
  pub loan:     Loan,
  pub state:    LoanState,
  pub borrower: Borrower,
  pub copy:     BookCopy,
}

impl LoanDetail {
  pub fn new(loan: Loan, borrower: Borrower, copy: BookCopy) -> Self {
    let state = loan.state();
    Self { loan, state, borrower, copy }
  }
}

/// Result of a transaction listing. An empty listing is a success, flagged
/// explicitly so clients need not inspect the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanListing {
  pub empty:   bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  pub loans:   Vec<LoanDetail>,
}

impl From<Vec<LoanDetail>> for LoanListing {
  fn from(loans: Vec<LoanDetail>) -> Self {
    let empty = loans.is_empty();
    Self {
      empty,
      message: empty.then(|| "No transactions found".to_owned()),
      loans,
    }
  }
}
