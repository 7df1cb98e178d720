//! Checkout: issue a copy to a borrower as a new open loan.

use crate::{
  Error, Result,
  loan::{Loan, NewLoan},
  notify::Notifier,
  store::LendingStore,
};

use super::{Lending, from_store, required};

impl<S, N> Lending<S, N>
where
  S: LendingStore,
  N: Notifier,
{
  /// Issue the copy with `serial_number` to the borrower enrolled as `usn`.
  ///
  /// The borrower is matched case-insensitively after trimming. Fails with
  /// [`Error::Conflict`] while the borrower still holds an open loan of the
  /// same copy; the store's own uniqueness constraint backs this check up
  /// when two checkouts race.
  pub async fn checkout(&self, usn: &str, serial_number: &str) -> Result<Loan> {
    let usn = required("student_usn", usn)?;
    let serial_number = required("serial_number", serial_number)?;

    let borrower = self
      .store
      .find_borrower_by_usn(usn)
      .await
      .map_err(from_store)?
      .ok_or_else(|| Error::NotFound(format!("student {usn:?}")))?;

    let copy = self
      .store
      .find_copy_by_serial(serial_number)
      .await
      .map_err(from_store)?
      .ok_or_else(|| Error::NotFound(format!("book with serial {serial_number:?}")))?;

    if let Some(open) = self
      .store
      .find_open_loan(borrower.borrower_id, copy.copy_id)
      .await
      .map_err(from_store)?
    {
      return Err(Error::Conflict(format!(
        "{} already holds {} (loan {})",
        borrower.usn, copy.serial_number, open.loan_id
      )));
    }

    let issued_at = self.now();
    let due_at = self.policy.due_at(issued_at)?;
    let loan = self
      .store
      .insert_loan(NewLoan {
        borrower_id: borrower.borrower_id,
        copy_id: copy.copy_id,
        issued_at,
        due_at,
      })
      .await
      .map_err(from_store)?;

    tracing::info!(
      loan_id = %loan.loan_id,
      usn = %borrower.usn,
      serial = %copy.serial_number,
      due_at = %loan.due_at,
      "copy checked out"
    );
    Ok(loan)
  }
}
