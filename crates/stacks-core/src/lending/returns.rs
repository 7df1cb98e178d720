//! Return: close an open loan and charge its late fee.

use uuid::Uuid;

use crate::{
  Error, Result,
  fee::late_fee,
  loan::Loan,
  notify::Notifier,
  store::LendingStore,
};

use super::{Lending, from_store};

impl<S, N> Lending<S, N>
where
  S: LendingStore,
  N: Notifier,
{
  /// Close an open loan and record its late fee.
  ///
  /// A second return of the same loan is rejected with
  /// [`Error::InvalidState`]; the stored return time and fee are untouched.
  pub async fn return_loan(&self, loan_id: Uuid) -> Result<Loan> {
    let loan = self
      .store
      .get_loan(loan_id)
      .await
      .map_err(from_store)?
      .ok_or_else(|| Error::NotFound(format!("loan {loan_id}")))?;

    if let Some(at) = loan.returned_at {
      return Err(Error::InvalidState(format!(
        "loan {loan_id} was already returned at {at}"
      )));
    }

    let returned_at = self.now();
    let fee = late_fee(loan.due_at, returned_at, self.policy.late_fee_per_day);

    let closed = self
      .store
      .close_loan(loan_id, returned_at, fee)
      .await
      .map_err(from_store)?;

    tracing::info!(loan_id = %loan_id, late_fee = %closed.late_fee, "copy returned");
    Ok(closed)
  }
}
