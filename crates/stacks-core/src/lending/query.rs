//! Read-side listing and search over loans joined with borrower and copy.

use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  loan::{LoanDetail, LoanListing},
  notify::Notifier,
  store::{LendingStore, LoanQuery},
};

use super::{Lending, from_store, non_blank};

/// Filters for [`Lending::search`]. Blank values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoanSearch {
  pub serial_number: Option<String>,
  pub usn:           Option<String>,
}

impl<S, N> Lending<S, N>
where
  S: LendingStore,
  N: Notifier,
{
  /// Every loan, with borrower and copy joined in.
  pub async fn list(&self) -> Result<LoanListing> {
    self.search(&LoanSearch::default()).await
  }

  /// Loans matching both filters, if given.
  pub async fn search(&self, search: &LoanSearch) -> Result<LoanListing> {
    let query = LoanQuery {
      serial_number: non_blank(search.serial_number.as_deref()),
      usn: non_blank(search.usn.as_deref()),
      ..LoanQuery::default()
    };

    let loans = self.store.list_loans(&query).await.map_err(from_store)?;
    tracing::debug!(?query, found = loans.len(), "loan search");
    Ok(LoanListing::from(loans))
  }

  pub async fn loan(&self, loan_id: Uuid) -> Result<LoanDetail> {
    let loan = self
      .store
      .get_loan(loan_id)
      .await
      .map_err(from_store)?
      .ok_or_else(|| Error::NotFound(format!("loan {loan_id}")))?;

    let borrower = self.borrower(loan.borrower_id).await?;
    let copy = self.copy(loan.copy_id).await?;
    Ok(LoanDetail::new(loan, borrower, copy))
  }
}
