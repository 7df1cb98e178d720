//! Due-date reminders: pick the loans to remind and send one SMS per loan.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  loan::{LoanDetail, LoanState},
  notify::{Notifier, normalize_phone, reminder_message},
  store::{LendingStore, LoanQuery},
};

use super::{Lending, from_store, non_blank};

/// Selects the borrower for a targeted reminder. At least one field must be
/// set; when both are, a loan must match both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReminderTarget {
  pub borrower_id: Option<Uuid>,
  pub usn:         Option<String>,
}

/// Outcome of one reminder invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderReport {
  /// Loans returned by the selection query.
  pub selected: usize,
  pub sent:     usize,
  /// Borrowers without a phone number.
  pub skipped:  usize,
  /// Notifier errors.
  pub failed:   usize,
}

impl<S, N> Lending<S, N>
where
  S: LendingStore,
  N: Notifier,
{
  /// Remind every borrower whose open loan falls due within the reminder
  /// window (already-overdue open loans included).
  ///
  /// Only a failing selection query fails the call; per-borrower problems
  /// are logged and counted in the report.
  pub async fn send_due_reminders(&self) -> Result<ReminderReport> {
    let horizon = self.policy.reminder_horizon(self.now())?;
    let query = LoanQuery {
      state: Some(LoanState::Open),
      due_before: Some(horizon),
      ..LoanQuery::default()
    };

    let loans = self.select_for_reminder(&query).await?;
    Ok(self.dispatch(&loans).await)
  }

  /// Remind one borrower about each of their loans, whatever their due date.
  pub async fn send_reminders_for(&self, target: &ReminderTarget) -> Result<ReminderReport> {
    let usn = non_blank(target.usn.as_deref());
    if target.borrower_id.is_none() && usn.is_none() {
      return Err(Error::InvalidInput(
        "provide either student_id or usn".to_owned(),
      ));
    }

    let query = LoanQuery {
      borrower_id: target.borrower_id,
      usn,
      ..LoanQuery::default()
    };

    let loans = self.select_for_reminder(&query).await?;
    Ok(self.dispatch(&loans).await)
  }

  async fn select_for_reminder(&self, query: &LoanQuery) -> Result<Vec<LoanDetail>> {
    self.store.list_loans(query).await.map_err(|e| {
      let e = from_store(e);
      tracing::error!(error = %e, "failed to select loans for reminders");
      e
    })
  }

  /// One delivery attempt per loan; failures never abort the batch.
  async fn dispatch(&self, loans: &[LoanDetail]) -> ReminderReport {
    let mut report = ReminderReport { selected: loans.len(), ..ReminderReport::default() };

    for detail in loans {
      let borrower = &detail.borrower;
      let loan_id = detail.loan.loan_id;

      let Some(phone) =
        normalize_phone(&borrower.phone, &self.policy.default_country_code)
      else {
        tracing::warn!(%loan_id, usn = %borrower.usn, "no usable phone number for borrower; skipping reminder");
        report.skipped += 1;
        continue;
      };

      let body = reminder_message(&borrower.name, detail.loan.due_at.date_naive());
      match self.notifier.send(&phone, &body).await {
        Ok(()) => {
          tracing::debug!(%loan_id, usn = %borrower.usn, "reminder sent");
          report.sent += 1;
        }
        Err(e) => {
          tracing::error!(%loan_id, usn = %borrower.usn, error = %e, "failed to send reminder");
          report.failed += 1;
        }
      }
    }

    tracing::info!(
      selected = report.selected,
      sent = report.sent,
      skipped = report.skipped,
      failed = report.failed,
      "reminder dispatch finished"
    );
    report
  }
}
