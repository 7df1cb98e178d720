//! Lending rules that vary per deployment.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Longest accepted loan period, in days.
pub const MAX_LOAN_PERIOD_DAYS: i64 = 3650;

/// Longest accepted reminder lookahead, in days.
pub const MAX_REMINDER_WINDOW_DAYS: i64 = 365;

/// A [`LendingPolicy`] value outside its accepted range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
  #[error("loan_period_days must be between 1 and {MAX_LOAN_PERIOD_DAYS}, got {0}")]
  LoanPeriod(i64),

  #[error("reminder_window_days must be between 0 and {MAX_REMINDER_WINDOW_DAYS}, got {0}")]
  ReminderWindow(i64),

  #[error("late_fee_per_day must not be negative, got {0}")]
  LateFee(Decimal),

  #[error("{0} falls outside the supported date range")]
  OutOfRange(&'static str),
}

/// Loan period, fee rate and reminder settings.
///
/// Every field has a default so a partial `[policy]` table in the
/// configuration file is enough.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LendingPolicy {
  /// Days between issue and due date.
  pub loan_period_days:     i64,
  /// Currency units charged per whole day past the due date.
  pub late_fee_per_day:     Decimal,
  /// Lookahead for windowed reminders, inclusive.
  pub reminder_window_days: i64,
  /// Prefix applied to phone numbers without an international `+` prefix.
  /// Shared by the windowed and targeted reminder paths.
  pub default_country_code: String,
}

impl Default for LendingPolicy {
  fn default() -> Self {
    Self {
      loan_period_days:     14,
      late_fee_per_day:     Decimal::TEN,
      reminder_window_days: 2,
      default_country_code: "+91".to_owned(),
    }
  }
}

impl LendingPolicy {
  /// Check every field against its accepted range.
  pub fn validate(&self) -> Result<(), PolicyError> {
    if !(1..=MAX_LOAN_PERIOD_DAYS).contains(&self.loan_period_days) {
      return Err(PolicyError::LoanPeriod(self.loan_period_days));
    }
    if !(0..=MAX_REMINDER_WINDOW_DAYS).contains(&self.reminder_window_days) {
      return Err(PolicyError::ReminderWindow(self.reminder_window_days));
    }
    if self.late_fee_per_day.is_sign_negative() {
      return Err(PolicyError::LateFee(self.late_fee_per_day));
    }
    Ok(())
  }

  pub fn loan_period(&self) -> Duration { Duration::days(self.loan_period_days) }

  pub fn reminder_window(&self) -> Duration {
    Duration::days(self.reminder_window_days)
  }

  /// Due date for a loan issued at `issued_at`.
  pub fn due_at(&self, issued_at: DateTime<Utc>) -> Result<DateTime<Utc>, PolicyError> {
    self.validate()?;
    issued_at
      .checked_add_signed(self.loan_period())
      .ok_or(PolicyError::OutOfRange("due date"))
  }

  /// Latest due date picked up by windowed reminders at `now`.
  pub fn reminder_horizon(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, PolicyError> {
    self.validate()?;
    now
      .checked_add_signed(self.reminder_window())
      .ok_or(PolicyError::OutOfRange("reminder horizon"))
  }
}
