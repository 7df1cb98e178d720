//! Late-fee arithmetic.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Whole days between `due_at` and `returned_at`, truncated; zero when the
/// copy came back on or before the due instant.
pub fn days_late(due_at: DateTime<Utc>, returned_at: DateTime<Utc>) -> i64 {
  let hours = (returned_at - due_at).num_hours();
  if hours <= 0 { 0 } else { hours / 24 }
}

/// `days_late * per_day`.
pub fn late_fee(
  due_at: DateTime<Utc>,
  returned_at: DateTime<Utc>,
  per_day: Decimal,
) -> Decimal {
  Decimal::from(days_late(due_at, returned_at)) * per_day
}
