//! The outbound notifier seam and the helpers that prepare its input.

use std::future::Future;

use chrono::NaiveDate;

/// A black-box message transport (SMS in production).
///
/// One call is one delivery attempt; the engine never retries.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send<'a>(
    &'a self,
    to: &'a str,
    body: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Turn a stored phone number into a dialable international form.
///
/// Returns `None` for a blank number or one with no digits besides trunk
/// zeros. Numbers already starting with `+` are
/// kept; otherwise leading trunk zeros are dropped and `country_code` is
/// prefixed.
pub fn normalize_phone(raw: &str, country_code: &str) -> Option<String> {
  let phone = raw.trim();
  if phone.is_empty() {
    return None;
  }
  if phone.starts_with('+') {
    return Some(phone.to_owned());
  }

  let national = phone.trim_start_matches('0');
  if national.is_empty() {
    return None;
  }
  let code = country_code.trim().trim_start_matches('+');
  Some(format!("+{code}{national}"))
}

/// The reminder text sent to a borrower.
pub fn reminder_message(name: &str, due: NaiveDate) -> String {
  format!(
    "Hello {name}, this is a reminder: Your book is due on {}. Please return \
     it on time.",
    due.format("%Y-%m-%d")
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_phone_is_rejected() {
    assert_eq!(normalize_phone("", "+91"), None);
    assert_eq!(normalize_phone("   ", "+91"), None);
    assert_eq!(normalize_phone("000", "+91"), None);
    assert_eq!(normalize_phone(" 0 ", "91"), None);
  }

  #[test]
  fn international_numbers_are_kept() {
    assert_eq!(
      normalize_phone(" +14155550100 ", "+91").as_deref(),
      Some("+14155550100")
    );
  }

  #[test]
  fn national_numbers_get_the_country_code() {
    assert_eq!(
      normalize_phone("9876543210", "+91").as_deref(),
      Some("+919876543210")
    );
    assert_eq!(
      normalize_phone("09876543210", "91").as_deref(),
      Some("+919876543210")
    );
  }

  #[test]
  fn message_contains_name_and_calendar_date() {
    let due = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    assert_eq!(
      reminder_message("Asha", due),
      "Hello Asha, this is a reminder: Your book is due on 2024-03-05. \
       Please return it on time."
    );
  }
}
