//! Borrower: a student eligible to hold loans.
//!
//! The roster itself is owned elsewhere; the engine only reads identity, name
//! and phone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
  pub borrower_id:   Uuid,
  /// Enrollment code. Unique case-insensitively after trimming.
  pub usn:           String,
  pub name:          String,
  /// May be empty; reminders skip borrowers without a phone.
  pub phone:         String,
  pub registered_at: DateTime<Utc>,
  pub expires_at:    Option<DateTime<Utc>>,
}

/// Input to [`crate::store::LendingStore::add_borrower`].
/// `borrower_id` and `registered_at` are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBorrower {
  pub usn:        String,
  pub name:       String,
  #[serde(default)]
  pub phone:      String,
  pub expires_at: Option<DateTime<Utc>>,
}

impl NewBorrower {
  pub fn new(usn: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      usn:        usn.into(),
      name:       name.into(),
      phone:      String::new(),
      expires_at: None,
    }
  }

  pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
    self.phone = phone.into();
    self
  }
}
