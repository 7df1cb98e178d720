//! BookCopy: one physical instance of a catalog title.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCopy {
  pub copy_id:       Uuid,
  pub serial_number: String,
  pub rack_number:   String,
  // Catalog back-reference; the catalog owns these fields.
  pub title:         String,
  pub author:        String,
  pub edition:       Option<u32>,
  pub publisher:     Option<String>,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::LendingStore::add_copy`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewCopy {
  pub serial_number: String,
  #[serde(default)]
  pub rack_number:   String,
  pub title:         String,
  #[serde(default)]
  pub author:        String,
  pub edition:       Option<u32>,
  pub publisher:     Option<String>,
}

impl NewCopy {
  pub fn new(serial_number: impl Into<String>, title: impl Into<String>) -> Self {
    Self {
      serial_number: serial_number.into(),
      rack_number:   String::new(),
      title:         title.into(),
      author:        String::new(),
      edition:       None,
      publisher:     None,
    }
  }
}
