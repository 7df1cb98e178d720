//! Tests for `SqliteStore` and for the lending engine running on top of it,
//! all against an in-memory database.

mod store;

use std::{collections::HashSet, sync::Mutex};

use stacks_core::{
  borrower::{Borrower, NewBorrower},
  copy::{BookCopy, NewCopy},
  notify::Notifier,
  store::LendingStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn borrower(s: &SqliteStore, usn: &str, phone: &str) -> Borrower {
  s.add_borrower(NewBorrower::new(usn, format!("Student {usn}")).with_phone(phone))
    .await
    .unwrap()
}

async fn copy(s: &SqliteStore, serial: &str) -> BookCopy {
  let mut input = NewCopy::new(serial, "Operating System Concepts");
  input.author = "Silberschatz".into();
  input.rack_number = "R-12".into();
  input.edition = Some(9);
  s.add_copy(input).await.unwrap()
}

// ─── Notifier double ─────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("transport refused {0}")]
struct SendError(String);

/// Records every delivered message; fails for numbers in `refuse`.
#[derive(Default)]
struct RecordingNotifier {
  sent:   Mutex<Vec<(String, String)>>,
  refuse: HashSet<String>,
}

impl RecordingNotifier {
  fn refusing(numbers: &[&str]) -> Self {
    Self {
      sent:   Mutex::default(),
      refuse: numbers.iter().map(|n| n.to_string()).collect(),
    }
  }

  fn sent(&self) -> Vec<(String, String)> { self.sent.lock().unwrap().clone() }
}

impl Notifier for RecordingNotifier {
  type Error = SendError;

  async fn send(&self, to: &str, body: &str) -> Result<(), SendError> {
    if self.refuse.contains(to) {
      return Err(SendError(to.to_owned()));
    }
    self.sent.lock().unwrap().push((to.to_owned(), body.to_owned()));
    Ok(())
  }
}
