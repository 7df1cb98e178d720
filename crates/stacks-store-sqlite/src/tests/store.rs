use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use stacks_core::{
  ErrorKind,
  borrower::NewBorrower,
  copy::NewCopy,
  loan::{LoanState, NewLoan},
  store::{LendingStore, LoanQuery},
};
use uuid::Uuid;

use super::{borrower, copy, store};
use crate::Error;

fn new_loan(borrower_id: Uuid, copy_id: Uuid) -> NewLoan {
  let issued_at = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
  NewLoan {
    borrower_id,
    copy_id,
    issued_at,
    due_at: issued_at + Duration::days(14),
  }
}

// ─── Borrowers ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_borrower() {
  let s = store().await;
  let b = borrower(&s, "1RV20CS001", "9876543210").await;

  let fetched = s.get_borrower(b.borrower_id).await.unwrap().unwrap();
  assert_eq!(fetched, b);
}

#[tokio::test]
async fn get_borrower_missing_returns_none() {
  let s = store().await;
  assert!(s.get_borrower(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn find_borrower_ignores_case_and_whitespace() {
  let s = store().await;
  let b = borrower(&s, "1RV20CS001", "").await;

  let found = s.find_borrower_by_usn("  1rv20cs001 ").await.unwrap();
  assert_eq!(found.map(|f| f.borrower_id), Some(b.borrower_id));
}

#[tokio::test]
async fn duplicate_usn_differing_only_in_case_is_rejected() {
  let s = store().await;
  borrower(&s, "1RV20CS001", "").await;

  let err = s
    .add_borrower(NewBorrower::new("1rv20cs001", "Someone Else"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateUsn(_)));
  assert_eq!(stacks_core::Error::from(err).kind(), ErrorKind::Conflict);
}

// ─── Copies ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_copy_and_find_by_serial() {
  let s = store().await;
  let c = copy(&s, "SN-001").await;

  let by_serial = s.find_copy_by_serial("SN-001").await.unwrap().unwrap();
  assert_eq!(by_serial, c);
  assert_eq!(by_serial.edition, Some(9));

  let by_id = s.get_copy(c.copy_id).await.unwrap().unwrap();
  assert_eq!(by_id.serial_number, "SN-001");

  assert!(s.find_copy_by_serial("SN-404").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_serial_is_rejected() {
  let s = store().await;
  copy(&s, "SN-001").await;

  let err = s.add_copy(NewCopy::new("SN-001", "Another")).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateSerial(ref serial) if serial == "SN-001"));
}

// ─── Loans ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_loan() {
  let s = store().await;
  let b = borrower(&s, "U1", "").await;
  let c = copy(&s, "SN-001").await;

  let loan = s.insert_loan(new_loan(b.borrower_id, c.copy_id)).await.unwrap();
  assert!(loan.is_open());
  assert_eq!(loan.late_fee, Decimal::ZERO);

  let fetched = s.get_loan(loan.loan_id).await.unwrap().unwrap();
  assert_eq!(fetched, loan);

  let open = s.find_open_loan(b.borrower_id, c.copy_id).await.unwrap();
  assert_eq!(open.map(|l| l.loan_id), Some(loan.loan_id));
}

#[tokio::test]
async fn second_open_loan_for_pair_is_rejected_by_index() {
  let s = store().await;
  let b = borrower(&s, "U1", "").await;
  let c = copy(&s, "SN-001").await;

  s.insert_loan(new_loan(b.borrower_id, c.copy_id)).await.unwrap();
  let err = s
    .insert_loan(new_loan(b.borrower_id, c.copy_id))
    .await
    .unwrap_err();

  assert!(matches!(err, Error::OpenLoanExists { borrower_id, copy_id }
    if borrower_id == b.borrower_id && copy_id == c.copy_id));
  assert_eq!(stacks_core::Error::from(err).kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn concurrent_inserts_leave_one_open_loan() {
  let s = store().await;
  let b = borrower(&s, "U1", "").await;
  let c = copy(&s, "SN-001").await;

  let (bid, cid) = (b.borrower_id, c.copy_id);
  let (s1, s2) = (s.clone(), s.clone());
  let first = tokio::spawn(async move { s1.insert_loan(new_loan(bid, cid)).await });
  let second = tokio::spawn(async move { s2.insert_loan(new_loan(bid, cid)).await });

  let results = [first.await.unwrap(), second.await.unwrap()];
  assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);

  let open = s
    .list_loans(&LoanQuery { state: Some(LoanState::Open), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(open.len(), 1);
}

#[tokio::test]
async fn other_borrower_may_hold_same_copy() {
  let s = store().await;
  let a = borrower(&s, "U1", "").await;
  let b = borrower(&s, "U2", "").await;
  let c = copy(&s, "SN-001").await;

  s.insert_loan(new_loan(a.borrower_id, c.copy_id)).await.unwrap();
  s.insert_loan(new_loan(b.borrower_id, c.copy_id)).await.unwrap();
}

#[tokio::test]
async fn close_loan_records_return_and_fee() {
  let s = store().await;
  let b = borrower(&s, "U1", "").await;
  let c = copy(&s, "SN-001").await;
  let loan = s.insert_loan(new_loan(b.borrower_id, c.copy_id)).await.unwrap();

  let returned_at = loan.due_at + Duration::days(3);
  let closed = s
    .close_loan(loan.loan_id, returned_at, Decimal::from(30))
    .await
    .unwrap();

  assert_eq!(closed.returned_at, Some(returned_at));
  assert_eq!(closed.late_fee, Decimal::from(30));
  assert_eq!(closed.state(), LoanState::Closed);
  assert!(s.find_open_loan(b.borrower_id, c.copy_id).await.unwrap().is_none());
}

#[tokio::test]
async fn close_loan_twice_keeps_first_return() {
  let s = store().await;
  let b = borrower(&s, "U1", "").await;
  let c = copy(&s, "SN-001").await;
  let loan = s.insert_loan(new_loan(b.borrower_id, c.copy_id)).await.unwrap();

  let first = s
    .close_loan(loan.loan_id, loan.due_at, Decimal::ZERO)
    .await
    .unwrap();
  let err = s
    .close_loan(loan.loan_id, loan.due_at + Duration::days(9), Decimal::from(90))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AlreadyReturned(id) if id == loan.loan_id));
  assert_eq!(stacks_core::Error::from(err).kind(), ErrorKind::InvalidState);

  let stored = s.get_loan(loan.loan_id).await.unwrap().unwrap();
  assert_eq!(stored, first);
}

#[tokio::test]
async fn close_missing_loan_errors() {
  let s = store().await;
  let err = s
    .close_loan(Uuid::new_v4(), Utc::now(), Decimal::ZERO)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::LoanNotFound(_)));
}

#[tokio::test]
async fn closed_loan_frees_the_pair() {
  let s = store().await;
  let b = borrower(&s, "U1", "").await;
  let c = copy(&s, "SN-001").await;
  let loan = s.insert_loan(new_loan(b.borrower_id, c.copy_id)).await.unwrap();
  s.close_loan(loan.loan_id, loan.due_at, Decimal::ZERO).await.unwrap();

  let again = s.insert_loan(new_loan(b.borrower_id, c.copy_id)).await.unwrap();
  assert_ne!(again.loan_id, loan.loan_id);
}

#[tokio::test]
async fn delete_loan_in_any_state() {
  let s = store().await;
  let b = borrower(&s, "U1", "").await;
  let c = copy(&s, "SN-001").await;
  let loan = s.insert_loan(new_loan(b.borrower_id, c.copy_id)).await.unwrap();
  s.close_loan(loan.loan_id, loan.due_at, Decimal::ZERO).await.unwrap();

  assert!(s.delete_loan(loan.loan_id).await.unwrap());
  assert!(s.get_loan(loan.loan_id).await.unwrap().is_none());
  assert!(!s.delete_loan(loan.loan_id).await.unwrap());
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_loans_joins_and_filters() {
  let s = store().await;
  let alice = borrower(&s, "U1", "").await;
  let bob = borrower(&s, "U2", "").await;
  let c1 = copy(&s, "SN-001").await;
  let c2 = copy(&s, "SN-002").await;
  copy(&s, "SN-003").await;

  s.insert_loan(new_loan(alice.borrower_id, c1.copy_id)).await.unwrap();
  s.insert_loan(new_loan(alice.borrower_id, c2.copy_id)).await.unwrap();
  s.insert_loan(new_loan(bob.borrower_id, c1.copy_id)).await.unwrap();

  let all = s.list_loans(&LoanQuery::default()).await.unwrap();
  assert_eq!(all.len(), 3);
  assert!(all.iter().all(|d| d.loan.borrower_id == d.borrower.borrower_id
    && d.loan.copy_id == d.copy.copy_id));

  let by_serial = s
    .list_loans(&LoanQuery { serial_number: Some("SN-001".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_serial.len(), 2);

  let by_usn = s
    .list_loans(&LoanQuery { usn: Some("U1".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_usn.len(), 2);

  let both = s
    .list_loans(&LoanQuery {
      serial_number: Some("SN-001".into()),
      usn: Some("U2".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(both.len(), 1);
  assert_eq!(both[0].borrower.usn, "U2");

  let never_lent = s
    .list_loans(&LoanQuery { serial_number: Some("SN-003".into()), ..Default::default() })
    .await
    .unwrap();
  assert!(never_lent.is_empty());
}

#[tokio::test]
async fn usn_filter_is_exact() {
  let s = store().await;
  let b = borrower(&s, "U1", "").await;
  let c = copy(&s, "SN-001").await;
  s.insert_loan(new_loan(b.borrower_id, c.copy_id)).await.unwrap();

  let found = s
    .list_loans(&LoanQuery { usn: Some("u1".into()), ..Default::default() })
    .await
    .unwrap();
  assert!(found.is_empty());
}

#[tokio::test]
async fn list_loans_by_state_and_due_date() {
  let s = store().await;
  let b = borrower(&s, "U1", "").await;
  let c1 = copy(&s, "SN-001").await;
  let c2 = copy(&s, "SN-002").await;

  let open = s.insert_loan(new_loan(b.borrower_id, c1.copy_id)).await.unwrap();
  let closed = s.insert_loan(new_loan(b.borrower_id, c2.copy_id)).await.unwrap();
  s.close_loan(closed.loan_id, closed.due_at, Decimal::ZERO).await.unwrap();

  let open_only = s
    .list_loans(&LoanQuery { state: Some(LoanState::Open), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(open_only.len(), 1);
  assert_eq!(open_only[0].loan.loan_id, open.loan_id);
  assert_eq!(open_only[0].state, LoanState::Open);

  let closed_only = s
    .list_loans(&LoanQuery { state: Some(LoanState::Closed), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(closed_only.len(), 1);

  // The due-date bound is inclusive.
  let at_due = s
    .list_loans(&LoanQuery { due_before: Some(open.due_at), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(at_due.len(), 2);

  let before_due = s
    .list_loans(&LoanQuery {
      due_before: Some(open.due_at - Duration::seconds(1)),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(before_due.is_empty());
}
