//! Handlers for `/transactions` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/transactions` | All loans, joined; explicit `empty` flag |
//! | `POST`   | `/transactions` | Body: [`CheckoutBody`]; returns 201 + loan |
//! | `GET`    | `/transactions/search` | Optional `serial_number`, `student_usn` |
//! | `GET`    | `/transactions/{id}` | Single joined loan |
//! | `DELETE` | `/transactions/{id}` | Hard delete, any state |
//! | `PUT`    | `/transactions/{id}/return` | Closes the loan, computes the fee |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use stacks_core::{
  Lending,
  lending::LoanSearch,
  loan::{Loan, LoanDetail, LoanListing},
  notify::Notifier,
  store::LendingStore,
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── List / search ────────────────────────────────────────────────────────────

/// `GET /transactions`
pub async fn list<S, N>(
  State(lending): State<Arc<Lending<S, N>>>,
) -> Result<Json<LoanListing>, ApiError>
where
  S: LendingStore,
  N: Notifier,
{
  Ok(Json(lending.list().await?))
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  pub serial_number: Option<String>,
  pub student_usn:   Option<String>,
}

/// `GET /transactions/search[?serial_number=...][&student_usn=...]`
pub async fn search<S, N>(
  State(lending): State<Arc<Lending<S, N>>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<LoanListing>, ApiError>
where
  S: LendingStore,
  N: Notifier,
{
  let search = LoanSearch {
    serial_number: params.serial_number,
    usn:           params.student_usn,
  };
  Ok(Json(lending.search(&search).await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /transactions/{id}`
pub async fn get_one<S, N>(
  State(lending): State<Arc<Lending<S, N>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<LoanDetail>, ApiError>
where
  S: LendingStore,
  N: Notifier,
{
  Ok(Json(lending.loan(id).await?))
}

// ─── Checkout ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /transactions`.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
  pub student_usn:   String,
  pub serial_number: String,
}

/// `POST /transactions`: returns 201 + the new open [`Loan`].
pub async fn checkout<S, N>(
  State(lending): State<Arc<Lending<S, N>>>,
  Json(body): Json<CheckoutBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LendingStore,
  N: Notifier,
{
  let loan = lending.checkout(&body.student_usn, &body.serial_number).await?;
  Ok((StatusCode::CREATED, Json(loan)))
}

// ─── Return ───────────────────────────────────────────────────────────────────

/// `PUT /transactions/{id}/return`: returns the closed loan with its fee.
pub async fn return_one<S, N>(
  State(lending): State<Arc<Lending<S, N>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Loan>, ApiError>
where
  S: LendingStore,
  N: Notifier,
{
  Ok(Json(lending.return_loan(id).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /transactions/{id}`
pub async fn delete_one<S, N>(
  State(lending): State<Arc<Lending<S, N>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: LendingStore,
  N: Notifier,
{
  lending.delete_loan(id).await?;
  Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}
