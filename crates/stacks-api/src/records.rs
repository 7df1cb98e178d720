//! Minimal registration endpoints for the records the engine reads.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/students` | Body: [`NewBorrower`]; 409 on duplicate usn |
//! | `GET`  | `/students/{id}` | 404 if not found |
//! | `POST` | `/books` | Body: [`NewCopy`]; 409 on duplicate serial |
//! | `GET`  | `/books/{id}` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use stacks_core::{
  Lending,
  borrower::{Borrower, NewBorrower},
  copy::{BookCopy, NewCopy},
  notify::Notifier,
  store::LendingStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `POST /students`
pub async fn create_student<S, N>(
  State(lending): State<Arc<Lending<S, N>>>,
  Json(body): Json<NewBorrower>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LendingStore,
  N: Notifier,
{
  let borrower = lending.register_borrower(body).await?;
  Ok((StatusCode::CREATED, Json(borrower)))
}

/// `GET /students/{id}`
pub async fn get_student<S, N>(
  State(lending): State<Arc<Lending<S, N>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Borrower>, ApiError>
where
  S: LendingStore,
  N: Notifier,
{
  Ok(Json(lending.borrower(id).await?))
}

/// `POST /books`
pub async fn create_book<S, N>(
  State(lending): State<Arc<Lending<S, N>>>,
  Json(body): Json<NewCopy>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LendingStore,
  N: Notifier,
{
  let copy = lending.register_copy(body).await?;
  Ok((StatusCode::CREATED, Json(copy)))
}

/// `GET /books/{id}`
pub async fn get_book<S, N>(
  State(lending): State<Arc<Lending<S, N>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<BookCopy>, ApiError>
where
  S: LendingStore,
  N: Notifier,
{
  Ok(Json(lending.copy(id).await?))
}
