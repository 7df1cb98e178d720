//! Handlers that trigger reminder dispatch on demand.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/reminders/due` | Every open loan due within the reminder window |
//! | `GET`  | `/send-reminders` | `?student_id` and/or `?usn`; one is required |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use stacks_core::{
  Lending,
  lending::{ReminderReport, ReminderTarget},
  notify::Notifier,
  store::LendingStore,
};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
  pub message: &'static str,
  pub report:  ReminderReport,
}

/// `POST /reminders/due`
pub async fn due<S, N>(
  State(lending): State<Arc<Lending<S, N>>>,
) -> Result<Json<ReminderResponse>, ApiError>
where
  S: LendingStore,
  N: Notifier,
{
  let report = lending.send_due_reminders().await?;
  Ok(Json(ReminderResponse { message: "Reminder check triggered", report }))
}

#[derive(Debug, Deserialize, Default)]
pub struct TargetParams {
  /// Borrower UUID; blank is treated as absent.
  pub student_id: Option<String>,
  pub usn:        Option<String>,
}

/// `GET /send-reminders[?student_id=...][&usn=...]`
pub async fn targeted<S, N>(
  State(lending): State<Arc<Lending<S, N>>>,
  Query(params): Query<TargetParams>,
) -> Result<Json<ReminderResponse>, ApiError>
where
  S: LendingStore,
  N: Notifier,
{
  let borrower_id = params
    .student_id
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(Uuid::parse_str)
    .transpose()
    .map_err(|e| ApiError::BadRequest(format!("invalid student_id: {e}")))?;

  let target = ReminderTarget { borrower_id, usn: params.usn };
  let report = lending.send_reminders_for(&target).await?;
  Ok(Json(ReminderResponse { message: "Reminder check triggered", report }))
}
