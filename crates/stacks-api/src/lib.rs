//! JSON REST API for Stacks.
//!
//! Exposes an axum [`Router`] backed by a [`Lending`] engine over any
//! [`LendingStore`] and [`Notifier`]. TLS, auth, and request tracing are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = stacks_api::api_router(lending.clone()).layer(TraceLayer::new_for_http());
//! ```

pub mod error;
pub mod records;
pub mod reminders;
pub mod transactions;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post, put},
};
use serde_json::{Value, json};
use stacks_core::{Lending, notify::Notifier, store::LendingStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `lending`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, N>(lending: Arc<Lending<S, N>>) -> Router<()>
where
  S: LendingStore + 'static,
  N: Notifier + 'static,
{
  Router::new()
    .route("/", get(health))
    // Transactions
    .route(
      "/transactions",
      get(transactions::list::<S, N>).post(transactions::checkout::<S, N>),
    )
    .route("/transactions/search", get(transactions::search::<S, N>))
    .route(
      "/transactions/{id}",
      get(transactions::get_one::<S, N>).delete(transactions::delete_one::<S, N>),
    )
    .route("/transactions/{id}/return", put(transactions::return_one::<S, N>))
    // Reminders
    .route("/reminders/due", post(reminders::due::<S, N>))
    .route("/send-reminders", get(reminders::targeted::<S, N>))
    // Records
    .route("/students", post(records::create_student::<S, N>))
    .route("/students/{id}", get(records::get_student::<S, N>))
    .route("/books", post(records::create_book::<S, N>))
    .route("/books/{id}", get(records::get_book::<S, N>))
    .with_state(lending)
}

async fn health() -> Json<Value> { Json(json!({ "message": "Server is running" })) }
