//! Core types and the lending engine for the Stacks library system.
//!
//! Nothing here depends on HTTP or a database. Storage
//! backends implement [`store::LendingStore`]; SMS transports implement
//! [`notify::Notifier`]. The [`lending::Lending`] engine ties both together.

// Store impls use native `async fn`; the traits spell out `Send` futures.
#![allow(async_fn_in_trait)]

pub mod borrower;
pub mod clock;
pub mod copy;
pub mod error;
pub mod fee;
pub mod lending;
pub mod loan;
pub mod notify;
pub mod policy;
pub mod store;

pub use error::{Error, ErrorKind, Result};
pub use lending::Lending;
