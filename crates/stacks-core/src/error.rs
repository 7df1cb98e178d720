//! Error types for `stacks-core`.

use thiserror::Error;

use crate::policy::PolicyError;

#[derive(Debug, Error)]
pub enum Error {
  /// A referenced borrower, copy or loan does not exist.
  #[error("not found: {0}")]
  NotFound(String),

  /// A uniqueness rule would be violated, e.g. a second open loan.
  #[error("conflict: {0}")]
  Conflict(String),

  /// The requested transition is illegal for the entity's current state.
  #[error("invalid state: {0}")]
  InvalidState(String),

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of an [`Error`], used by transport layers to pick a
/// status code without matching on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
  NotFound,
  Conflict,
  InvalidState,
  InvalidInput,
  Store,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::NotFound(_) => ErrorKind::NotFound,
      Self::Conflict(_) => ErrorKind::Conflict,
      Self::InvalidState(_) => ErrorKind::InvalidState,
      Self::InvalidInput(_) => ErrorKind::InvalidInput,
      Self::Store(_) => ErrorKind::Store,
    }
  }

  /// Wrap any backend error as [`Error::Store`].
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl From<PolicyError> for Error {
  fn from(e: PolicyError) -> Self { Self::InvalidInput(format!("lending policy: {e}")) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
