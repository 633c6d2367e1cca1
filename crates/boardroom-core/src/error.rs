//! Error types for `boardroom-core`.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// A store read failed. The current record is abandoned.
  #[error("store lookup failed: {0}")]
  Lookup(#[source] BoxError),

  /// A store write failed. The record stays unreconciled until the next run.
  #[error("store write failed: {0}")]
  Write(#[source] BoxError),

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("invalid date in {label}: {value:?}")]
  InvalidDate { label: &'static str, value: String },

  #[error("invalid number in {label}: {value:?}")]
  InvalidNumber { label: &'static str, value: String },

  #[error("unknown type of change: {0:?}")]
  UnknownChangeType(String),
}

impl Error {
  pub fn lookup(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Lookup(Box::new(e))
  }

  pub fn write(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Write(Box::new(e))
  }

  /// Whether this error came from the store rather than from the input.
  pub fn is_store(&self) -> bool {
    matches!(self, Self::Lookup(_) | Self::Write(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
