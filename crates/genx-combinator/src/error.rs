//! Error type for `genx-combinator`.
//!
//! The messages are stable: callers and tests match on them to tell which
//! rule an extraction broke.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("START called more than once")]
  StartedTwice,

  #[error("START called after END")]
  StartAfterEnd,

  #[error("END called before START")]
  EndBeforeStart,

  #[error("END called more than once")]
  EndedTwice,

  #[error("DATA called before START (sent before starting)")]
  DataBeforeStart,

  #[error("DATA called after END")]
  DataAfterEnd,

  #[error("Timed Out")]
  TimedOut,

  /// The assembler refused a fact or could not produce its output.
  #[error("{0}")]
  Assemble(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A combinator settled twice. This is a bug, never a producer mistake.
  #[error("Extraction Completed more than once")]
  CompletedTwice,

  #[error("combinator dropped before completion")]
  Abandoned,
}

impl Error {
  pub(crate) fn assemble<E>(error: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Assemble(Box::new(error))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
