//! Error types for `genx-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown event type: {0:?}")]
  UnknownEventType(String),

  #[error("unknown fact type: {0:?}")]
  UnknownFactType(String),

  #[error("{0} event is missing its data")]
  MissingEventData(&'static str),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
