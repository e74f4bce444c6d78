//! Error type for the GEDCOM X assembler.
//!
//! These only fire on input the emitter would never have let through; they
//! fail the whole extraction.

use genx_core::fact::FactType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssembleError {
  #[error("{0} missing {1}")]
  Missing(FactType, &'static str),

  #[error("unrecognized gender: {0:?}")]
  InvalidGender(String),

  #[error("Name has no text")]
  EmptyName,
}

pub type Result<T, E = AssembleError> = std::result::Result<T, E>;
