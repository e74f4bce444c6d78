//! Consumer side of the extraction protocol.
//!
//! A [`Combinator`] watches one extraction on an
//! [`genx_core::channel::EventChannel`], enforces the lifecycle rules with a
//! timeout, feeds every fact to an [`Assembler`], and settles a single future
//! with the assembled output or with the rule that was broken.

pub mod assembler;
pub mod combinator;
pub mod error;

pub use assembler::Assembler;
pub use combinator::{Combinator, CombinatorOptions, DEFAULT_TIMEOUT};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
