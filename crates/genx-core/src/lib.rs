//! Core types for genealogical fact extraction.
//!
//! A producer announces an extraction on an [`channel::EventChannel`] through
//! an [`extraction::Extraction`] (usually wrapped by an [`emit::Emitter`]),
//! and any number of observers receive the ordered START / DATA / ERROR / END
//! stream for that extraction id.
//!
//! This crate does not depend on an async runtime. Consumers that turn
//! the stream into a document live in `genx-combinator` and `genx-gedcomx`.

pub mod channel;
pub mod emit;
pub mod error;
pub mod event;
pub mod extraction;
pub mod fact;
pub mod id;
pub mod recorder;

pub use error::{Error, Result};
