//! GEDCOM X output for genealogical extractions.
//!
//! [`GedcomX`] is an [`genx_combinator::Assembler`] that folds an
//! extraction's facts into a deduplicated person/relationship graph and
//! produces a [`model::Document`] in the GEDCOM X JSON shape.
//!
//! # Quick start
//!
//! ```no_run
//! use genx_combinator::Combinator;
//! use genx_core::{channel::EventChannel, emit::Emitter, extraction::Extraction};
//! use genx_gedcomx::GedcomX;
//!
//! # async fn run() -> genx_combinator::Result<()> {
//! let channel = EventChannel::new();
//! let pending = Combinator::new(GedcomX::new()).start(&channel, "site".into());
//!
//! let mut emit = Emitter::new(Extraction::new(channel, "site".into()));
//! emit.start();
//! // ... facts ...
//! emit.end();
//!
//! let document = pending.await?;
//! println!("{}", serde_json::to_string_pretty(&document).unwrap());
//! # Ok(())
//! # }
//! ```

mod engine;
mod name;

pub mod error;
pub mod model;

pub use engine::GedcomX;
pub use error::{AssembleError, Result};
