//! The `Assembler` trait: what a combinator does with the facts it receives.

use genx_core::fact::Fact;

/// Builds one output document from the facts of one extraction.
///
/// The combinator calls [`apply`](Assembler::apply) for every DATA event in
/// emission order, then [`finalize`](Assembler::finalize) and
/// [`serialize`](Assembler::serialize) once on END. An assembler is owned by
/// exactly one combinator and never sees a second extraction.
pub trait Assembler: Send + 'static {
  type Output: Send + 'static;
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fold one fact into the document. Returning an error fails the whole
  /// extraction, so reserve it for structurally impossible input.
  fn apply(&mut self, fact: &Fact) -> Result<(), Self::Error>;

  /// Post-processing that needs the complete document.
  fn finalize(&mut self) {}

  /// Produce the finished document.
  fn serialize(&mut self) -> Result<Self::Output, Self::Error>;
}
