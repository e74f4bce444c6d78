//! The producer-side protocol guard.
//!
//! An [`Extraction`] enforces START → DATA* → END for one producer. Misuse is
//! never raised to the producer: the offending call is dropped, logged, and
//! kept in [`Extraction::diagnostics`]. Turning irregularities into hard
//! failures is the consumer's job.

use thiserror::Error;

use crate::{
  channel::EventChannel,
  event::Event,
  fact::Fact,
  id::ExtractionId,
};

/// A lifecycle rule broken by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
  #[error("called start twice")]
  StartedTwice,

  #[error("called start after end")]
  StartAfterEnd,

  #[error("sent data before starting")]
  DataBeforeStart,

  #[error("sent data after ending")]
  DataAfterEnd,

  #[error("called end twice")]
  EndedTwice,

  #[error("called end before starting")]
  EndBeforeStart,
}

/// One producer's view of an extraction.
#[derive(Debug)]
pub struct Extraction {
  id:          ExtractionId,
  channel:     EventChannel,
  started:     bool,
  ended:       bool,
  diagnostics: Vec<ProtocolViolation>,
}

impl Extraction {
  pub fn new(channel: EventChannel, id: ExtractionId) -> Self {
    Self {
      id,
      channel,
      started: false,
      ended: false,
      diagnostics: Vec::new(),
    }
  }

  pub fn id(&self) -> &ExtractionId { &self.id }

  pub fn is_started(&self) -> bool { self.started }

  pub fn is_ended(&self) -> bool { self.ended }

  /// Every violation recorded so far, oldest first.
  pub fn diagnostics(&self) -> &[ProtocolViolation] { &self.diagnostics }

  /// Signal the start of the extraction.
  pub fn start(&mut self) {
    if self.ended {
      return self.violation(ProtocolViolation::StartAfterEnd);
    }
    if self.started {
      return self.violation(ProtocolViolation::StartedTwice);
    }
    self.started = true;
    tracing::debug!(extraction = %self.id, "extraction started");
    self.channel.publish(&Event::start(self.id.clone()));
  }

  /// Broadcast one fact.
  pub fn data(&mut self, fact: Fact) {
    if let Some(violation) = self.open_check() {
      return self.violation(violation);
    }
    self.channel.publish(&Event::data(self.id.clone(), fact));
  }

  /// Report a non-fatal producer error.
  pub fn error(&mut self, message: impl Into<String>) {
    let message = message.into();
    if let Some(violation) = self.open_check() {
      tracing::error!(extraction = %self.id, %message, "dropped producer error");
      return self.violation(violation);
    }
    tracing::error!(extraction = %self.id, %message, "extraction errored");
    self.channel.publish(&Event::error(self.id.clone(), message));
  }

  /// Signal the end of the extraction.
  pub fn end(&mut self) {
    if self.ended {
      return self.violation(ProtocolViolation::EndedTwice);
    }
    // Still broadcast: the consumer fails the run with its own message.
    if !self.started {
      self.violation(ProtocolViolation::EndBeforeStart);
    }
    self.ended = true;
    tracing::debug!(extraction = %self.id, "extraction ended");
    self.channel.publish(&Event::end(self.id.clone()));
  }

  fn open_check(&self) -> Option<ProtocolViolation> {
    if !self.started {
      Some(ProtocolViolation::DataBeforeStart)
    } else if self.ended {
      Some(ProtocolViolation::DataAfterEnd)
    } else {
      None
    }
  }

  fn violation(&mut self, violation: ProtocolViolation) {
    tracing::error!(extraction = %self.id, "{violation}");
    self.diagnostics.push(violation);
  }
}

#[cfg(test)]
mod tests {
  use crate::{
    event::EventKind,
    fact::{Fact, PersonData},
    recorder::EventRecorder,
  };

  use super::*;

  fn setup() -> (Extraction, EventRecorder) {
    let channel = EventChannel::new();
    let recorder = EventRecorder::attach(&channel, "test".into());
    (Extraction::new(channel, "test".into()), recorder)
  }

  fn person(id: &str) -> Fact {
    Fact::Person(PersonData { id: id.into(), primary: None })
  }

  fn tags(recorder: &EventRecorder) -> Vec<&'static str> {
    recorder.events().iter().map(|e| e.kind.tag()).collect()
  }

  #[test]
  fn well_formed_lifecycle_broadcasts_everything() {
    let (mut extraction, recorder) = setup();
    extraction.start();
    extraction.data(person("1"));
    extraction.error("soft failure");
    extraction.end();

    assert_eq!(tags(&recorder), vec!["START", "DATA", "ERROR", "END"]);
    assert!(extraction.diagnostics().is_empty());
    assert!(extraction.is_started() && extraction.is_ended());
  }

  #[test]
  fn data_before_start_is_dropped() {
    let (mut extraction, recorder) = setup();
    extraction.data(person("1"));
    extraction.error("early");

    assert!(recorder.events().is_empty());
    assert_eq!(extraction.diagnostics(), &[
      ProtocolViolation::DataBeforeStart,
      ProtocolViolation::DataBeforeStart,
    ]);
  }

  #[test]
  fn calls_after_end_are_dropped() {
    let (mut extraction, recorder) = setup();
    extraction.start();
    extraction.end();
    extraction.data(person("1"));
    extraction.end();
    extraction.start();

    assert_eq!(tags(&recorder), vec!["START", "END"]);
    assert_eq!(extraction.diagnostics(), &[
      ProtocolViolation::DataAfterEnd,
      ProtocolViolation::EndedTwice,
      ProtocolViolation::StartAfterEnd,
    ]);
  }

  #[test]
  fn double_start_is_dropped() {
    let (mut extraction, recorder) = setup();
    extraction.start();
    extraction.start();

    assert_eq!(tags(&recorder), vec!["START"]);
    assert_eq!(extraction.diagnostics(), &[ProtocolViolation::StartedTwice]);
  }

  #[test]
  fn end_before_start_is_flagged_but_broadcast() {
    let (mut extraction, recorder) = setup();
    extraction.end();

    assert_eq!(recorder.events()[0].kind, EventKind::End);
    assert_eq!(extraction.diagnostics(), &[ProtocolViolation::EndBeforeStart]);
  }
}
