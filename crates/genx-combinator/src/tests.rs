//! State-machine tests against a minimal assembler.

use std::time::Duration;

use genx_core::{
  channel::EventChannel,
  emit::Emitter,
  event::Event,
  extraction::Extraction,
  fact::{Fact, PersonData},
  id::ExtractionId,
};
use thiserror::Error;

use crate::{Assembler, Combinator, CombinatorOptions, Error};

// ─── Test assembler ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("refused person {0}")]
struct Refused(String);

/// Collects fact type names; refuses any person with id `"boom"`.
#[derive(Default)]
struct TypeLog {
  seen:      Vec<String>,
  finalized: bool,
}

impl Assembler for TypeLog {
  type Error = Refused;
  type Output = (Vec<String>, bool);

  fn apply(&mut self, fact: &Fact) -> Result<(), Refused> {
    if let Fact::Person(PersonData { id, .. }) = fact
      && id.as_str() == "boom"
    {
      return Err(Refused(id.to_string()));
    }
    self.seen.push(fact.fact_type().to_string());
    Ok(())
  }

  fn finalize(&mut self) { self.finalized = true; }

  fn serialize(&mut self) -> Result<Self::Output, Refused> {
    Ok((std::mem::take(&mut self.seen), self.finalized))
  }
}

fn person(id: &str) -> Fact {
  Fact::Person(PersonData { id: id.into(), primary: None })
}

fn id() -> ExtractionId { "test".into() }

// ─── Happy path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolves_with_serialized_output_on_end() {
  let channel = EventChannel::new();
  let pending = Combinator::new(TypeLog::default()).start(&channel, id());

  let mut extraction = Extraction::new(channel.clone(), id());
  extraction.start();
  extraction.data(person("1"));
  extraction.error("not fatal");
  extraction.data(person("2"));
  extraction.end();

  let (seen, finalized) = pending.await.unwrap();
  assert_eq!(seen, vec!["Person", "Person"]);
  assert!(finalized);
  assert_eq!(channel.subscriber_count(), 0);
}

#[tokio::test]
async fn works_through_the_emitter() {
  let channel = EventChannel::new();
  let pending = Combinator::new(TypeLog::default()).start(&channel, id());

  let mut emit = Emitter::new(Extraction::new(channel, id()));
  emit.start();
  emit.person(PersonData::default()); // refused by validation: ERROR only
  emit.person(PersonData { id: "7".into(), primary: Some(true) });
  emit.end();

  let (seen, _) = pending.await.unwrap();
  assert_eq!(seen, vec!["Person"]);
}

#[tokio::test]
async fn other_extractions_do_not_interfere() {
  let channel = EventChannel::new();
  let first = Combinator::new(TypeLog::default()).start(&channel, "a".into());
  let second = Combinator::new(TypeLog::default()).start(&channel, "b".into());

  let mut a = Extraction::new(channel.clone(), "a".into());
  let mut b = Extraction::new(channel.clone(), "b".into());
  a.start();
  b.start();
  a.data(person("1"));
  b.data(person("2"));
  b.data(person("3"));
  b.end();
  a.end();

  assert_eq!(first.await.unwrap().0.len(), 1);
  assert_eq!(second.await.unwrap().0.len(), 2);
}

#[tokio::test]
async fn producer_on_another_task() {
  let channel = EventChannel::new();
  let pending = Combinator::new(TypeLog::default()).start(&channel, id());

  let producer_channel = channel.clone();
  tokio::spawn(async move {
    let mut extraction = Extraction::new(producer_channel, id());
    extraction.start();
    tokio::time::sleep(Duration::from_millis(10)).await;
    extraction.data(person("1"));
    extraction.end();
  });

  assert_eq!(pending.await.unwrap().0, vec!["Person"]);
}

// ─── Violations ──────────────────────────────────────────────────────────────

async fn run_raw(events: Vec<Event>) -> crate::Result<(Vec<String>, bool)> {
  let channel = EventChannel::new();
  let pending = Combinator::new(TypeLog::default()).start(&channel, id());
  for event in &events {
    channel.publish(event);
  }
  pending.await
}

#[tokio::test]
async fn data_before_start_fails() {
  let err = run_raw(vec![Event::data(id(), person("1"))]).await.unwrap_err();
  assert!(matches!(err, Error::DataBeforeStart));
  assert_eq!(err.to_string(), "DATA called before START (sent before starting)");
  assert!(err.to_string().contains("before starting"));
}

#[tokio::test]
async fn second_start_fails() {
  let err = run_raw(vec![Event::start(id()), Event::start(id())])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::StartedTwice));
  assert!(err.to_string().contains("called more than once"));
}

#[tokio::test]
async fn end_before_start_fails() {
  let err = run_raw(vec![Event::end(id())]).await.unwrap_err();
  assert_eq!(err.to_string(), "END called before START");
}

#[tokio::test]
async fn errors_alone_do_not_fail() {
  let (seen, _) = run_raw(vec![
    Event::error(id(), "before start is fine too"),
    Event::start(id()),
    Event::error(id(), "still fine"),
    Event::end(id()),
  ])
  .await
  .unwrap();
  assert!(seen.is_empty());
}

#[tokio::test]
async fn assembler_error_fails_with_its_message() {
  let err = run_raw(vec![
    Event::start(id()),
    Event::data(id(), person("boom")),
    Event::end(id()),
  ])
  .await
  .unwrap_err();
  assert!(matches!(err, Error::Assemble(_)));
  assert_eq!(err.to_string(), "refused person boom");
}

#[tokio::test]
async fn events_after_failure_are_ignored() {
  let channel = EventChannel::new();
  let pending = Combinator::new(TypeLog::default()).start(&channel, id());

  channel.publish(&Event::data(id(), person("1")));
  assert_eq!(channel.publish(&Event::start(id())), 0);
  assert_eq!(channel.publish(&Event::end(id())), 0);

  assert!(matches!(pending.await, Err(Error::DataBeforeStart)));
}

// ─── Timeout ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn times_out_without_end() {
  let channel = EventChannel::new();
  let options = CombinatorOptions { timeout: Some(Duration::from_millis(20)) };
  let pending =
    Combinator::with_options(TypeLog::default(), options).start(&channel, id());

  channel.publish(&Event::start(id()));
  channel.publish(&Event::data(id(), person("1")));

  let err = pending.await.unwrap_err();
  assert!(matches!(err, Error::TimedOut));
  assert_eq!(err.to_string(), "Timed Out");

  // Late events reach nobody.
  assert_eq!(channel.publish(&Event::end(id())), 0);
  assert_eq!(channel.subscriber_count(), 0);
}

#[tokio::test]
async fn timer_only_runs_after_start() {
  let channel = EventChannel::new();
  let options = CombinatorOptions { timeout: Some(Duration::from_millis(10)) };
  let pending =
    Combinator::with_options(TypeLog::default(), options).start(&channel, id());

  let waited =
    tokio::time::timeout(Duration::from_millis(50), pending).await;
  assert!(waited.is_err(), "should still be waiting for START");
  assert_eq!(channel.subscriber_count(), 0);
}

#[tokio::test]
async fn disabled_timeout_waits_for_end() {
  let channel = EventChannel::new();
  let pending = Combinator::with_options(
    TypeLog::default(),
    CombinatorOptions::from_secs(0),
  )
  .start(&channel, id());

  channel.publish(&Event::start(id()));
  let waited =
    tokio::time::timeout(Duration::from_millis(50), pending).await;
  assert!(waited.is_err(), "should never time out");
  assert_eq!(channel.subscriber_count(), 0);
}

#[tokio::test]
async fn dropping_the_future_unsubscribes() {
  let channel = EventChannel::new();
  let pending = Combinator::new(TypeLog::default()).start(&channel, id());
  assert_eq!(channel.subscriber_count(), 1);

  assert_eq!(channel.publish(&Event::start(id())), 1);
  drop(pending);

  assert_eq!(channel.subscriber_count(), 0);
  assert_eq!(channel.publish(&Event::data(id(), person("1"))), 0);
}

#[tokio::test]
async fn unsubscribed_when_settled_by_another_thread() {
  use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  };

  let channel = EventChannel::new();
  let stop = Arc::new(AtomicBool::new(false));
  let publisher = {
    let channel = channel.clone();
    let stop = Arc::clone(&stop);
    std::thread::spawn(move || {
      while !stop.load(Ordering::Relaxed) {
        channel.publish(&Event::start(id()));
        channel.publish(&Event::end(id()));
      }
    })
  };

  for _ in 0..200 {
    let pending = Combinator::new(TypeLog::default()).start(&channel, id());
    tokio::pin!(pending);
    let _ = (&mut pending).await;
    assert_eq!(channel.subscriber_count(), 0);
  }

  stop.store(true, Ordering::Relaxed);
  publisher.join().unwrap();
}

#[tokio::test]
async fn end_before_deadline_wins() {
  let channel = EventChannel::new();
  let options = CombinatorOptions { timeout: Some(Duration::from_millis(30)) };
  let pending =
    Combinator::with_options(TypeLog::default(), options).start(&channel, id());

  channel.publish(&Event::start(id()));
  channel.publish(&Event::end(id()));
  tokio::time::sleep(Duration::from_millis(60)).await;

  assert!(pending.await.is_ok());
}

#[test]
fn option_seconds_mapping() {
  assert_eq!(CombinatorOptions::from_secs(0).timeout, None);
  assert_eq!(CombinatorOptions::from_secs(-5).timeout, None);
  assert_eq!(
    CombinatorOptions::from_secs(3).timeout,
    Some(Duration::from_secs(3))
  );
  assert_eq!(
    CombinatorOptions::default().timeout,
    Some(crate::DEFAULT_TIMEOUT)
  );
}
