//! A tap that keeps every event of one extraction.
//!
//! Hosting shells hand the raw event list downstream next to the combined
//! document; tests use it to see exactly what a producer broadcast.

use std::sync::{Arc, Mutex};

use crate::{
  channel::{EventChannel, SubscriptionId},
  event::Event,
  id::ExtractionId,
};

/// Records the events of one extraction in delivery order.
#[derive(Debug)]
pub struct EventRecorder {
  channel:      EventChannel,
  subscription: SubscriptionId,
  events:       Arc<Mutex<Vec<Event>>>,
}

impl EventRecorder {
  /// Start recording `extraction_id`. Attach before the producer starts;
  /// earlier events are not replayed.
  pub fn attach(channel: &EventChannel, extraction_id: ExtractionId) -> Self {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let subscription = channel.subscribe(extraction_id, move |event| {
      sink
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .push(event.clone());
    });
    Self { channel: channel.clone(), subscription, events }
  }

  /// A snapshot of everything recorded so far.
  pub fn events(&self) -> Vec<Event> {
    self
      .events
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .clone()
  }

  /// Stop recording and return the recorded events.
  pub fn detach(self) -> Vec<Event> {
    self.channel.unsubscribe(self.subscription);
    self.events()
  }
}
