//! In-process broadcast channel for extraction events.
//!
//! # Guarantees
//!
//! - **Synchronous delivery**: [`EventChannel::publish`] runs every matching
//!   handler before it returns, so an observer sees an event before the
//!   producer's call completes.
//! - **Ordered per extraction**: handlers see events in publish order.
//! - **No replay**: events published before a subscription are not seen.
//! - **No backpressure**: publishing never waits on a slow observer.

use std::{
  fmt,
  sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
  },
};

use crate::{event::Event, id::ExtractionId};

/// A callback invoked for every delivered event.
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Returned by `subscribe`; pass it to [`EventChannel::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
  id:      SubscriptionId,
  /// `None` observes every extraction.
  filter:  Option<ExtractionId>,
  handler: Handler,
}

#[derive(Default)]
struct Registry {
  next_id:     AtomicU64,
  subscribers: RwLock<Vec<Subscriber>>,
}

/// A broadcast medium shared between producers and observers.
///
/// Cloning is cheap; clones share the same subscriber list.
#[derive(Clone, Default)]
pub struct EventChannel {
  registry: Arc<Registry>,
}

impl EventChannel {
  pub fn new() -> Self { Self::default() }

  /// Observe events for one extraction id.
  pub fn subscribe<F>(&self, extraction_id: ExtractionId, handler: F) -> SubscriptionId
  where
    F: Fn(&Event) + Send + Sync + 'static,
  {
    self.insert(Some(extraction_id), Arc::new(handler))
  }

  /// Observe events for every extraction on this channel.
  pub fn subscribe_all<F>(&self, handler: F) -> SubscriptionId
  where
    F: Fn(&Event) + Send + Sync + 'static,
  {
    self.insert(None, Arc::new(handler))
  }

  /// Remove a subscription. Returns `false` if it was already gone.
  pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
    let mut subscribers = self
      .registry
      .subscribers
      .write()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    let before = subscribers.len();
    subscribers.retain(|s| s.id != id);
    subscribers.len() != before
  }

  /// Deliver `event` to every matching subscriber, in subscription order.
  ///
  /// Returns the number of handlers invoked.
  pub fn publish(&self, event: &Event) -> usize {
    // Handlers may unsubscribe themselves, so they run without the lock held.
    let handlers: Vec<Handler> = self
      .registry
      .subscribers
      .read()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .iter()
      .filter(|s| {
        s.filter
          .as_ref()
          .is_none_or(|id| *id == event.extraction_id)
      })
      .map(|s| Arc::clone(&s.handler))
      .collect();

    tracing::trace!(
      extraction = %event.extraction_id,
      kind = event.kind.tag(),
      receivers = handlers.len(),
      "publishing event"
    );

    for handler in &handlers {
      handler(event);
    }
    handlers.len()
  }

  /// Returns the number of active subscriptions.
  pub fn subscriber_count(&self) -> usize {
    self
      .registry
      .subscribers
      .read()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .len()
  }

  fn insert(&self, filter: Option<ExtractionId>, handler: Handler) -> SubscriptionId {
    let id = SubscriptionId(self.registry.next_id.fetch_add(1, Ordering::Relaxed));
    self
      .registry
      .subscribers
      .write()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .push(Subscriber { id, filter, handler });
    id
  }
}

impl fmt::Debug for EventChannel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EventChannel")
      .field("subscriber_count", &self.subscriber_count())
      .finish()
  }
}
