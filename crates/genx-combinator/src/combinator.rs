//! The consumer state machine.
//!
//! ```text
//! waiting ──START──▶ started ──END──▶ ended ──▶ completed(Ok)
//!    │                  │ DATA → Assembler::apply
//!    └── any violation, assembler error, or timeout ──▶ completed(Err)
//! ```
//!
//! Completion happens exactly once. It unsubscribes from the channel and
//! disarms the timer before the outcome is delivered, so nothing published
//! afterwards can touch a settled result. Dropping the future unsubscribes
//! too.

use std::{
  future::Future,
  sync::{Arc, Mutex, MutexGuard},
  time::Duration,
};

use genx_core::{
  channel::{EventChannel, SubscriptionId},
  event::{Event, EventKind},
  id::ExtractionId,
};
use tokio::{
  sync::{oneshot, watch},
  time::Instant,
};

use crate::{Assembler, Error, Result};

/// How long a started extraction may run before it is failed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ─── Options ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinatorOptions {
  /// Measured from START. `None` waits forever.
  pub timeout: Option<Duration>,
}

impl CombinatorOptions {
  /// Zero or negative disables the timeout.
  pub fn from_secs(secs: i64) -> Self {
    let timeout = u64::try_from(secs)
      .ok()
      .filter(|s| *s > 0)
      .map(Duration::from_secs);
    Self { timeout }
  }

  pub fn without_timeout() -> Self { Self { timeout: None } }
}

impl Default for CombinatorOptions {
  fn default() -> Self { Self { timeout: Some(DEFAULT_TIMEOUT) } }
}

// ─── Combinator ──────────────────────────────────────────────────────────────

/// Turns one extraction's event stream into one output.
pub struct Combinator<A: Assembler> {
  assembler: A,
  options:   CombinatorOptions,
}

impl<A: Assembler> Combinator<A> {
  pub fn new(assembler: A) -> Self {
    Self::with_options(assembler, CombinatorOptions::default())
  }

  pub fn with_options(assembler: A, options: CombinatorOptions) -> Self {
    Self { assembler, options }
  }

  /// Subscribe to `extraction_id` and return the future of its outcome.
  ///
  /// The subscription is made before this returns, so call it before the
  /// producer starts. The future settles exactly once.
  pub fn start(
    self,
    channel: &EventChannel,
    extraction_id: ExtractionId,
  ) -> impl Future<Output = Result<A::Output>> + Send + 'static {
    let (done_tx, mut done_rx) = oneshot::channel();
    let (deadline_tx, mut deadline_rx) = watch::channel(None);

    let state = Arc::new(Mutex::new(State {
      extraction_id: extraction_id.clone(),
      assembler: self.assembler,
      timeout: self.options.timeout,
      phase: Phase::Waiting,
      deadline: deadline_tx,
      done: Some(done_tx),
      channel: channel.clone(),
      subscription: None,
    }));

    let handler_state = Arc::clone(&state);
    let subscription = channel.subscribe(extraction_id, move |event| {
      if let Err(error) = lock(&handler_state).handle(event) {
        tracing::error!(%error, "combinator invariant violated");
      }
    });
    {
      // Another thread may have completed the run before the id was stored.
      let mut state = lock(&state);
      if state.phase == Phase::Completed {
        channel.unsubscribe(subscription);
      } else {
        state.subscription = Some(subscription);
      }
    }
    let unsubscribe = Unsubscribe { channel: channel.clone(), subscription };

    async move {
      let _unsubscribe = unsubscribe;
      loop {
        let deadline = *deadline_rx.borrow_and_update();
        tokio::select! {
          biased;
          outcome = &mut done_rx => {
            return outcome.unwrap_or(Err(Error::Abandoned));
          }
          changed = deadline_rx.changed() => {
            // The sender lives in `state`, which this future keeps alive.
            if changed.is_err() {
              return (&mut done_rx).await.unwrap_or(Err(Error::Abandoned));
            }
          }
          () = wait_until(deadline) => lock(&state).time_out(),
        }
      }
    }
  }
}

/// Removes the subscription when the outcome future goes away, settled or not.
struct Unsubscribe {
  channel:      EventChannel,
  subscription: SubscriptionId,
}

impl Drop for Unsubscribe {
  fn drop(&mut self) { self.channel.unsubscribe(self.subscription); }
}

async fn wait_until(deadline: Option<Instant>) {
  match deadline {
    Some(at) => tokio::time::sleep_until(at).await,
    None => std::future::pending().await,
  }
}

fn lock<A: Assembler>(state: &Mutex<State<A>>) -> MutexGuard<'_, State<A>> {
  state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
  Waiting,
  Started,
  Ended,
  Completed,
}

struct State<A: Assembler> {
  extraction_id: ExtractionId,
  assembler:     A,
  timeout:       Option<Duration>,
  phase:         Phase,
  deadline:      watch::Sender<Option<Instant>>,
  done:          Option<oneshot::Sender<Result<A::Output>>>,
  channel:       EventChannel,
  subscription:  Option<SubscriptionId>,
}

impl<A: Assembler> State<A> {
  /// Apply one event. Only an internal invariant violation is returned;
  /// everything else settles the outcome.
  fn handle(&mut self, event: &Event) -> Result<()> {
    match (&event.kind, self.phase) {
      (_, Phase::Completed) => {
        tracing::trace!(
          extraction = %self.extraction_id,
          kind = event.kind.tag(),
          "ignoring event after completion"
        );
        Ok(())
      }

      (EventKind::Error(message), _) => {
        tracing::warn!(extraction = %self.extraction_id, %message, "producer reported an error");
        Ok(())
      }

      (EventKind::Start, Phase::Waiting) => {
        if let Some(timeout) = self.timeout {
          self.deadline.send_replace(Some(Instant::now() + timeout));
        }
        self.phase = Phase::Started;
        tracing::debug!(extraction = %self.extraction_id, "extraction started");
        Ok(())
      }
      (EventKind::Start, Phase::Started) => self.complete(Err(Error::StartedTwice)),
      (EventKind::Start, Phase::Ended) => self.complete(Err(Error::StartAfterEnd)),

      (EventKind::Data(_), Phase::Waiting) => self.complete(Err(Error::DataBeforeStart)),
      (EventKind::Data(_), Phase::Ended) => self.complete(Err(Error::DataAfterEnd)),
      (EventKind::Data(fact), Phase::Started) => match self.assembler.apply(fact) {
        Ok(()) => Ok(()),
        Err(error) => self.complete(Err(Error::assemble(error))),
      },

      (EventKind::End, Phase::Waiting) => self.complete(Err(Error::EndBeforeStart)),
      (EventKind::End, Phase::Ended) => self.complete(Err(Error::EndedTwice)),
      (EventKind::End, Phase::Started) => {
        self.phase = Phase::Ended;
        self.deadline.send_replace(None);
        self.assembler.finalize();
        let output = self.assembler.serialize().map_err(Error::assemble);
        self.complete(output)
      }
    }
  }

  fn time_out(&mut self) {
    if self.phase == Phase::Completed {
      return;
    }
    if let Err(error) = self.complete(Err(Error::TimedOut)) {
      tracing::error!(%error, "combinator invariant violated");
    }
  }

  fn complete(&mut self, outcome: Result<A::Output>) -> Result<()> {
    let Some(done) = self.done.take() else {
      return Err(Error::CompletedTwice);
    };
    self.phase = Phase::Completed;
    self.deadline.send_replace(None);
    if let Some(subscription) = self.subscription.take() {
      self.channel.unsubscribe(subscription);
    }

    match &outcome {
      Ok(_) => tracing::debug!(extraction = %self.extraction_id, "extraction completed"),
      Err(error) => tracing::warn!(extraction = %self.extraction_id, %error, "extraction failed"),
    }
    // The caller may have stopped waiting; the outcome is then discarded.
    let _ = done.send(outcome);
    Ok(())
  }
}
