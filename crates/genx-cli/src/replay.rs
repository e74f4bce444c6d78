//! Replaying a recorded event stream through the GEDCOM X combinator.

use anyhow::Context as _;
use genx_combinator::{Combinator, CombinatorOptions};
use genx_core::{
  channel::EventChannel,
  event::{Event, EventKind},
  id::ExtractionId,
  recorder::EventRecorder,
};
use genx_gedcomx::{GedcomX, model::Document};
use serde::Serialize;

/// What `genx replay --events` prints.
#[derive(Debug, Serialize)]
pub struct Recording {
  pub events: Vec<Event>,
  pub data:   Document,
}

/// Parse a JSON array of wire events.
pub fn parse_events(raw: &str) -> anyhow::Result<Vec<Event>> {
  serde_json::from_str(raw).context("failed to parse event list")
}

/// Publish `events` in order on a fresh channel and combine the extraction
/// named `id`, or the first event's extraction if `id` is `None`.
///
/// Events for other extractions are published too but nobody listens.
pub async fn replay(
  events: &[Event],
  id: Option<ExtractionId>,
  options: CombinatorOptions,
) -> anyhow::Result<Recording> {
  let id = id
    .or_else(|| events.first().map(|e| e.extraction_id.clone()))
    .context("no events to replay")?;
  tracing::info!(extraction = %id, events = events.len(), "replaying");

  let channel = EventChannel::new();
  let recorder = EventRecorder::attach(&channel, id.clone());
  let pending = Combinator::with_options(GedcomX::new(), options)
    .start(&channel, id.clone());
  tokio::pin!(pending);

  for event in events {
    let delivered = channel.publish(event);
    tracing::trace!(tag = event.kind.tag(), delivered, "published");
  }

  // Delivery is synchronous, so nothing else will arrive. Only a running
  // timer can still settle an unfinished extraction.
  let settled = tokio::select! {
    biased;
    outcome = &mut pending => Some(outcome),
    () = std::future::ready(()) => None,
  };
  let outcome = match settled {
    Some(outcome) => outcome,
    None => {
      let started = recorder.events().iter().any(|e| e.kind == EventKind::Start);
      if !started {
        anyhow::bail!("extraction {id} never started");
      }
      if options.timeout.is_none() {
        anyhow::bail!("extraction {id} never ended");
      }
      pending.await
    }
  };

  let data = outcome.with_context(|| format!("extraction {id} failed"))?;
  Ok(Recording { events: recorder.detach(), data })
}
