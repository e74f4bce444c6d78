//! Lifecycle events carried on the channel.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, fact::Fact, id::ExtractionId};

// ─── Event ───────────────────────────────────────────────────────────────────

/// What happened in an extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
  Start,
  Data(Fact),
  /// A non-fatal producer error. Observers log it; it never fails a run.
  Error(String),
  End,
}

impl EventKind {
  /// The wire tag: `START`, `DATA`, `ERROR` or `END`.
  pub fn tag(&self) -> &'static str {
    match self {
      Self::Start => "START",
      Self::Data(_) => "DATA",
      Self::Error(_) => "ERROR",
      Self::End => "END",
    }
  }
}

/// A single lifecycle event tagged with the extraction it belongs to.
///
/// On the wire this is `{"id", "type", "data"?}`, which is also the format
/// of recorded extractions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireEvent", into = "WireEvent")]
pub struct Event {
  pub extraction_id: ExtractionId,
  pub kind:          EventKind,
}

impl Event {
  pub fn new(extraction_id: ExtractionId, kind: EventKind) -> Self {
    Self { extraction_id, kind }
  }

  pub fn start(extraction_id: ExtractionId) -> Self {
    Self::new(extraction_id, EventKind::Start)
  }

  pub fn data(extraction_id: ExtractionId, fact: Fact) -> Self {
    Self::new(extraction_id, EventKind::Data(fact))
  }

  pub fn error(extraction_id: ExtractionId, message: impl Into<String>) -> Self {
    Self::new(extraction_id, EventKind::Error(message.into()))
  }

  pub fn end(extraction_id: ExtractionId) -> Self {
    Self::new(extraction_id, EventKind::End)
  }
}

// ─── Wire form ───────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct WireEvent {
  id:   ExtractionId,
  #[serde(rename = "type")]
  tag:  String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  data: Option<serde_json::Value>,
}

impl TryFrom<WireEvent> for Event {
  type Error = Error;

  fn try_from(wire: WireEvent) -> Result<Self> {
    let kind = match wire.tag.as_str() {
      "START" => EventKind::Start,
      "END" => EventKind::End,
      "DATA" => {
        let data = wire.data.ok_or(Error::MissingEventData("DATA"))?;
        EventKind::Data(serde_json::from_value(data)?)
      }
      // Producers report either a bare message or an object with one.
      "ERROR" => EventKind::Error(match wire.data {
        Some(serde_json::Value::String(message)) => message,
        Some(other) => other.to_string(),
        None => String::new(),
      }),
      other => return Err(Error::UnknownEventType(other.to_owned())),
    };
    Ok(Event::new(wire.id, kind))
  }
}

impl From<Event> for WireEvent {
  fn from(event: Event) -> Self {
    let tag = event.kind.tag().to_owned();
    let data = match event.kind {
      EventKind::Start | EventKind::End => None,
      EventKind::Error(message) => Some(serde_json::Value::String(message)),
      // Serializing a fact only fails on non-string map keys, which the
      // payload structs never contain.
      EventKind::Data(fact) => serde_json::to_value(&fact).ok(),
    };
    Self { id: event.extraction_id, tag, data }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::fact::{GenderData, PersonData};

  #[test]
  fn parses_a_recorded_extraction() {
    let events: Vec<Event> = serde_json::from_value(json!([
      { "id": "findagrave", "type": "START" },
      { "id": "findagrave", "type": "DATA",
        "data": { "type": "Person", "data": { "id": "1", "primary": true } } },
      { "id": "findagrave", "type": "ERROR", "data": "no death date" },
      { "id": "findagrave", "type": "END" }
    ]))
    .unwrap();

    assert_eq!(events.len(), 4);
    assert_eq!(events[0].kind, EventKind::Start);
    assert_eq!(
      events[1].kind,
      EventKind::Data(Fact::Person(PersonData {
        id:      "1".into(),
        primary: Some(true),
      }))
    );
    assert_eq!(events[2].kind, EventKind::Error("no death date".into()));
    assert_eq!(events[3].kind, EventKind::End);
    assert!(events.iter().all(|e| e.extraction_id.as_str() == "findagrave"));
  }

  #[test]
  fn data_without_payload_is_rejected() {
    let result: std::result::Result<Event, _> =
      serde_json::from_value(json!({ "id": "x", "type": "DATA" }));
    assert!(result.is_err());
  }

  #[test]
  fn unknown_event_tag_is_rejected() {
    let result: std::result::Result<Event, _> =
      serde_json::from_value(json!({ "id": "x", "type": "PAUSE" }));
    assert!(result.unwrap_err().to_string().contains("PAUSE"));
  }

  #[test]
  fn serializes_back_to_wire_form() {
    let event = Event::data(
      "x".into(),
      Fact::Gender(GenderData {
        person: "1".into(),
        gender: "Female".into(),
      }),
    );
    assert_eq!(
      serde_json::to_value(&event).unwrap(),
      json!({
        "id": "x",
        "type": "DATA",
        "data": { "type": "Gender", "data": { "person": "1", "gender": "Female" } }
      })
    );
    assert_eq!(
      serde_json::to_value(Event::end("x".into())).unwrap(),
      json!({ "id": "x", "type": "END" })
    );
  }
}
