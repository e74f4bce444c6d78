//! Identifier newtypes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ─── ExtractionId ────────────────────────────────────────────────────────────

/// Identifies the source of an extraction on a channel.
///
/// The id names the producer, not a particular run, so only one extraction
/// with a given id may be active on a channel at a time.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ExtractionId(String);

impl ExtractionId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  /// A fresh random id for producers without a natural name.
  pub fn generate() -> Self { Self(Uuid::new_v4().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ExtractionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for ExtractionId {
  fn from(value: &str) -> Self { Self::new(value) }
}

impl From<String> for ExtractionId {
  fn from(value: String) -> Self { Self(value) }
}

// ─── PersonId ────────────────────────────────────────────────────────────────

/// A producer-assigned person identifier, unique within one extraction.
///
/// Producers hand out both textual and numeric ids; both normalize to the
/// same string form, so `12` and `"12"` name the same person.
#[derive(
  Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// An empty id is how a producer leaves the field out.
  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// The `#id` form used for local references inside a document.
  pub fn to_resource(&self) -> String { format!("#{}", self.0) }
}

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for PersonId {
  fn from(value: &str) -> Self { Self::new(value) }
}

impl From<String> for PersonId {
  fn from(value: String) -> Self { Self(value) }
}

impl From<u64> for PersonId {
  fn from(value: u64) -> Self { Self(value.to_string()) }
}

impl<'de> Deserialize<'de> for PersonId {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
      Text(String),
      Unsigned(u64),
      Signed(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
      Raw::Text(s) => Self(s),
      Raw::Unsigned(n) => Self(n.to_string()),
      Raw::Signed(n) => Self(n.to_string()),
    })
  }
}
