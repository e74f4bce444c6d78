//! The fact vocabulary: the closed set of observations a producer can emit.
//!
//! Every DATA event carries exactly one [`Fact`]. Its wire form is
//! `{"type": "<FactType>", "data": {...}}`.

use std::{fmt, str::FromStr};

use serde::{
  Deserialize, Deserializer, Serialize, Serializer, ser::SerializeStruct as _,
};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};

use crate::{Error, Result, id::PersonId};

// ─── Sub-vocabularies ────────────────────────────────────────────────────────

/// Events that happen to one person: `{person, place?, date?}`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum LifeEvent {
  Baptism,
  BarMitzvah,
  Blessing,
  Burial,
  Christening,
  Confirmation,
  Cremation,
  Death,
  Excommunication,
  FirstCommunion,
  Funeral,
  Immigration,
  /// Older producers spell this `Emmigration` on the wire.
  #[strum(to_string = "Emigration", serialize = "Emmigration")]
  Emigration,
  Naturalization,
  Residence,
  Stillbirth,
}

/// Facts about one person that carry a value: `{person, place?, date?, value}`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum ValuedFact {
  Caste,
  Citizenship,
  Education,
  Ethnicity,
  MaritalStatus,
  Mission,
  Nationality,
  NationalId,
  Occupation,
  Ordination,
  Race,
}

/// Events that may also name the person's parents:
/// `{person, place?, date?, parents?}`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum ParentEvent {
  Adoption,
  Birth,
}

/// Events shared by a couple: `{spouses[1..2], place?, date?}`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum CoupleEvent {
  Annulment,
  Divorce,
  Marriage,
  Separation,
}

// ─── FactType ────────────────────────────────────────────────────────────────

/// The discriminant of a [`Fact`]; its string form is the wire `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactType {
  Person,
  Gender,
  Name,
  AlternateId,
  ExternalId,
  Citation,
  Life(LifeEvent),
  Valued(ValuedFact),
  Parent(ParentEvent),
  Couple(CoupleEvent),
}

impl FactType {
  /// Every member of the vocabulary, standalone types first.
  pub fn all() -> impl Iterator<Item = FactType> {
    [
      Self::Person,
      Self::Gender,
      Self::Name,
      Self::AlternateId,
      Self::ExternalId,
      Self::Citation,
    ]
    .into_iter()
    .chain(LifeEvent::iter().map(Self::Life))
    .chain(ValuedFact::iter().map(Self::Valued))
    .chain(ParentEvent::iter().map(Self::Parent))
    .chain(CoupleEvent::iter().map(Self::Couple))
  }

  /// The wire tag, e.g. `"Birth"`.
  pub fn name(&self) -> &'static str {
    match self {
      Self::Person => "Person",
      Self::Gender => "Gender",
      Self::Name => "Name",
      Self::AlternateId => "AlternateId",
      Self::ExternalId => "ExternalId",
      Self::Citation => "Citation",
      Self::Life(t) => t.into(),
      Self::Valued(t) => t.into(),
      Self::Parent(t) => t.into(),
      Self::Couple(t) => t.into(),
    }
  }
}

impl fmt::Display for FactType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for FactType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let standalone = match s {
      "Person" => Some(Self::Person),
      "Gender" => Some(Self::Gender),
      "Name" => Some(Self::Name),
      "AlternateId" => Some(Self::AlternateId),
      "ExternalId" => Some(Self::ExternalId),
      "Citation" => Some(Self::Citation),
      _ => None,
    };
    standalone
      .or_else(|| s.parse().ok().map(Self::Life))
      .or_else(|| s.parse().ok().map(Self::Valued))
      .or_else(|| s.parse().ok().map(Self::Parent))
      .or_else(|| s.parse().ok().map(Self::Couple))
      .ok_or_else(|| Error::UnknownFactType(s.to_owned()))
  }
}

impl Serialize for FactType {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.name())
  }
}

impl<'de> Deserialize<'de> for FactType {
  fn deserialize<D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
  }
}

// ─── Payloads ────────────────────────────────────────────────────────────────

/// `Person{id, primary?}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonData {
  #[serde(default)]
  pub id:      PersonId,
  /// Whether this is the principal subject of the record.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub primary: Option<bool>,
}

/// `Gender{person, gender}`; `gender` is `Male` or `Female`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderData {
  #[serde(default)]
  pub person: PersonId,
  #[serde(default)]
  pub gender: String,
}

/// `Name{person, name?, given?, surname?, prefix?, suffix?}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameData {
  #[serde(default)]
  pub person:  PersonId,
  /// The whole name as written.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub given:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub surname: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub prefix:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub suffix:  Option<String>,
}

/// `AlternateId{person, id, preferred?}`: `id` is another name for `person`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateIdData {
  #[serde(default)]
  pub person:    PersonId,
  #[serde(default)]
  pub id:        PersonId,
  /// When set, `id` replaces `person` as the visible id in the output.
  #[serde(default)]
  pub preferred: bool,
}

/// `ExternalId{person, url, id}`: where the person lives on the source site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdData {
  #[serde(default)]
  pub person: PersonId,
  #[serde(default)]
  pub url:    String,
  #[serde(default)]
  pub id:     String,
}

/// `Citation{title, url, accessed, repository_*?}` for the record itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationData {
  #[serde(default)]
  pub title:              String,
  #[serde(default)]
  pub url:                String,
  /// Access time in milliseconds since the Unix epoch.
  #[serde(default)]
  pub accessed:           i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub repository_name:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub repository_website: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub repository_url:     Option<String>,
}

/// Payload of every [`LifeEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
  #[serde(default)]
  pub person: PersonId,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub place:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date:   Option<String>,
}

/// Payload of every [`ValuedFact`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueData {
  #[serde(default)]
  pub person: PersonId,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub place:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date:   Option<String>,
  #[serde(default)]
  pub value:  String,
}

/// Payload of every [`ParentEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentEventData {
  #[serde(default)]
  pub person:  PersonId,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub place:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date:    Option<String>,
  /// Up to two parent ids; any beyond the second are ignored.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parents: Option<Vec<PersonId>>,
}

/// Payload of every [`CoupleEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoupleEventData {
  #[serde(default)]
  pub spouses: Vec<PersonId>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub place:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date:    Option<String>,
}

// ─── Fact ────────────────────────────────────────────────────────────────────

/// One typed observation: the payload of a DATA event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "WireFact")]
pub enum Fact {
  Person(PersonData),
  Gender(GenderData),
  Name(NameData),
  AlternateId(AlternateIdData),
  ExternalId(ExternalIdData),
  Citation(CitationData),
  Life(LifeEvent, EventData),
  Valued(ValuedFact, ValueData),
  Parent(ParentEvent, ParentEventData),
  Couple(CoupleEvent, CoupleEventData),
}

impl Fact {
  pub fn fact_type(&self) -> FactType {
    match self {
      Self::Person(_) => FactType::Person,
      Self::Gender(_) => FactType::Gender,
      Self::Name(_) => FactType::Name,
      Self::AlternateId(_) => FactType::AlternateId,
      Self::ExternalId(_) => FactType::ExternalId,
      Self::Citation(_) => FactType::Citation,
      Self::Life(t, _) => FactType::Life(*t),
      Self::Valued(t, _) => FactType::Valued(*t),
      Self::Parent(t, _) => FactType::Parent(*t),
      Self::Couple(t, _) => FactType::Couple(*t),
    }
  }

  /// Rebuild a fact from its wire tag and JSON payload.
  pub fn from_parts(fact_type: FactType, data: serde_json::Value) -> Result<Self> {
    Ok(match fact_type {
      FactType::Person => Self::Person(serde_json::from_value(data)?),
      FactType::Gender => Self::Gender(serde_json::from_value(data)?),
      FactType::Name => Self::Name(serde_json::from_value(data)?),
      FactType::AlternateId => Self::AlternateId(serde_json::from_value(data)?),
      FactType::ExternalId => Self::ExternalId(serde_json::from_value(data)?),
      FactType::Citation => Self::Citation(serde_json::from_value(data)?),
      FactType::Life(t) => Self::Life(t, serde_json::from_value(data)?),
      FactType::Valued(t) => Self::Valued(t, serde_json::from_value(data)?),
      FactType::Parent(t) => Self::Parent(t, serde_json::from_value(data)?),
      FactType::Couple(t) => Self::Couple(t, serde_json::from_value(data)?),
    })
  }
}

impl Serialize for Fact {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("Fact", 2)?;
    state.serialize_field("type", &self.fact_type())?;
    match self {
      Self::Person(d) => state.serialize_field("data", d)?,
      Self::Gender(d) => state.serialize_field("data", d)?,
      Self::Name(d) => state.serialize_field("data", d)?,
      Self::AlternateId(d) => state.serialize_field("data", d)?,
      Self::ExternalId(d) => state.serialize_field("data", d)?,
      Self::Citation(d) => state.serialize_field("data", d)?,
      Self::Life(_, d) => state.serialize_field("data", d)?,
      Self::Valued(_, d) => state.serialize_field("data", d)?,
      Self::Parent(_, d) => state.serialize_field("data", d)?,
      Self::Couple(_, d) => state.serialize_field("data", d)?,
    }
    state.end()
  }
}

/// The raw `{type, data}` envelope read off the wire.
#[derive(Deserialize)]
struct WireFact {
  #[serde(rename = "type")]
  fact_type: FactType,
  #[serde(default)]
  data:      serde_json::Value,
}

impl TryFrom<WireFact> for Fact {
  type Error = Error;

  fn try_from(wire: WireFact) -> Result<Self> {
    Fact::from_parts(wire.fact_type, wire.data)
  }
}
