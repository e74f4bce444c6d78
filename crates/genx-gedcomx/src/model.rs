//! The GEDCOM X document produced by an extraction.
//!
//! Only the subset of GEDCOM X an extraction can fill is modelled. Empty
//! lists and absent values are left out of the JSON.

use genx_core::id::PersonId;
use serde::{Deserialize, Serialize};
use strum::EnumString;

/// Prefix of every GEDCOM X type tag.
pub const GEDCOMX: &str = "http://gedcomx.org/";

/// `http://gedcomx.org/<name>`
pub fn type_uri(name: &str) -> String { format!("{GEDCOMX}{name}") }

// ─── Document ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub persons:             Vec<Person>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub relationships:       Vec<Relationship>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub agents:              Vec<Agent>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub source_descriptions: Vec<SourceDescription>,
  /// Local reference to the description of the extracted record.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description:         Option<String>,
}

// ─── Persons ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:            PersonId,
  /// Set on the principal subject of the record; never cleared.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub principal:     Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gender:        Option<Gender>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub names:         Vec<Name>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub facts:         Vec<Fact>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub sources:       Vec<SourceReference>,
  /// Other ids that resolve to this person. Not part of the output.
  #[serde(skip)]
  pub alternate_ids: Vec<PersonId>,
}

impl Person {
  pub fn new(id: PersonId) -> Self { Self { id, ..Default::default() } }

  pub fn is_principal(&self) -> bool { self.principal == Some(true) }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, EnumString, Serialize, Deserialize,
)]
pub enum GenderType {
  #[serde(rename = "http://gedcomx.org/Male")]
  Male,
  #[serde(rename = "http://gedcomx.org/Female")]
  Female,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gender {
  #[serde(rename = "type")]
  pub gender_type: GenderType,
}

// ─── Names ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
  pub name_forms: Vec<NameForm>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameForm {
  pub full_text: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub parts:     Vec<NamePart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamePartType {
  #[serde(rename = "http://gedcomx.org/Prefix")]
  Prefix,
  #[serde(rename = "http://gedcomx.org/Given")]
  Given,
  #[serde(rename = "http://gedcomx.org/Surname")]
  Surname,
  #[serde(rename = "http://gedcomx.org/Suffix")]
  Suffix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePart {
  #[serde(rename = "type")]
  pub part_type: NamePartType,
  pub value:     String,
}

// ─── Facts ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
  /// A type URI such as `http://gedcomx.org/Birth`.
  #[serde(rename = "type")]
  pub fact_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date:      Option<Original>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub place:     Option<Original>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub value:     Option<String>,
}

impl Fact {
  pub fn new(
    name: &str,
    date: Option<&str>,
    place: Option<&str>,
    value: Option<&str>,
  ) -> Self {
    Self {
      fact_type: type_uri(name),
      date:      date.map(Original::new),
      place:     place.map(Original::new),
      value:     value.map(str::to_owned),
    }
  }

  /// Same type, date, and place. Values are not compared.
  pub fn same_event(&self, other: &Fact) -> bool {
    self.fact_type == other.fact_type
      && self.date == other.date
      && self.place == other.place
  }
}

/// A date or place exactly as the source wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Original {
  pub original: String,
}

impl Original {
  pub fn new(original: &str) -> Self { Self { original: original.to_owned() } }
}

// ─── Relationships ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipType {
  /// `person1` is the parent, `person2` the child.
  #[serde(rename = "http://gedcomx.org/ParentChild")]
  ParentChild,
  #[serde(rename = "http://gedcomx.org/Couple")]
  Couple,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
  #[serde(rename = "type")]
  pub relationship_type: RelationshipType,
  pub person1:           ResourceReference,
  pub person2:           ResourceReference,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub facts:             Vec<Fact>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub sources:           Vec<SourceReference>,
}

impl Relationship {
  /// Whether this relationship joins exactly these people in these roles.
  pub fn joins(
    &self,
    relationship_type: RelationshipType,
    person1: &ResourceReference,
    person2: &ResourceReference,
  ) -> bool {
    self.relationship_type == relationship_type
      && self.person1 == *person1
      && self.person2 == *person2
  }
}

/// A `#id` style local reference, or a full URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
  pub resource: String,
}

impl ResourceReference {
  pub fn new(resource: impl Into<String>) -> Self {
    Self { resource: resource.into() }
  }

  pub fn to_person(id: &PersonId) -> Self { Self::new(id.to_resource()) }
}

// ─── Sources ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextValue {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lang:  Option<String>,
  pub value: String,
}

/// The repository hosting the cited record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
  pub id:       String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub names:    Vec<TextValue>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub homepage: Option<ResourceReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescription {
  pub id:         String,
  pub citations:  Vec<SourceCitation>,
  /// URL of the cited record.
  pub about:      String,
  pub titles:     Vec<TextValue>,
  pub repository: ResourceReference,
}
