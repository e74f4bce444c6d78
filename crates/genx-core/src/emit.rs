//! Typed, validated fact emission.
//!
//! Each operation either broadcasts exactly one DATA event or reports exactly
//! one ERROR naming the fact type and the missing field, never both.

use thiserror::Error;

use crate::{
  fact::{
    AlternateIdData, CitationData, CoupleEvent, CoupleEventData, EventData,
    ExternalIdData, Fact, FactType, GenderData, LifeEvent, NameData,
    ParentEvent, ParentEventData, PersonData, ValueData, ValuedFact,
  },
  extraction::Extraction,
  id::PersonId,
};

/// Why a fact was refused before reaching the channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{0} missing {1}")]
  Missing(FactType, &'static str),

  #[error("{0} invalid gender")]
  InvalidGender(FactType),

  #[error("{0} must have a name or at least one part")]
  EmptyName(FactType),

  #[error("{0} must have a place, date, or parents")]
  EmptyParentEvent(FactType),
}

/// The genders a producer may report.
pub const GENDERS: [&str; 2] = ["Male", "Female"];

/// Validating front end over an [`Extraction`].
#[derive(Debug)]
pub struct Emitter {
  extraction: Extraction,
}

impl Emitter {
  pub fn new(extraction: Extraction) -> Self { Self { extraction } }

  pub fn extraction(&self) -> &Extraction { &self.extraction }

  pub fn into_extraction(self) -> Extraction { self.extraction }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  pub fn start(&mut self) { self.extraction.start(); }

  pub fn end(&mut self) { self.extraction.end(); }

  pub fn error(&mut self, message: impl Into<String>) {
    self.extraction.error(message);
  }

  // ── Vocabulary ────────────────────────────────────────────────────────────

  /// Add a person; `primary` marks the principal subject of the record.
  pub fn person(&mut self, data: PersonData) {
    let t = FactType::Person;
    if data.id.is_empty() {
      return self.refuse(ValidationError::Missing(t, "id"));
    }
    self.extraction.data(Fact::Person(data));
  }

  pub fn gender(&mut self, mut data: GenderData) {
    let t = FactType::Gender;
    if data.person.is_empty() {
      return self.refuse(ValidationError::Missing(t, "person"));
    }
    data.gender = data.gender.trim().to_owned();
    if data.gender.is_empty() {
      return self.refuse(ValidationError::Missing(t, "gender"));
    }
    if !GENDERS.contains(&data.gender.as_str()) {
      return self.refuse(ValidationError::InvalidGender(t));
    }
    self.extraction.data(Fact::Gender(data));
  }

  /// Add a name. At least one of the whole name or its parts is required.
  pub fn name(&mut self, mut data: NameData) {
    let t = FactType::Name;
    if data.person.is_empty() {
      return self.refuse(ValidationError::Missing(t, "person"));
    }
    for field in [
      &mut data.name,
      &mut data.given,
      &mut data.surname,
      &mut data.prefix,
      &mut data.suffix,
    ] {
      normalize(field);
    }
    if data.name.is_none()
      && data.given.is_none()
      && data.surname.is_none()
      && data.prefix.is_none()
      && data.suffix.is_none()
    {
      return self.refuse(ValidationError::EmptyName(t));
    }
    self.extraction.data(Fact::Name(data));
  }

  /// Declare that `id` names the same person as `person`.
  pub fn alternate_id(&mut self, data: AlternateIdData) {
    let t = FactType::AlternateId;
    if data.person.is_empty() {
      return self.refuse(ValidationError::Missing(t, "person"));
    }
    if data.id.is_empty() {
      return self.refuse(ValidationError::Missing(t, "id"));
    }
    self.extraction.data(Fact::AlternateId(data));
  }

  pub fn external_id(&mut self, data: ExternalIdData) {
    let t = FactType::ExternalId;
    if data.person.is_empty() {
      return self.refuse(ValidationError::Missing(t, "person"));
    }
    if data.url.is_empty() {
      return self.refuse(ValidationError::Missing(t, "url"));
    }
    if data.id.is_empty() {
      return self.refuse(ValidationError::Missing(t, "id"));
    }
    self.extraction.data(Fact::ExternalId(data));
  }

  /// Cite the record being extracted.
  pub fn citation(&mut self, mut data: CitationData) {
    let t = FactType::Citation;
    if data.title.is_empty() {
      return self.refuse(ValidationError::Missing(t, "title"));
    }
    if data.url.is_empty() {
      return self.refuse(ValidationError::Missing(t, "url"));
    }
    if data.accessed == 0 {
      return self.refuse(ValidationError::Missing(t, "accessed"));
    }
    normalize(&mut data.repository_name);
    normalize(&mut data.repository_website);
    normalize(&mut data.repository_url);
    self.extraction.data(Fact::Citation(data));
  }

  pub fn life_event(&mut self, kind: LifeEvent, mut data: EventData) {
    let t = FactType::Life(kind);
    if data.person.is_empty() {
      return self.refuse(ValidationError::Missing(t, "person"));
    }
    normalize(&mut data.place);
    normalize(&mut data.date);
    self.extraction.data(Fact::Life(kind, data));
  }

  pub fn valued_fact(&mut self, kind: ValuedFact, mut data: ValueData) {
    let t = FactType::Valued(kind);
    if data.person.is_empty() {
      return self.refuse(ValidationError::Missing(t, "person"));
    }
    if data.value.trim().is_empty() {
      return self.refuse(ValidationError::Missing(t, "value"));
    }
    normalize(&mut data.place);
    normalize(&mut data.date);
    self.extraction.data(Fact::Valued(kind, data));
  }

  /// A birth or adoption. Needs a place, a date, or a parent list (which may
  /// be empty).
  pub fn parent_event(&mut self, kind: ParentEvent, mut data: ParentEventData) {
    let t = FactType::Parent(kind);
    if data.person.is_empty() {
      return self.refuse(ValidationError::Missing(t, "person"));
    }
    normalize(&mut data.place);
    normalize(&mut data.date);
    if data.place.is_none() && data.date.is_none() && data.parents.is_none() {
      return self.refuse(ValidationError::EmptyParentEvent(t));
    }
    if data.parents.iter().flatten().any(PersonId::is_empty) {
      return self.refuse(ValidationError::Missing(t, "parents"));
    }
    self.extraction.data(Fact::Parent(kind, data));
  }

  /// A couple event with one or two spouses.
  pub fn couple_event(&mut self, kind: CoupleEvent, mut data: CoupleEventData) {
    let t = FactType::Couple(kind);
    if data.spouses.is_empty() || data.spouses.iter().any(PersonId::is_empty) {
      return self.refuse(ValidationError::Missing(t, "spouses"));
    }
    normalize(&mut data.place);
    normalize(&mut data.date);
    self.extraction.data(Fact::Couple(kind, data));
  }

  fn refuse(&mut self, error: ValidationError) {
    self.extraction.error(error.to_string());
  }
}

/// Blank optional strings count as absent.
fn normalize(field: &mut Option<String>) {
  if field.as_deref().is_some_and(|s| s.trim().is_empty()) {
    *field = None;
  }
}
